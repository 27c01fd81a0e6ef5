//! Modelos de dominio
//!
//! Este módulo contiene los structs de dominio del coordinador de viajes.

pub mod driver;
pub mod location;
pub mod notification;
pub mod session;
pub mod trip;
pub mod vehicle;

pub use driver::DriverRecord;
pub use location::LocationFix;
pub use notification::{AdminNotification, NotificationKind, Severity};
pub use session::DriverSession;
pub use trip::{PreTripChecklist, TripPhase, TripStatus};
pub use vehicle::{PhotoRef, VehicleOverview, VehicleRecord, REQUIRED_VEHICLE_PHOTOS};
