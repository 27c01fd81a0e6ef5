//! Evaluador de proximidad
//!
//! Distancia de círculo máximo (haversine) sobre una esfera de radio
//! 6 371 000 m, redondeada al metro. La ausencia de posición nunca es un
//! error: se trata como "no verificado" y la puerta devuelve false.

use crate::models::location::LocationFix;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distancia haversine en metros, redondeada al metro entero
pub fn distance_meters(a: &LocationFix, b: &LocationFix) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    (EARTH_RADIUS_M * c).round()
}

/// Puerta de proximidad con umbral configurable
#[derive(Debug, Clone, Copy)]
pub struct ProximityEvaluator {
    threshold_meters: f64,
}

impl ProximityEvaluator {
    pub fn new(threshold_meters: f64) -> Self {
        Self { threshold_meters }
    }

    pub fn threshold_meters(&self) -> f64 {
        self.threshold_meters
    }

    /// True si ambas posiciones existen y están dentro del umbral.
    /// Posición ausente = no verificado = false, nunca un error.
    pub fn within_range(&self, a: Option<&LocationFix>, b: Option<&LocationFix>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => distance_meters(a, b) <= self.threshold_meters,
            _ => false,
        }
    }

    /// True si la posición está dentro del umbral de al menos una de las
    /// otras (política any-match del flujo de inicio y fin de viaje)
    pub fn within_range_of_any<'a, I>(&self, fix: &LocationFix, others: I) -> bool
    where
        I: IntoIterator<Item = &'a LocationFix>,
    {
        others
            .into_iter()
            .any(|other| self.within_range(Some(fix), Some(other)))
    }

    /// Distancia a la otra posición más cercana, para mensajes de rechazo
    pub fn nearest_meters<'a, I>(&self, fix: &LocationFix, others: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a LocationFix>,
    {
        others
            .into_iter()
            .map(|other| distance_meters(fix, other))
            .min_by(|x, y| x.total_cmp(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(lat: f64, lon: f64) -> LocationFix {
        LocationFix::new(lat, lon, 10.0)
    }

    #[test]
    fn test_distance_zero_for_same_point() {
        let a = fix(8.0883, 77.4324);
        assert_eq!(distance_meters(&a, &a), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let a = fix(8.0883, 77.4324);
        let b = fix(8.0901, 77.4350);
        assert_eq!(distance_meters(&a, &b), distance_meters(&b, &a));
    }

    #[test]
    fn test_distance_known_pairs() {
        // Dos puntos a ~0.0001° en cada eje cerca de Nagercoil: ~16 m
        let a = fix(8.0883, 77.4324);
        let b = fix(8.0884, 77.4325);
        let d = distance_meters(&a, &b);
        assert!(d > 10.0 && d < 25.0, "distancia inesperada: {}", d);

        // 0.001° de latitud son ~111 m en cualquier longitud
        let c = fix(8.0893, 77.4324);
        let d = distance_meters(&a, &c);
        assert!((d - 111.0).abs() < 2.0, "distancia inesperada: {}", d);
    }

    #[test]
    fn test_within_range_threshold_boundary() {
        let eval = ProximityEvaluator::new(90.0);
        let a = fix(8.0883, 77.4324);
        // ~67 m: dentro
        let near = fix(8.0889, 77.4324);
        // ~111 m: fuera
        let far = fix(8.0893, 77.4324);

        assert!(eval.within_range(Some(&a), Some(&near)));
        assert!(!eval.within_range(Some(&a), Some(&far)));
        assert_eq!(
            eval.within_range(Some(&a), Some(&near)),
            distance_meters(&a, &near) <= 90.0
        );
    }

    #[test]
    fn test_within_range_absent_location_is_false() {
        let eval = ProximityEvaluator::new(90.0);
        let a = fix(8.0883, 77.4324);

        assert!(!eval.within_range(None, Some(&a)));
        assert!(!eval.within_range(Some(&a), None));
        assert!(!eval.within_range(None, None));
    }

    #[test]
    fn test_within_range_of_any() {
        let eval = ProximityEvaluator::new(90.0);
        let acting = fix(8.0883, 77.4324);
        let far = fix(8.0993, 77.4324); // ~1.2 km
        let near = fix(8.0884, 77.4325); // ~16 m

        assert!(eval.within_range_of_any(&acting, vec![&far, &near]));
        assert!(!eval.within_range_of_any(&acting, std::iter::once(&far)));
        // Sin otras posiciones no hay match posible
        assert!(!eval.within_range_of_any(&acting, std::iter::empty()));
    }

    #[test]
    fn test_nearest_meters() {
        let eval = ProximityEvaluator::new(90.0);
        let acting = fix(8.0883, 77.4324);
        let near = fix(8.0884, 77.4325);
        let far = fix(8.0993, 77.4324);

        let nearest = eval
            .nearest_meters(&acting, vec![&far, &near].into_iter())
            .unwrap();
        assert_eq!(nearest, distance_meters(&acting, &near));
        assert!(eval.nearest_meters(&acting, std::iter::empty()).is_none());
    }
}
