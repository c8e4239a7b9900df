//! Point zone: a single position with no volume

use crate::rng::ParticleRng;
use glam::Vec3;

#[derive(Debug, Clone, Copy, Default)]
pub struct Point;

impl Point {
    pub(super) fn generate_position(&self, center: Vec3) -> Vec3 {
        center
    }

    pub(super) fn contains(&self, _center: Vec3, _v: Vec3, _radius: f32) -> bool {
        false
    }

    pub(super) fn intersects(&self, _center: Vec3, _v0: Vec3, _v1: Vec3, _radius: f32) -> Option<Vec3> {
        None
    }

    pub(super) fn compute_normal(&self, center: Vec3, v: Vec3, rng: &mut ParticleRng) -> Vec3 {
        rng.normalize_or_random(v - center)
    }
}

#[cfg(test)]
mod tests {
    use crate::rng::ParticleRng;
    use crate::zone::Zone;
    use glam::Vec3;

    #[test]
    fn point_has_no_volume() {
        let zone = Zone::point(Vec3::new(1.0, 2.0, 3.0));
        let mut rng = ParticleRng::new(1);
        assert_eq!(zone.generate_position(true, 0.0, &mut rng), Vec3::new(1.0, 2.0, 3.0));
        assert!(!zone.contains(Vec3::new(1.0, 2.0, 3.0), 0.0));
        assert!(zone.intersects(Vec3::ZERO, Vec3::splat(5.0), 0.0).is_none());
    }

    #[test]
    fn point_normal_points_away() {
        let zone = Zone::point(Vec3::ZERO);
        let mut rng = ParticleRng::new(1);
        let n = zone.compute_normal(Vec3::new(0.0, 0.0, -4.0), &mut rng);
        assert!((n - Vec3::NEG_Z).length() < 1e-6);

        // On the point itself the normal is random but still unit length
        let n = zone.compute_normal(Vec3::ZERO, &mut rng);
        assert!((n.length() - 1.0).abs() < 1e-4);
    }
}
