//! Reduction of a frame pair's feature correspondences to a single camera motion.
//!
//! The correspondence that moved furthest wins, and it only counts as camera
//! motion if it moved more than the noise floor. Otherwise the camera is
//! assumed to have kept its previous motion.

use super::transformations::{FeaturePoint, MotionVector};

/// Default noise floor in pixels.
pub const DEFAULT_MINIMUM_DISTANCE: f64 = 5.0;

/// A feature location in the old frame paired with its tracked location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correspondence {
    pub old: FeaturePoint,
    pub new: FeaturePoint,
    pub valid: bool,
}

impl Correspondence {
    /// Pair an old location with its tracked location.
    pub fn new(old: FeaturePoint, new: FeaturePoint, valid: bool) -> Self {
        Self { old, new, valid }
    }

    /// Euclidean distance between the old and new location.
    pub fn distance(&self) -> f64 {
        MotionVector::between(&self.old, &self.new).magnitude()
    }
}

/// Pair old points with their tracked locations and validity flags.
///
/// Extra entries on any side (mismatched lengths) are dropped.
pub fn correspondences(old: &[FeaturePoint], new: &[FeaturePoint], status: &[bool]) -> Vec<Correspondence> {
    old.iter()
        .zip(new.iter().zip(status))
        .map(|(old, (new, &valid))| Correspondence::new(*old, *new, valid))
        .collect()
}

/// Outcome of aggregating one frame pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionUpdate {
    /// Motion vector for the new frame.
    pub vector: MotionVector,
    /// Whether features should be re-selected on the new frame.
    pub reseed: bool,
    /// Largest valid correspondence distance (0 when none were valid).
    pub max_distance: f64,
}

/// Select the camera motion for a frame pair.
///
/// Invalid correspondences are ignored. Among the rest, the one with the
/// largest displacement is kept (first one wins on ties). If that displacement
/// exceeds `minimum_distance` its signed `old - new` offset becomes the new
/// vector and a re-seed is requested; otherwise `previous` is returned verbatim.
pub fn select_motion<'a, I>(correspondences: I, previous: MotionVector, minimum_distance: f64) -> MotionUpdate
where
    I: IntoIterator<Item = &'a Correspondence>,
{
    let mut max_distance = 0.0;
    let mut best = MotionVector::ZERO;

    for c in correspondences.into_iter().filter(|c| c.valid) {
        let displacement = MotionVector::between(&c.old, &c.new);
        let distance = displacement.magnitude();
        if distance > max_distance {
            max_distance = distance;
            best = displacement;
        }
    }

    if max_distance > minimum_distance {
        MotionUpdate {
            vector: best,
            reseed: true,
            max_distance,
        }
    } else {
        MotionUpdate {
            vector: previous,
            reseed: false,
            max_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn corr(ox: f32, oy: f32, nx: f32, ny: f32) -> Correspondence {
        Correspondence::new(FeaturePoint::new(ox, oy), FeaturePoint::new(nx, ny), true)
    }

    #[test]
    fn test_engineered_outlier_is_selected() {
        // Several small displacements and one large one.
        let cs = vec![
            corr(10.0, 10.0, 11.0, 10.0),
            corr(50.0, 40.0, 50.5, 41.0),
            corr(100.0, 100.0, 112.0, 95.0),
            corr(200.0, 30.0, 198.0, 31.0),
        ];

        let update = select_motion(&cs, MotionVector::new(1.0, 1.0), DEFAULT_MINIMUM_DISTANCE);

        assert!(update.reseed);
        assert_relative_eq!(update.vector.dx, -12.0, epsilon = 1e-9);
        assert_relative_eq!(update.vector.dy, 5.0, epsilon = 1e-9);
        assert_relative_eq!(update.max_distance, 13.0, epsilon = 1e-6);
    }

    #[test]
    fn test_below_noise_floor_propagates_previous() {
        let previous = MotionVector::new(-7.25, 3.5);
        let cs = vec![corr(10.0, 10.0, 13.0, 14.0), corr(20.0, 20.0, 21.0, 20.0)];

        // Exactly 5 pixels is not above the floor.
        let update = select_motion(&cs, previous, 5.0);

        assert!(!update.reseed);
        assert_eq!(update.vector, previous);
        assert_relative_eq!(update.max_distance, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_correspondences_ignored() {
        let previous = MotionVector::new(2.0, 2.0);
        let cs = vec![
            Correspondence::new(FeaturePoint::new(0.0, 0.0), FeaturePoint::new(90.0, 0.0), false),
            corr(10.0, 10.0, 11.0, 11.0),
        ];

        let update = select_motion(&cs, previous, 5.0);

        assert!(!update.reseed);
        assert_eq!(update.vector, previous);
    }

    #[test]
    fn test_no_correspondences_propagates_previous() {
        let previous = MotionVector::new(4.0, -9.0);

        let none: Vec<Correspondence> = Vec::new();

        let update = select_motion(&none, previous, 5.0);

        assert_eq!(update.vector, previous);
        assert!(!update.reseed);
        assert_eq!(update.max_distance, 0.0);
    }

    #[test]
    fn test_ties_keep_earliest() {
        let cs = vec![corr(0.0, 0.0, 6.0, 8.0), corr(50.0, 50.0, 42.0, 44.0)];

        let update = select_motion(&cs, MotionVector::ZERO, 5.0);

        assert_relative_eq!(update.vector.dx, -6.0, epsilon = 1e-9);
        assert_relative_eq!(update.vector.dy, -8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_correspondences_zip() {
        let old = vec![FeaturePoint::new(1.0, 1.0), FeaturePoint::new(2.0, 2.0)];
        let new = vec![FeaturePoint::new(3.0, 1.0), FeaturePoint::new(2.0, 5.0)];

        let cs = correspondences(&old, &new, &[true, false]);

        assert_eq!(cs.len(), 2);
        assert!(cs[0].valid);
        assert!(!cs[1].valid);
        assert_relative_eq!(cs[0].distance(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_correspondences_mismatched_lengths() {
        let old = vec![FeaturePoint::new(1.0, 1.0)];
        let new = vec![FeaturePoint::new(3.0, 1.0), FeaturePoint::new(2.0, 5.0)];

        assert_eq!(correspondences(&old, &new, &[true, true]).len(), 1);
        assert_eq!(correspondences(&new, &new, &[true]).len(), 1);
    }
}
