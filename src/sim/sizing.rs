//! Radius from memory pressure

use crate::consts::MIN_RADIUS;
use crate::memory::{MemorySample, MemorySampler};

/// `floor(used / total * max_radius)`; zero when `total` is zero
pub fn compute_radius(used: u64, total: u64, max_radius: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let used = used.min(total) as u128;
    ((used * max_radius as u128) / total as u128) as u32
}

/// Turns memory readings into ball radii, falling back to a fixed radius
/// when the host cannot report memory usage.
#[derive(Debug, Clone)]
pub struct SizingPolicy {
    max_radius: u32,
    fallback_radius: f32,
    last_sample: Option<MemorySample>,
    warned: bool,
}

impl SizingPolicy {
    pub fn new(max_radius: u32, fallback_radius: f32) -> Self {
        Self {
            max_radius,
            fallback_radius,
            last_sample: None,
            warned: false,
        }
    }

    /// Radius for a reading, never below `MIN_RADIUS`
    pub fn radius_for(&self, sample: MemorySample) -> f32 {
        let r = compute_radius(sample.used_bytes, sample.total_bytes, self.max_radius);
        (r as f32).max(MIN_RADIUS)
    }

    /// Sample once and convert; unavailable samplers yield the fallback radius
    pub fn radius_from(&mut self, sampler: &mut dyn MemorySampler) -> f32 {
        match sampler.sample() {
            Ok(sample) => {
                self.last_sample = Some(sample);
                self.radius_for(sample)
            }
            Err(e) => {
                if !self.warned {
                    log::warn!("{e}; using fallback radius {}", self.fallback_radius);
                    self.warned = true;
                }
                self.fallback_radius
            }
        }
    }

    /// Most recent successful reading
    pub fn last_sample(&self) -> Option<MemorySample> {
        self.last_sample
    }

    pub fn max_radius(&self) -> u32 {
        self.max_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FixedSampler, UnavailableSampler};

    #[test]
    fn test_compute_radius_examples() {
        assert_eq!(compute_radius(50, 100, 40), 20);
        assert_eq!(compute_radius(0, 100, 40), 0);
        assert_eq!(compute_radius(100, 100, 40), 40);
        assert_eq!(compute_radius(99, 100, 40), 39);
    }

    #[test]
    fn test_compute_radius_degenerate_inputs() {
        assert_eq!(compute_radius(10, 0, 40), 0);
        assert_eq!(compute_radius(200, 100, 40), 40);
        assert_eq!(compute_radius(u64::MAX / 2, u64::MAX, 60), 29);
    }

    #[test]
    fn test_radius_for_has_floor() {
        let policy = SizingPolicy::new(40, 10.0);
        assert_eq!(policy.radius_for(MemorySample::new(0, 100)), MIN_RADIUS);
        assert_eq!(policy.radius_for(MemorySample::new(75, 100)), 30.0);
    }

    #[test]
    fn test_fallback_when_unavailable() {
        let mut policy = SizingPolicy::new(40, 12.0);
        let mut sampler = UnavailableSampler;
        assert_eq!(policy.radius_from(&mut sampler), 12.0);
        assert_eq!(policy.radius_from(&mut sampler), 12.0);
        assert!(policy.last_sample().is_none());
    }

    #[test]
    fn test_records_last_sample() {
        let mut policy = SizingPolicy::new(40, 12.0);
        let mut sampler = FixedSampler(MemorySample::new(25, 100));
        assert_eq!(policy.radius_from(&mut sampler), 10.0);
        assert_eq!(policy.last_sample(), Some(MemorySample::new(25, 100)));
    }
}
