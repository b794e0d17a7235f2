use crate::bbox::{BBox, Ltrb};

use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Jitters boxes around their original position to make scoring robust
/// against slightly misplaced tracker boxes.
pub struct BoxSampler {
    rng: StdRng,
}

impl BoxSampler {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Returns `count` boxes with every coordinate shifted by a uniform
    /// offset in `[-jitter_ratio, jitter_ratio]` of the box width (x) or
    /// height (y), preceded by the original box when `include_original`.
    pub fn sample(
        &mut self,
        orig: &BBox<Ltrb>,
        count: usize,
        jitter_ratio: f32,
        include_original: bool,
    ) -> Vec<BBox<Ltrb>> {
        let (w, h) = (orig.width(), orig.height());
        let ratio = jitter_ratio.abs();
        let dist = Uniform::new_inclusive(-ratio, ratio);

        let mut boxes = Vec::with_capacity(count + include_original as usize);
        if include_original {
            boxes.push(*orig);
        }

        for _ in 0..count {
            let delta = [
                self.rng.sample(dist) * w,
                self.rng.sample(dist) * h,
                self.rng.sample(dist) * w,
                self.rng.sample(dist) * h,
            ];
            boxes.push(orig.offset(delta));
        }

        boxes
    }
}

impl Default for BoxSampler {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_jitter_repeats_original() {
        let mut sampler = BoxSampler::seeded(7);
        let orig = BBox::ltrb(10., 20., 110., 70.);
        let boxes = sampler.sample(&orig, 5, 0.0, true);
        assert_eq!(boxes.len(), 6);
        assert!(boxes.iter().all(|b| *b == orig));
    }

    #[test]
    fn without_original_returns_count_boxes() {
        let mut sampler = BoxSampler::seeded(7);
        let orig = BBox::ltrb(10., 20., 110., 70.);
        let boxes = sampler.sample(&orig, 8, 0.05, false);
        assert_eq!(boxes.len(), 8);
        assert!(boxes.iter().all(|b| *b != orig));
    }

    #[test]
    fn offsets_stay_within_ratio() {
        let mut sampler = BoxSampler::seeded(42);
        let orig = BBox::ltrb(0., 0., 100., 50.);
        let boxes = sampler.sample(&orig, 64, 0.1, true);
        assert_eq!(boxes[0], orig);
        for b in &boxes[1..] {
            let s = b.as_slice();
            assert!(s[0].abs() <= 10.0 && (s[2] - 100.).abs() <= 10.0);
            assert!(s[1].abs() <= 5.0 && (s[3] - 50.).abs() <= 5.0);
        }
    }

    #[test]
    fn degenerate_box_gets_no_jitter_on_flat_axis() {
        let mut sampler = BoxSampler::seeded(3);
        let orig = BBox::ltrb(5., 5., 5., 30.);
        for b in sampler.sample(&orig, 10, 0.2, false) {
            assert_eq!(b.left(), 5.);
            assert_eq!(b.right(), 5.);
        }
    }

    #[test]
    fn same_seed_same_samples() {
        let orig = BBox::ltrb(0., 0., 40., 40.);
        let a = BoxSampler::seeded(11).sample(&orig, 4, 0.05, true);
        let b = BoxSampler::seeded(11).sample(&orig, 4, 0.05, true);
        assert_eq!(a, b);
    }
}
