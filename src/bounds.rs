/// Generic axis-aligned bounding box for N-dimensional space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox<const D: usize> {
    pub min: [f64; D],
    pub max: [f64; D],
}

impl<const D: usize> BoundingBox<D> {
    pub fn new(min: [f64; D], max: [f64; D]) -> Self {
        Self { min, max }
    }

    /// An inverted box that becomes valid after the first `extend_to`.
    pub fn empty() -> Self {
        Self {
            min: [f64::INFINITY; D],
            max: [f64::NEG_INFINITY; D],
        }
    }

    /// The unit hypercube `[0, 1]^D`.
    pub fn unit() -> Self {
        Self::new([0.0; D], [1.0; D])
    }

    pub fn is_empty(&self) -> bool {
        (0..D).any(|d| self.min[d] > self.max[d])
    }

    /// Grows the box so that it contains `p`.
    pub fn extend_to(&mut self, p: &[f64; D]) {
        for d in 0..D {
            if p[d] < self.min[d] { self.min[d] = p[d]; }
            if p[d] > self.max[d] { self.max[d] = p[d]; }
        }
    }

    pub fn center(&self) -> [f64; D] {
        std::array::from_fn(|d| (self.min[d] + self.max[d]) * 0.5)
    }

    /// Edge lengths along each axis.
    pub fn diagonal(&self) -> [f64; D] {
        std::array::from_fn(|d| self.max[d] - self.min[d])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_and_center() {
        let mut b = BoundingBox::<3>::empty();
        assert!(b.is_empty());
        b.extend_to(&[1.0, -2.0, 3.0]);
        b.extend_to(&[3.0, 2.0, 4.0]);
        assert!(!b.is_empty());
        assert_eq!(b.center(), [2.0, 0.0, 3.5]);
        assert_eq!(b.diagonal(), [2.0, 4.0, 1.0]);
    }
}
