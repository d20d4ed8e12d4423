use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A sphere in D dimensions used as the query primitive of pair extraction.
///
/// The radius can be rescaled after construction so that the same set of
/// primitives can be reused for successive query distances.
#[derive(Clone, Copy, Debug)]
pub struct HyperSphere<const D: usize> {
    center: [f64; D],
    radius: f64,
}

impl<const D: usize> HyperSphere<D> {
    pub fn new(center: [f64; D], radius: f64) -> Self {
        Self { center, radius }
    }

    /// Sphere centre, in the coordinates of the points it is tested against.
    pub fn center(&self) -> &[f64; D] {
        &self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Mutable access to the radius, for rescaling a whole primitive set in place.
    pub fn radius_mut(&mut self) -> &mut f64 {
        &mut self.radius
    }

    /// Replaces the radius and keeps the centre.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }

    /// Tests whether the sphere surface crosses the axis-aligned box centred at
    /// `node_center` with half edge `half_edge_length` (Arvo's algorithm).
    ///
    /// Boxes lying completely inside the sphere do not intersect its surface.
    pub fn intersect(&self, node_center: &[f64; D], half_edge_length: f64) -> bool {
        let mut dmin = 0.0;
        let mut dmax = 0.0;
        for d in 0..D {
            let min = node_center[d] - half_edge_length;
            let max = node_center[d] + half_edge_length;
            let sqmin = (self.center[d] - min) * (self.center[d] - min);
            let sqmax = (self.center[d] - max) * (self.center[d] - max);

            if self.center[d] < min {
                dmin += sqmin;
            } else if self.center[d] > max {
                dmin += sqmax;
            }
            dmax += sqmin.max(sqmax);
        }

        let r2 = self.radius * self.radius;
        dmin < r2 && r2 < dmax
    }

    /// True if `pos` lies in the shell of thickness `2 * epsilon` around the surface.
    pub fn intersect_point(&self, pos: &[f64; D], epsilon: f64) -> bool {
        let dist = (0..D)
            .map(|d| (pos[d] - self.center[d]) * (pos[d] - self.center[d]))
            .sum::<f64>()
            .sqrt();
        (dist - self.radius).abs() < epsilon
    }

    /// Copy with centre and radius snapped to the nearest multiple of `eps`.
    pub fn quantified(&self, eps: f64) -> Self {
        Self {
            center: std::array::from_fn(|d| quantize(self.center[d], eps)),
            radius: quantize(self.radius, eps),
        }
    }
}

/// Rounds to the nearest multiple of `eps`, halves away from zero.
#[inline]
fn quantize(value: f64, eps: f64) -> f64 {
    (value / eps).round() * eps
}

// Key semantics: radius first, then centre coordinates, using the IEEE total
// order so that quantified spheres can live in sorted and hashed containers.
impl<const D: usize> Ord for HyperSphere<D> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.radius.total_cmp(&other.radius).then_with(|| {
            (0..D)
                .map(|d| self.center[d].total_cmp(&other.center[d]))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        })
    }
}

impl<const D: usize> PartialOrd for HyperSphere<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const D: usize> PartialEq for HyperSphere<D> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<const D: usize> Eq for HyperSphere<D> {}

impl<const D: usize> Hash for HyperSphere<D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.radius.to_bits().hash(state);
        for c in &self.center {
            c.to_bits().hash(state);
        }
    }
}
