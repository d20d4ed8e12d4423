use std::f64::consts::PI;

use tracing::debug;

use crate::bounds::BoundingBox;
use crate::error::{CoreResult, check_index};
use crate::options::MatchOptions;
use crate::pair_extraction::PairProcessor;
use crate::point::{Point3D, add, distance, norm, sub};
use crate::primitive::HyperSphere;

/// Decides which orientations of a candidate pair are kept.
///
/// `q` is the point with the larger index `i` and `p` the one with the smaller
/// index `j`. The first flag accepts `(i, j)`, i.e. `q` playing `b0` and `p`
/// playing `b1`; the second flag accepts `(j, i)`. Both are judged
/// independently since normals may be flipped.
pub trait PairFilter {
    fn filter(
        &self,
        p: &Point3D,
        q: &Point3D,
        pair_normals_angle: f64,
        b0: &Point3D,
        b1: &Point3D,
        options: &MatchOptions,
    ) -> (bool, bool);
}

/// Normal-angle and colour consistency with the base segment.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPairFilter;

impl PairFilter for DefaultPairFilter {
    fn filter(
        &self,
        p: &Point3D,
        q: &Point3D,
        pair_normals_angle: f64,
        b0: &Point3D,
        b1: &Point3D,
        options: &MatchOptions,
    ) -> (bool, bool) {
        if options.filters_normals() && p.has_normal() && q.has_normal() {
            let threshold = 0.5 * options.max_normal_difference * PI / 180.0;
            let first_normal_angle = norm(&sub(&q.normal, &p.normal));
            let second_normal_angle = norm(&add(&q.normal, &p.normal));
            // either normal may be flipped, keep the closer one
            let normal_distance = (first_normal_angle - pair_normals_angle)
                .abs()
                .min((second_normal_angle - pair_normals_angle).abs());
            if normal_distance > threshold {
                return (false, false);
            }
        }

        if options.filters_colors() {
            if let (Some(pc), Some(qc), Some(c0), Some(c1)) = (p.rgb, q.rgb, b0.rgb, b1.rgb) {
                let max = options.max_color_distance;
                let forward = distance(&qc, &c0) < max && distance(&pc, &c1) < max;
                let backward = distance(&pc, &c0) < max && distance(&qc, &c1) < max;
                return (forward, backward);
            }
        }

        (true, true)
    }
}

/// Keeps both orientations of every pair.
#[derive(Clone, Copy, Debug, Default)]
pub struct DummyPairFilter;

impl PairFilter for DummyPairFilter {
    fn filter(&self, _: &Point3D, _: &Point3D, _: f64, _: &Point3D, _: &Point3D, _: &MatchOptions) -> (bool, bool) {
        (true, true)
    }
}

/// Owns the world to unit cube mapping of a point set and turns the raw
/// `(primitive, point)` hits of pair extraction into filtered index pairs
/// matching one base segment.
pub struct PairCreationFunctor<'a, F: PairFilter = DefaultPairFilter> {
    options: MatchOptions,
    filter: F,
    q: &'a [Point3D],

    points: Vec<[f64; 3]>,
    primitives: Vec<HyperSphere<3>>,
    pairs: Vec<(usize, usize)>,

    pair_distance: f64,
    pair_distance_epsilon: f64,
    pair_normals_angle: f64,
    base_point1: usize,
    base_point2: usize,
    base: [Point3D; 4],

    center: [f64; 3],
    ratio: f64,
    half: [f64; 3],
}

impl<'a> PairCreationFunctor<'a, DefaultPairFilter> {
    pub fn new(q: &'a [Point3D], options: MatchOptions) -> Self {
        Self::with_filter(q, options, DefaultPairFilter)
    }
}

impl<'a, F: PairFilter> PairCreationFunctor<'a, F> {
    /// Creates the functor and maps `q` into the unit cube.
    pub fn with_filter(q: &'a [Point3D], options: MatchOptions, filter: F) -> Self {
        let mut functor = Self {
            options,
            filter,
            q,
            points: Vec::new(),
            primitives: Vec::new(),
            pairs: Vec::new(),
            pair_distance: 0.0,
            pair_distance_epsilon: 0.0,
            pair_normals_angle: 0.0,
            base_point1: 0,
            base_point2: 1,
            base: [Point3D::from_pos([0.0; 3]); 4],
            center: [0.0; 3],
            ratio: 1.0,
            half: [0.5; 3],
        };
        functor.synch_3d_content();
        functor
    }

    /// Recomputes the unit cube mapping and the primitives from the point set.
    ///
    /// Every primitive starts with a unit radius; call [`set_radius`](Self::set_radius)
    /// before extracting pairs.
    pub fn synch_3d_content(&mut self) {
        self.points.clear();
        self.primitives.clear();

        let mut bbox = BoundingBox::<3>::empty();
        for s in self.q {
            bbox.extend_to(&s.pos);
        }
        if bbox.is_empty() {
            self.center = [0.0; 3];
            self.ratio = 1.0;
        } else {
            self.center = bbox.center();
            // keeps unit coordinates strictly below 1
            self.ratio = bbox.diagonal().iter().fold(0.0f64, |m, &v| m.max(v)) + 0.001;
        }

        self.points.reserve(self.q.len());
        self.primitives.reserve(self.q.len());
        for s in self.q {
            let u = self.world_to_unit(&s.pos);
            self.points.push(u);
            self.primitives.push(HyperSphere::new(u, 1.0));
        }
        debug!(points = self.points.len(), ratio = self.ratio, center = ?self.center, "unit cube mapping updated");
    }

    pub fn world_to_unit(&self, p: &[f64; 3]) -> [f64; 3] {
        std::array::from_fn(|d| (p[d] - self.center[d]) / self.ratio + self.half[d])
    }

    pub fn unit_to_world(&self, p: &[f64; 3]) -> [f64; 3] {
        std::array::from_fn(|d| (p[d] - self.half[d]) * self.ratio + self.center[d])
    }

    /// Sets the radius of every primitive from a world space distance.
    pub fn set_radius(&mut self, radius: f64) {
        let n_radius = radius / self.ratio;
        for m in &mut self.primitives {
            m.set_radius(n_radius);
        }
    }

    /// World space tolerance expressed in unit cube space.
    pub fn normalized_epsilon(&self, eps: f64) -> f64 {
        eps / self.ratio
    }

    pub fn set_pair_distance(&mut self, pair_distance: f64, pair_distance_epsilon: f64) {
        self.pair_distance = pair_distance;
        self.pair_distance_epsilon = pair_distance_epsilon;
    }

    /// Selects the base segment `base[base_point1] -> base[base_point2]` the
    /// pairs must match, and derives the expected normal difference from it.
    pub fn set_base(&mut self, base_point1: usize, base_point2: usize, base: &[Point3D; 4]) -> CoreResult<()> {
        check_index(base_point1, base.len())?;
        check_index(base_point2, base.len())?;
        self.base_point1 = base_point1;
        self.base_point2 = base_point2;
        self.base = *base;
        self.pair_normals_angle = norm(&sub(&base[base_point2].normal, &base[base_point1].normal));
        Ok(())
    }

    pub fn set_pair_normals_angle(&mut self, angle: f64) {
        self.pair_normals_angle = angle;
    }

    pub fn pair_normals_angle(&self) -> f64 {
        self.pair_normals_angle
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn center(&self) -> &[f64; 3] {
        &self.center
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// The point set in world space.
    pub fn world_points(&self) -> &'a [Point3D] {
        self.q
    }

    /// The point set mapped into the unit cube.
    pub fn unit_points(&self) -> &[[f64; 3]] {
        &self.points
    }

    pub fn primitives(&self) -> &[HyperSphere<3>] {
        &self.primitives
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn clear_pairs(&mut self) {
        self.pairs.clear();
    }

    pub fn take_pairs(&mut self) -> Vec<(usize, usize)> {
        std::mem::take(&mut self.pairs)
    }

    pub(crate) fn take_geometry(&mut self) -> (Vec<HyperSphere<3>>, Vec<[f64; 3]>) {
        (std::mem::take(&mut self.primitives), std::mem::take(&mut self.points))
    }

    pub(crate) fn restore_geometry(&mut self, primitives: Vec<HyperSphere<3>>, points: Vec<[f64; 3]>) {
        self.primitives = primitives;
        self.points = points;
    }
}

impl<F: PairFilter> PairProcessor for PairCreationFunctor<'_, F> {
    fn process(&mut self, i: usize, j: usize) {
        if i <= j {
            return;
        }
        let p = &self.q[j];
        let q = &self.q[i];

        if !self.options.multiscale {
            let d = distance(&q.pos, &p.pos);
            if (d - self.pair_distance).abs() > self.pair_distance_epsilon {
                return;
            }
        }

        let (forward, backward) = self.filter.filter(
            p,
            q,
            self.pair_normals_angle,
            &self.base[self.base_point1],
            &self.base[self.base_point2],
            &self.options,
        );
        if forward {
            self.pairs.push((i, j));
        }
        if backward {
            self.pairs.push((j, i));
        }
    }
}
