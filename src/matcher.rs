use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{CoreError, CoreResult, check_index};
use crate::normalset::{IndexedNormalSet, NormalIndex};
use crate::options::MatchOptions;
use crate::pair_creation::{DefaultPairFilter, PairCreationFunctor, PairFilter};
use crate::pair_extraction::IntersectionStrategy;
use crate::point::{Point3D, distance_sq, dot, lerp, normalized, sub};

/// Four point indices `(a, b)` from the first pair set and `(c, d)` from the
/// second, whose invariant points coincide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quadrilateral {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
}

impl Quadrilateral {
    pub fn new(a: usize, b: usize, c: usize, d: usize) -> Self {
        Self { a, b, c, d }
    }

    pub fn indices(&self) -> [usize; 4] {
        [self.a, self.b, self.c, self.d]
    }
}

/// Parameters `(s, t)` of the closest points `b0 + s (b1 - b0)` and
/// `b2 + t (b3 - b2)` between the lines carrying the two base segments.
///
/// For a planar base these are the intersection ratios of its diagonals.
/// Returns `None` for degenerate or parallel segments.
pub fn segment_invariants(base: &[Point3D; 4]) -> Option<(f64, f64)> {
    let u = sub(&base[1].pos, &base[0].pos);
    let v = sub(&base[3].pos, &base[2].pos);
    let w = sub(&base[0].pos, &base[2].pos);

    let a = dot(&u, &u);
    let b = dot(&u, &v);
    let c = dot(&v, &v);
    let d = dot(&u, &w);
    let e = dot(&v, &w);

    let den = a * c - b * b;
    if a == 0.0 || c == 0.0 || den <= 1e-12 * a * c {
        return None;
    }
    Some(((b * e - c * d) / den, (a * e - b * d) / den))
}

/// Pair extraction and congruent quadrilateral search over one point set.
///
/// The point set is mapped into the unit cube once; each call to
/// [`extract_pairs`](Self::extract_pairs) reuses that mapping for a new base
/// segment and query distance.
pub struct CongruentMatcher<'a, F: PairFilter = DefaultPairFilter> {
    functor: PairCreationFunctor<'a, F>,
    options: MatchOptions,
}

impl<'a> CongruentMatcher<'a, DefaultPairFilter> {
    pub fn new(q: &'a [Point3D], options: MatchOptions) -> CoreResult<Self> {
        Self::with_filter(q, options, DefaultPairFilter)
    }
}

impl<'a, F: PairFilter> CongruentMatcher<'a, F> {
    pub fn with_filter(q: &'a [Point3D], options: MatchOptions, filter: F) -> CoreResult<Self> {
        options.validate()?;
        Ok(Self {
            functor: PairCreationFunctor::with_filter(q, options.clone(), filter),
            options,
        })
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn functor(&self) -> &PairCreationFunctor<'a, F> {
        &self.functor
    }

    /// Extracts the pairs of points at world distance `pair_distance`, within
    /// `pair_distance_epsilon`, that are compatible with the base segment
    /// `base[base_point1] -> base[base_point2]`.
    ///
    /// Each unordered pair is reported at most once per orientation.
    pub fn extract_pairs<S: IntersectionStrategy<3>>(
        &mut self,
        strategy: &S,
        pair_distance: f64,
        pair_distance_epsilon: f64,
        base_point1: usize,
        base_point2: usize,
        base: &[Point3D; 4],
    ) -> CoreResult<Vec<(usize, usize)>> {
        self.functor.clear_pairs();
        self.functor.set_base(base_point1, base_point2, base)?;
        self.functor.set_pair_distance(pair_distance, pair_distance_epsilon);
        self.functor.set_radius(pair_distance);

        let epsilon = self.functor.normalized_epsilon(pair_distance_epsilon);
        let (primitives, points) = self.functor.take_geometry();
        let processed = strategy.process(&primitives, &points, epsilon, self.options.min_node_size, &mut self.functor);
        self.functor.restore_geometry(primitives, points);
        processed?;

        let pairs = self.functor.take_pairs();
        debug!(pair_distance, pairs = pairs.len(), "pairs extracted");
        Ok(pairs)
    }

    /// Congruent set search with the regular angular grid index.
    #[allow(clippy::too_many_arguments)]
    pub fn find_congruent_quadrilaterals(
        &self,
        invariant1: f64,
        invariant2: f64,
        distance_threshold: f64,
        base: &[Point3D; 4],
        first_pairs: &[(usize, usize)],
        second_pairs: &[(usize, usize)],
        quadrilaterals: &mut Vec<Quadrilateral>,
    ) -> CoreResult<bool> {
        self.find_congruent_quadrilaterals_with::<IndexedNormalSet<3>>(
            invariant1,
            invariant2,
            distance_threshold,
            base,
            first_pairs,
            second_pairs,
            quadrilaterals,
        )
    }

    /// Finds the quadrilaterals `(a, b, c, d)` with `(a, b)` in `first_pairs`
    /// and `(c, d)` in `second_pairs` whose invariant points
    /// `a + invariant1 (b - a)` and `c + invariant2 (d - c)` are closer than
    /// `distance_threshold` in world space, and whose segments form the same
    /// angle as the two base segments.
    ///
    /// `quadrilaterals` is cleared first. Returns whether any was found.
    #[allow(clippy::too_many_arguments)]
    pub fn find_congruent_quadrilaterals_with<N: NormalIndex>(
        &self,
        invariant1: f64,
        invariant2: f64,
        distance_threshold: f64,
        base: &[Point3D; 4],
        first_pairs: &[(usize, usize)],
        second_pairs: &[(usize, usize)],
        quadrilaterals: &mut Vec<Quadrilateral>,
    ) -> CoreResult<bool> {
        quadrilaterals.clear();
        if !invariant1.is_finite() || !invariant2.is_finite() {
            return Err(CoreError::InvalidConfiguration("invariants must be finite".into()));
        }

        let unit = self.functor.unit_points();
        let world = self.functor.world_points();
        for &(i, j) in first_pairs.iter().chain(second_pairs) {
            check_index(i, unit.len())?;
            check_index(j, unit.len())?;
        }

        // angle between the base segments, constant for the whole base
        let alpha = dot(
            &normalized(&sub(&base[1].pos, &base[0].pos)),
            &normalized(&sub(&base[3].pos, &base[2].pos)),
        );

        let eps = self.functor.normalized_epsilon(distance_threshold);
        let mut nset = N::with_epsilon(eps, &self.options)?;

        for (id, &(i, j)) in first_pairs.iter().enumerate() {
            let (p1, p2) = (&unit[i], &unit[j]);
            let n = normalized(&sub(p2, p1));
            nset.add_element(&lerp(p1, p2, invariant1), &n, id);
        }

        let threshold_sq = distance_threshold * distance_threshold;
        let mut comb: BTreeSet<(usize, usize)> = BTreeSet::new();
        let mut nei = Vec::new();
        let mut candidates = 0usize;

        for (k, &(i, j)) in second_pairs.iter().enumerate() {
            let (p1, p2) = (&unit[i], &unit[j]);
            let query = lerp(p1, p2, invariant2);
            let query_n = normalized(&sub(p2, p1));
            let query_world = lerp(&world[i].pos, &world[j].pos, invariant2);

            nei.clear();
            nset.get_neighbors_in_cone(&query, &query_n, alpha, false, &mut nei);
            candidates += nei.len();

            for &id in &nei {
                let (a, b) = first_pairs.get(id).copied().ok_or(CoreError::Unreachable("normal index returned an unknown pair id"))?;
                let inv_point = lerp(&world[a].pos, &world[b].pos, invariant1);
                if distance_sq(&query_world, &inv_point) <= threshold_sq {
                    comb.insert((id, k));
                }
            }
        }

        quadrilaterals.extend(comb.into_iter().map(|(id, k)| {
            let (a, b) = first_pairs[id];
            let (c, d) = second_pairs[k];
            Quadrilateral::new(a, b, c, d)
        }));
        debug!(
            first = first_pairs.len(),
            second = second_pairs.len(),
            candidates,
            found = quadrilaterals.len(),
            "congruent set search done"
        );

        Ok(!quadrilaterals.is_empty())
    }
}
