use super::{AngularGrid, EuclideanCells, NormalIndex, cone_directions, unordered_index};
use crate::error::{CoreError, CoreResult};
use crate::options::MatchOptions;

/// A spatial index of oriented points combining a regular Euclidean grid over
/// the unit cube with a regular angular grid over normal directions.
///
/// Normals are bucketed on an `ng_size^D` grid over the cube `[-1, 1]^D`.
/// Positions must already be mapped into the unit cube.
#[derive(Clone, Debug)]
pub struct IndexedNormalSet<const D: usize> {
    cells: EuclideanCells<D>,
    ng_size: usize,
    /// Edge of an angular cell in the normalized `[0, 1]^D` normal space.
    normal_epsilon: f64,
}

impl<const D: usize> IndexedNormalSet<D> {
    /// Creates an empty index with Euclidean cells of edge `epsilon`, rounded
    /// to a power of two, and `ng_size` angular cells per dimension.
    pub fn new(epsilon: f64, ng_size: usize) -> CoreResult<Self> {
        let bucket_count = ng_size
            .checked_pow(D as u32)
            .filter(|&c| c > 0)
            .ok_or_else(|| CoreError::InvalidConfiguration(format!("invalid normal grid size {}", ng_size)))?;
        Ok(Self {
            cells: EuclideanCells::new(epsilon, bucket_count)?,
            ng_size,
            normal_epsilon: 1.0 / ng_size as f64 + 1e-5,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.cells.epsilon()
    }

    /// Number of Euclidean cells per dimension.
    pub fn grid_size(&self) -> usize {
        self.cells.grid_size()
    }

    pub fn normal_grid_size(&self) -> usize {
        self.ng_size
    }

    pub fn populated_cells(&self) -> usize {
        self.cells.populated_cells()
    }

    pub fn coordinates_pos(&self, p: &[f64; D]) -> [f64; D] {
        self.cells.coordinates_pos(p)
    }

    pub fn coordinates_normal(&self, n: &[f64; D]) -> [f64; D] {
        std::array::from_fn(|d| (n[d] + 1.0) / 2.0 / self.normal_epsilon)
    }

    pub fn index_pos(&self, p: &[f64; D]) -> Option<[usize; D]> {
        self.cells.index_pos(p)
    }

    pub fn index_normal(&self, n: &[f64; D]) -> Option<usize> {
        unordered_index(&self.coordinates_normal(n), self.ng_size)
    }

    pub fn angular_grid(&self, p: &[f64; D]) -> Option<&AngularGrid> {
        self.cells.angular_grid(p)
    }

    pub fn add_element(&mut self, p: &[f64; D], n: &[f64; D], id: usize) {
        if let Some(bucket) = self.index_normal(n) {
            self.cells.insert(p, bucket, id);
        }
    }

    /// Ids stored in the cell of `p`, whatever their normal.
    pub fn get_neighbors(&self, p: &[f64; D], nei: &mut Vec<usize>) {
        self.cells.neighbors(p, nei);
    }

    /// Ids stored in the cell of `p` within the normal bucket of `n`.
    pub fn get_neighbors_with_normal(&self, p: &[f64; D], n: &[f64; D], nei: &mut Vec<usize>) {
        if let Some(bucket) = self.index_normal(n) {
            self.cells.neighbors_in_bucket(p, bucket, nei);
        }
    }
}

impl IndexedNormalSet<3> {
    /// Cone query: ids of the cell of `p` whose normal bucket is crossed by the
    /// cone of angle `acos(cos_alpha)` around `n`.
    ///
    /// The cone is sampled along its rim, with a power-of-two number of samples
    /// growing with the cone perimeter relative to the angular cell size.
    pub fn get_neighbors_in_cone(&self, p: &[f64; 3], n: &[f64; 3], cos_alpha: f64, try_reverse: bool, nei: &mut Vec<usize>) {
        if self.cells.angular_grid(p).is_none() {
            return;
        }
        let alpha = cos_alpha.clamp(-1.0, 1.0).acos();
        let perimeter = std::f64::consts::TAU * alpha.atan();
        let nb_sample = 2 * ((perimeter / self.normal_epsilon) as usize + 1).next_power_of_two();

        let mut buckets = Vec::with_capacity(2 * nb_sample);
        for dir in cone_directions(n, cos_alpha, nb_sample) {
            buckets.extend(self.index_normal(&dir));
            if try_reverse {
                buckets.extend(self.index_normal(&[-dir[0], -dir[1], -dir[2]]));
            }
        }
        self.cells.neighbors_in_buckets(p, buckets, nei);
    }
}

impl NormalIndex for IndexedNormalSet<3> {
    fn with_epsilon(epsilon: f64, options: &MatchOptions) -> CoreResult<Self> {
        Self::new(epsilon, options.normal_grid_size)
    }

    fn add_element(&mut self, p: &[f64; 3], n: &[f64; 3], id: usize) {
        IndexedNormalSet::add_element(self, p, n, id);
    }

    fn get_neighbors_in_cone(&self, p: &[f64; 3], n: &[f64; 3], cos_alpha: f64, try_reverse: bool, nei: &mut Vec<usize>) {
        IndexedNormalSet::get_neighbors_in_cone(self, p, n, cos_alpha, try_reverse, nei);
    }
}

/// Two-dimensional variant.
pub type IndexedNormalSet2D = IndexedNormalSet<2>;
/// Three-dimensional variant used by the congruent set search.
pub type IndexedNormalSet3D = IndexedNormalSet<3>;
