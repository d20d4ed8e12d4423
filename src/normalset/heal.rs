use super::healpix::{bucket_count, normal_to_bucket_index};
use super::{AngularGrid, EuclideanCells, NormalIndex, cone_directions};
use crate::error::{CoreError, CoreResult};
use crate::options::MatchOptions;

/// Spatial index of oriented points in 3D whose normals are bucketed with the
/// HEALPix pixelisation (`12 * resolution^2` roughly equal-area cells).
#[derive(Clone, Debug)]
pub struct IndexedNormalHealSet {
    cells: EuclideanCells<3>,
    resolution: usize,
}

impl IndexedNormalHealSet {
    pub const DEFAULT_RESOLUTION: usize = 4;

    pub fn new(epsilon: f64, resolution: usize) -> CoreResult<Self> {
        if resolution == 0 {
            return Err(CoreError::InvalidConfiguration("HEALPix resolution must be at least 1".into()));
        }
        Ok(Self {
            cells: EuclideanCells::new(epsilon, bucket_count(resolution))?,
            resolution,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.cells.epsilon()
    }

    pub fn grid_size(&self) -> usize {
        self.cells.grid_size()
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn populated_cells(&self) -> usize {
        self.cells.populated_cells()
    }

    pub fn coordinates_pos(&self, p: &[f64; 3]) -> [f64; 3] {
        self.cells.coordinates_pos(p)
    }

    pub fn index_pos(&self, p: &[f64; 3]) -> Option<[usize; 3]> {
        self.cells.index_pos(p)
    }

    pub fn index_normal(&self, n: &[f64; 3]) -> Option<usize> {
        normal_to_bucket_index(n, self.resolution)
    }

    pub fn angular_grid(&self, p: &[f64; 3]) -> Option<&AngularGrid> {
        self.cells.angular_grid(p)
    }

    pub fn add_element(&mut self, p: &[f64; 3], n: &[f64; 3], id: usize) {
        if let Some(bucket) = self.index_normal(n) {
            self.cells.insert(p, bucket, id);
        }
    }

    pub fn get_neighbors(&self, p: &[f64; 3], nei: &mut Vec<usize>) {
        self.cells.neighbors(p, nei);
    }

    pub fn get_neighbors_with_normal(&self, p: &[f64; 3], n: &[f64; 3], nei: &mut Vec<usize>) {
        if let Some(bucket) = self.index_normal(n) {
            self.cells.neighbors_in_bucket(p, bucket, nei);
        }
    }

    /// Cone query sampled with `2^(resolution + 1)` directions on the cone rim.
    pub fn get_neighbors_in_cone(&self, p: &[f64; 3], n: &[f64; 3], cos_alpha: f64, try_reverse: bool, nei: &mut Vec<usize>) {
        if self.cells.angular_grid(p).is_none() {
            return;
        }
        let nb_sample = 1usize << (self.resolution + 1).min(20);

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

impl NormalIndex for IndexedNormalHealSet {
    fn with_epsilon(epsilon: f64, options: &MatchOptions) -> CoreResult<Self> {
        Self::new(epsilon, options.healpix_resolution)
    }

    fn add_element(&mut self, p: &[f64; 3], n: &[f64; 3], id: usize) {
        IndexedNormalHealSet::add_element(self, p, n, id);
    }

    fn get_neighbors_in_cone(&self, p: &[f64; 3], n: &[f64; 3], cos_alpha: f64, try_reverse: bool, nei: &mut Vec<usize>) {
        IndexedNormalHealSet::get_neighbors_in_cone(self, p, n, cos_alpha, try_reverse, nei);
    }
}
