use std::collections::{BTreeSet, HashMap};

use crate::error::{CoreError, CoreResult};
use crate::options::MatchOptions;
use crate::point::{normalized, rotate_from_z, scale};

pub mod grid;
pub mod heal;
pub mod healpix;

pub use grid::IndexedNormalSet;
pub use heal::IndexedNormalHealSet;

/// Per-cell buckets of point ids, one bucket per normal direction cell.
pub type AngularGrid = Vec<Vec<usize>>;

/// Trait for spatial indices keyed by position and normal direction.
/// This allows swapping the regular angular grid for the HEALPix buckets in
/// the congruent set search.
pub trait NormalIndex: Sized {
    /// Builds an empty index whose Euclidean cells have edge `epsilon`
    /// (rounded to a power of two) in the unit cube.
    fn with_epsilon(epsilon: f64, options: &MatchOptions) -> CoreResult<Self>;

    /// Inserts `id` at position `p` with normal `n`. Out of range positions
    /// and normals are ignored.
    fn add_element(&mut self, p: &[f64; 3], n: &[f64; 3], id: usize);

    /// Appends the ids stored in the cell of `p` whose normal bucket is hit by
    /// directions sampled on the cone of angle `acos(cos_alpha)` around `n`.
    fn get_neighbors_in_cone(&self, p: &[f64; 3], n: &[f64; 3], cos_alpha: f64, try_reverse: bool, nei: &mut Vec<usize>);
}

/// Regular grid over the unit cube whose occupied cells own an [`AngularGrid`].
///
/// Cells are allocated on first insertion, so a grid exists for a cell if and
/// only if at least one element was inserted there.
#[derive(Clone, Debug)]
pub struct EuclideanCells<const D: usize> {
    epsilon: f64,
    eg_size: usize,
    bucket_count: usize,
    slots: HashMap<[usize; D], usize>,
    grids: Vec<AngularGrid>,
}

impl<const D: usize> EuclideanCells<D> {
    /// `eg_size = 2^trunc(-log2(epsilon))` cells per dimension, and the grid
    /// depth must be at least one.
    pub fn new(epsilon: f64, bucket_count: usize) -> CoreResult<Self> {
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(CoreError::InvalidConfiguration(format!("invalid epsilon {}", epsilon)));
        }
        let depth = (-epsilon.log2()) as i32;
        if depth <= 0 {
            return Err(CoreError::InvalidConfiguration(format!(
                "epsilon {} gives a grid depth of {}",
                epsilon, depth
            )));
        }
        let eg_size = 1usize
            .checked_shl(depth as u32)
            .ok_or_else(|| CoreError::InvalidConfiguration(format!("grid depth {} is too fine", depth)))?;
        if bucket_count == 0 {
            return Err(CoreError::InvalidConfiguration("angular grid needs at least one bucket".into()));
        }

        Ok(Self {
            epsilon: 1.0 / eg_size as f64,
            eg_size,
            bucket_count,
            slots: HashMap::new(),
            grids: Vec::new(),
        })
    }

    /// Quantised cell edge length.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Number of cells per dimension.
    pub fn grid_size(&self) -> usize {
        self.eg_size
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Number of cells holding at least one element.
    pub fn populated_cells(&self) -> usize {
        self.grids.len()
    }

    pub fn coordinates_pos(&self, p: &[f64; D]) -> [f64; D] {
        std::array::from_fn(|d| p[d] / self.epsilon)
    }

    /// Integer cell coordinates of `p`, or `None` outside `[0, 1)^D`.
    pub fn index_pos(&self, p: &[f64; D]) -> Option<[usize; D]> {
        cell_coordinates(&self.coordinates_pos(p), self.eg_size)
    }

    pub fn angular_grid(&self, p: &[f64; D]) -> Option<&AngularGrid> {
        let cell = self.index_pos(p)?;
        self.slots.get(&cell).map(|&slot| &self.grids[slot])
    }

    pub fn insert(&mut self, p: &[f64; D], bucket: usize, id: usize) {
        let Some(cell) = self.index_pos(p) else { return };
        if bucket >= self.bucket_count {
            return;
        }
        let slot = match self.slots.get(&cell) {
            Some(&slot) => slot,
            None => {
                self.grids.push(vec![Vec::new(); self.bucket_count]);
                self.slots.insert(cell, self.grids.len() - 1);
                self.grids.len() - 1
            }
        };
        self.grids[slot][bucket].push(id);
    }

    /// All ids of the cell of `p`, bucket by bucket.
    pub fn neighbors(&self, p: &[f64; D], nei: &mut Vec<usize>) {
        if let Some(grid) = self.angular_grid(p) {
            for bucket in grid {
                nei.extend_from_slice(bucket);
            }
        }
    }

    pub fn neighbors_in_bucket(&self, p: &[f64; D], bucket: usize, nei: &mut Vec<usize>) {
        if let Some(ids) = self.angular_grid(p).and_then(|g| g.get(bucket)) {
            nei.extend_from_slice(ids);
        }
    }

    /// Appends the content of the distinct non-empty buckets, in bucket order.
    pub fn neighbors_in_buckets(&self, p: &[f64; D], buckets: impl IntoIterator<Item = usize>, nei: &mut Vec<usize>) {
        let Some(grid) = self.angular_grid(p) else { return };
        let colored: BTreeSet<usize> = buckets
            .into_iter()
            .filter(|&b| grid.get(b).is_some_and(|ids| !ids.is_empty()))
            .collect();
        for b in colored {
            nei.extend_from_slice(&grid[b]);
        }
    }
}

/// `floor(c[d])` per dimension, or `None` if any coordinate falls outside `[0, size)`.
pub(crate) fn cell_coordinates<const D: usize>(coords: &[f64; D], size: usize) -> Option<[usize; D]> {
    let mut cell = [0usize; D];
    for (i, c) in cell.iter_mut().zip(coords) {
        if !(*c >= 0.0 && *c < size as f64) {
            return None;
        }
        *i = *c as usize;
    }
    Some(cell)
}

/// `sum(floor(c[d]) * size^d)`, or `None` if any coordinate falls outside `[0, size)`.
/// Callers keep `size^D` within `usize`.
pub(crate) fn unordered_index<const D: usize>(coords: &[f64; D], size: usize) -> Option<usize> {
    let cell = cell_coordinates(coords, size)?;
    Some(cell.iter().rev().fold(0, |index, &c| index * size + c))
}

/// Directions sampled on the cone of angle `acos(cos_alpha)` around `n`.
///
/// A degenerate cone (angle 0 or pi) yields its axis once.
pub(crate) fn cone_directions(n: &[f64; 3], cos_alpha: f64, nb_sample: usize) -> Vec<[f64; 3]> {
    let cos_alpha = cos_alpha.clamp(-1.0, 1.0);
    let axis = normalized(n);
    let alpha = cos_alpha.acos();
    let sin_alpha = alpha.sin();
    if sin_alpha.abs() < 1e-12 {
        return vec![scale(&axis, cos_alpha.signum())];
    }

    let angle_step = std::f64::consts::TAU / nb_sample.max(1) as f64;
    (0..nb_sample.max(1))
        .map(|a| {
            let theta = a as f64 * angle_step;
            let local = [sin_alpha * theta.cos(), sin_alpha * theta.sin(), cos_alpha];
            normalized(&rotate_from_z(&axis, &local))
        })
        .collect()
}
