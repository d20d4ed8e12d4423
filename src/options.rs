use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Tunables shared by pair extraction and congruent set search.
///
/// All fields have defaults, so a partial JSON/TOML document is enough to
/// override a single value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Maximum normal difference in degrees. Values `<= 0` disable the normal filter.
    pub max_normal_difference: f64,
    /// Maximum colour distance. Values `<= 0` disable the colour filter.
    pub max_color_distance: f64,
    /// Skip the world-space distance check when creating pairs.
    pub multiscale: bool,
    /// Nodes holding at most this many points are not split further.
    pub min_node_size: usize,
    /// Cells per dimension of the regular angular grid.
    pub normal_grid_size: usize,
    /// HEALPix resolution (nside) of the angular buckets.
    pub healpix_resolution: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_normal_difference: -1.0,
            max_color_distance: -1.0,
            multiscale: false,
            min_node_size: 50,
            normal_grid_size: 7,
            healpix_resolution: 4,
        }
    }
}

impl MatchOptions {
    /// Checks that the options can be used to build the spatial structures.
    pub fn validate(&self) -> CoreResult<()> {
        if self.min_node_size == 0 {
            return Err(CoreError::InvalidConfiguration("min_node_size must be at least 1".into()));
        }
        if self.normal_grid_size == 0 {
            return Err(CoreError::InvalidConfiguration("normal_grid_size must be at least 1".into()));
        }
        if self.healpix_resolution == 0 {
            return Err(CoreError::InvalidConfiguration("healpix_resolution must be at least 1".into()));
        }
        Ok(())
    }

    /// Whether the normal-angle test of the default pair filter is active.
    pub fn filters_normals(&self) -> bool {
        self.max_normal_difference > 0.0
    }

    /// Whether the colour test of the default pair filter is active.
    pub fn filters_colors(&self) -> bool {
        self.max_color_distance > 0.0
    }
}
