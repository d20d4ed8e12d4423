use crate::error::{CoreError, CoreResult};
use crate::matcher::{CongruentMatcher, Quadrilateral, segment_invariants};
use crate::normalset::{IndexedNormalHealSet, IndexedNormalSet};
use crate::options::MatchOptions;
use crate::pair_extraction::IntersectionFunctor;
use crate::point::Point3D;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

fn to_js(e: CoreError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_points(positions: &[f64], normals: &[f64]) -> CoreResult<Vec<Point3D>> {
    if positions.len() % 3 != 0 {
        return Err(CoreError::InvalidConfiguration(format!(
            "position array length {} is not a multiple of 3",
            positions.len()
        )));
    }
    if !normals.is_empty() && normals.len() != positions.len() {
        return Err(CoreError::InvalidConfiguration(format!(
            "expected {} normal coordinates, got {}",
            positions.len(),
            normals.len()
        )));
    }
    Ok(positions
        .chunks_exact(3)
        .enumerate()
        .map(|(i, p)| {
            let pos = [p[0], p[1], p[2]];
            match normals.get(3 * i..3 * i + 3) {
                Some(n) => Point3D::new(pos, [n[0], n[1], n[2]]),
                None => Point3D::from_pos(pos),
            }
        })
        .collect())
}

fn parse_base(positions: &[f64], normals: &[f64]) -> CoreResult<[Point3D; 4]> {
    if positions.len() != 12 {
        return Err(CoreError::InvalidConfiguration(format!(
            "a base needs 12 coordinates, got {}",
            positions.len()
        )));
    }
    let points = parse_points(positions, normals)?;
    Ok([points[0], points[1], points[2], points[3]])
}

fn parse_pairs(flat: &[u32]) -> CoreResult<Vec<(usize, usize)>> {
    if flat.len() % 2 != 0 {
        return Err(CoreError::InvalidConfiguration("pair array length must be even".into()));
    }
    Ok(flat.chunks_exact(2).map(|c| (c[0] as usize, c[1] as usize)).collect())
}

fn flatten_pairs(pairs: &[(usize, usize)]) -> Vec<u32> {
    pairs.iter().flat_map(|&(i, j)| [i as u32, j as u32]).collect()
}

fn flatten_quadrilaterals(quads: &[Quadrilateral]) -> Vec<u32> {
    quads.iter().flat_map(|q| q.indices().map(|i| i as u32)).collect()
}

/// Pair extraction and congruent set search over a point cloud given as flat
/// `[x0, y0, z0, x1, ...]` arrays.
#[wasm_bindgen(js_name = PairExtractor)]
pub struct PairExtractor {
    points: Vec<Point3D>,
    options: MatchOptions,
    use_healpix: bool,
}

#[wasm_bindgen(js_class = PairExtractor)]
impl PairExtractor {
    /// `normals` may be empty, in which case the normal filter is skipped.
    #[wasm_bindgen(constructor)]
    pub fn new(positions: &[f64], normals: &[f64]) -> Result<PairExtractor, JsValue> {
        Ok(PairExtractor {
            points: parse_points(positions, normals).map_err(to_js)?,
            options: MatchOptions::default(),
            use_healpix: false,
        })
    }

    #[wasm_bindgen(getter)]
    pub fn count(&self) -> usize {
        self.points.len()
    }

    /// Attaches flat RGB triplets to the points, enabling the colour filter.
    pub fn set_colors(&mut self, colors: &[f64]) -> Result<(), JsValue> {
        if colors.len() != 3 * self.points.len() {
            return Err(to_js(CoreError::InvalidConfiguration(format!(
                "expected {} colour components, got {}",
                3 * self.points.len(),
                colors.len()
            ))));
        }
        for (p, c) in self.points.iter_mut().zip(colors.chunks_exact(3)) {
            p.rgb = Some([c[0], c[1], c[2]]);
        }
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn max_normal_difference(&self) -> f64 {
        self.options.max_normal_difference
    }

    #[wasm_bindgen(setter)]
    pub fn set_max_normal_difference(&mut self, degrees: f64) {
        self.options.max_normal_difference = degrees;
    }

    #[wasm_bindgen(getter)]
    pub fn max_color_distance(&self) -> f64 {
        self.options.max_color_distance
    }

    #[wasm_bindgen(setter)]
    pub fn set_max_color_distance(&mut self, distance: f64) {
        self.options.max_color_distance = distance;
    }

    #[wasm_bindgen(getter)]
    pub fn multiscale(&self) -> bool {
        self.options.multiscale
    }

    #[wasm_bindgen(setter)]
    pub fn set_multiscale(&mut self, multiscale: bool) {
        self.options.multiscale = multiscale;
    }

    #[wasm_bindgen(getter)]
    pub fn min_node_size(&self) -> usize {
        self.options.min_node_size
    }

    #[wasm_bindgen(setter)]
    pub fn set_min_node_size(&mut self, size: usize) {
        self.options.min_node_size = size;
    }

    /// Selects the HEALPix normal index instead of the regular angular grid.
    #[wasm_bindgen(getter)]
    pub fn use_healpix(&self) -> bool {
        self.use_healpix
    }

    #[wasm_bindgen(setter)]
    pub fn set_use_healpix(&mut self, use_healpix: bool) {
        self.use_healpix = use_healpix;
    }

    /// Pairs matching the base segment `base_point1 -> base_point2`, returned
    /// as flat `[i0, j0, i1, j1, ...]` indices.
    pub fn extract_pairs(
        &self,
        pair_distance: f64,
        pair_distance_epsilon: f64,
        base: &[f64],
        base_normals: &[f64],
        base_point1: usize,
        base_point2: usize,
    ) -> Result<Vec<u32>, JsValue> {
        let base = parse_base(base, base_normals).map_err(to_js)?;
        let mut matcher = CongruentMatcher::new(&self.points, self.options.clone()).map_err(to_js)?;
        let pairs = matcher
            .extract_pairs(&IntersectionFunctor, pair_distance, pair_distance_epsilon, base_point1, base_point2, &base)
            .map_err(to_js)?;
        Ok(flatten_pairs(&pairs))
    }

    /// Congruent quadrilaterals as flat `[a0, b0, c0, d0, a1, ...]` indices.
    #[allow(clippy::too_many_arguments)]
    pub fn find_congruent_quadrilaterals(
        &self,
        invariant1: f64,
        invariant2: f64,
        distance_threshold: f64,
        base: &[f64],
        base_normals: &[f64],
        first_pairs: &[u32],
        second_pairs: &[u32],
    ) -> Result<Vec<u32>, JsValue> {
        let base = parse_base(base, base_normals).map_err(to_js)?;
        let first = parse_pairs(first_pairs).map_err(to_js)?;
        let second = parse_pairs(second_pairs).map_err(to_js)?;
        let matcher = CongruentMatcher::new(&self.points, self.options.clone()).map_err(to_js)?;

        let mut quads = Vec::new();
        if self.use_healpix {
            matcher.find_congruent_quadrilaterals_with::<IndexedNormalHealSet>(
                invariant1,
                invariant2,
                distance_threshold,
                &base,
                &first,
                &second,
                &mut quads,
            )
        } else {
            matcher.find_congruent_quadrilaterals_with::<IndexedNormalSet<3>>(
                invariant1,
                invariant2,
                distance_threshold,
                &base,
                &first,
                &second,
                &mut quads,
            )
        }
        .map_err(to_js)?;
        Ok(flatten_quadrilaterals(&quads))
    }
}

/// `[invariant1, invariant2]` of a flat 4-point base, or `undefined` when its
/// segments are parallel.
#[wasm_bindgen(js_name = segmentInvariants)]
pub fn segment_invariants_flat(base: &[f64]) -> Result<Option<Vec<f64>>, JsValue> {
    let base = parse_base(base, &[]).map_err(to_js)?;
    Ok(segment_invariants(&base).map(|(s, t)| vec![s, t]))
}
