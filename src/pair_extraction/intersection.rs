use rayon::prelude::*;
use tracing::{debug, trace};

use super::nd_node::NdNode;
use super::{IntersectionStrategy, PairProcessor, validate_epsilon};
use crate::error::CoreResult;
use crate::primitive::HyperSphere;

/// Output-sensitive pair extraction by level-wise subdivision of the unit hypercube.
///
/// Only the regions crossed by at least one primitive surface are refined, so
/// the cost follows the number of reported pairs rather than `|M| * |Q|` when
/// the primitives are sparse in the unit cube.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntersectionFunctor;

impl IntersectionFunctor {
    pub fn new() -> Self {
        Self
    }

    /// Number of subdivision levels and the power-of-two epsilon they imply.
    ///
    /// `lvl_max = trunc(-log2(epsilon))` and the quantised epsilon is `2^-lvl_max`.
    /// Tolerances coarser than the unit cube give no level and are kept as is,
    /// so the quantised epsilon is never below the input.
    pub fn quantize_epsilon(epsilon: f64) -> (i32, f64) {
        let lvl_max = ((-epsilon.log2()) as i32).max(0);
        (lvl_max, epsilon.max(2f64.powi(-lvl_max)))
    }
}

impl<const D: usize> IntersectionStrategy<D> for IntersectionFunctor {
    fn process<P: PairProcessor>(
        &self,
        primitives: &[HyperSphere<D>],
        points: &[[f64; D]],
        epsilon: f64,
        min_node_size: usize,
        processor: &mut P,
    ) -> CoreResult<f64> {
        validate_epsilon(epsilon)?;
        let (lvl_max, epsilon) = Self::quantize_epsilon(epsilon);
        debug!(lvl_max, epsilon, primitives = primitives.len(), points = points.len(), "subdividing unit cube");

        let mut ids: Vec<usize> = (0..points.len()).collect();
        let mut current_nodes = vec![NdNode::<D>::build_unit_root_node(&ids)];
        let mut next_nodes: Vec<NdNode<D>> = Vec::new();
        // leaves stopped before the last level, with the tolerance they were tested with
        let mut early_nodes: Vec<(NdNode<D>, f64)> = Vec::new();

        // half edge of the nodes in `current_nodes`
        let mut edge_half_length = 0.5;

        for level in 0..(lvl_max - 1).max(0) {
            if current_nodes.is_empty() {
                break;
            }
            let tolerance = edge_half_length + epsilon;

            // read-only: which nodes are crossed by any primitive
            let hits: Vec<bool> = current_nodes
                .par_iter()
                .map(|n| primitives.iter().any(|m| m.intersect(n.center(), tolerance)))
                .collect();

            next_nodes.clear();
            for (node, hit) in current_nodes.iter().zip(hits) {
                if !hit {
                    continue;
                }
                if node.range_length() > min_node_size {
                    node.split(points, &mut ids, edge_half_length, &mut next_nodes);
                } else {
                    early_nodes.push((*node, tolerance));
                }
            }
            std::mem::swap(&mut current_nodes, &mut next_nodes);
            edge_half_length /= 2.0;
            trace!(level, active = current_nodes.len(), early = early_nodes.len(), "level done");
        }

        let tolerance = edge_half_length + epsilon;
        let ids = &ids;
        let candidates: Vec<Vec<usize>> = (0..primitives.len())
            .into_par_iter()
            .map(|i| {
                let m = &primitives[i];
                let mut found = Vec::new();
                let nodes = current_nodes
                    .iter()
                    .map(|n| (n, tolerance))
                    .chain(early_nodes.iter().map(|(n, t)| (n, *t)));
                for (n, t) in nodes {
                    if !m.intersect(n.center(), t) {
                        continue;
                    }
                    for j in 0..n.range_length() {
                        let id = n.id_in_range(ids, j);
                        if i > id && m.intersect_point(&points[id], epsilon) {
                            found.push(id);
                        }
                    }
                }
                found
            })
            .collect();

        let mut reported = 0usize;
        for (i, found) in candidates.into_iter().enumerate() {
            processor.begin_primitive_collect(i);
            reported += found.len();
            for j in found {
                processor.process(i, j);
            }
            processor.end_primitive_collect(i);
        }
        debug!(early_nodes = early_nodes.len(), leaf_nodes = current_nodes.len(), reported, "pair extraction done");

        Ok(epsilon)
    }
}
