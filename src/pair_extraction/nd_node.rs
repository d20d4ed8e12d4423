use crate::bounds::BoundingBox;

/// A cuboid region of the unit hypercube holding the point ids `ids[begin..end]`.
///
/// Nodes do not own anything: the id permutation lives with the caller and
/// `split` partitions the node's own range of it in place. Sibling nodes cover
/// disjoint ranges, so their splits touch disjoint parts of the id array.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NdNode<const D: usize> {
    begin: usize,
    end: usize,
    center: [f64; D],
}

impl<const D: usize> NdNode<D> {
    /// Node over `ids[begin..end]` whose cube is centred at `center`.
    pub fn new(begin: usize, end: usize, center: [f64; D]) -> Self {
        Self { begin, end, center }
    }

    /// Root node covering the whole unit hypercube and all `ids`.
    pub fn build_unit_root_node(ids: &[usize]) -> Self {
        Self::new(0, ids.len(), BoundingBox::<D>::unit().center())
    }

    /// Centre of the node cube, in unit coordinates.
    pub fn center(&self) -> &[f64; D] {
        &self.center
    }

    /// First offset of the node range in the id permutation.
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// One past the last offset of the node range.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of point ids held by the node.
    pub fn range_length(&self) -> usize {
        self.end - self.begin
    }

    /// Point id stored at offset `j` of the node range.
    pub fn id_in_range(&self, ids: &[usize], j: usize) -> usize {
        ids[self.begin + j]
    }

    pub fn point_in_range<'a>(&self, points: &'a [[f64; D]], ids: &[usize], j: usize) -> &'a [f64; D] {
        &points[self.id_in_range(ids, j)]
    }

    /// Splits the node into at most `2^D` children of half its edge length.
    ///
    /// Dimension 0 partitions the whole range around the node centre, then each
    /// half is partitioned along dimension 1, and so on. Children are appended
    /// to `children` lower half first; empty children are dropped.
    pub fn split(
        &self,
        points: &[[f64; D]],
        ids: &mut [usize],
        root_edge_half_length: f64,
        children: &mut Vec<NdNode<D>>,
    ) {
        let child_half = root_edge_half_length / 2.0;
        self.split_dim(points, ids, 0, self.begin, self.end, self.center, child_half, children);
    }

    #[allow(clippy::too_many_arguments)]
    fn split_dim(
        &self,
        points: &[[f64; D]],
        ids: &mut [usize],
        dim: usize,
        start: usize,
        end: usize,
        center: [f64; D],
        child_half: f64,
        children: &mut Vec<NdNode<D>>,
    ) {
        let split_id = partition(points, ids, start, end, dim, self.center[dim]);

        let mut lower = center;
        lower[dim] -= child_half;
        let mut upper = center;
        upper[dim] += child_half;

        if dim + 1 == D {
            if split_id > start {
                children.push(NdNode::new(start, split_id, lower));
            }
            if end > split_id {
                children.push(NdNode::new(split_id, end, upper));
            }
        } else {
            self.split_dim(points, ids, dim + 1, start, split_id, lower, child_half, children);
            self.split_dim(points, ids, dim + 1, split_id, end, upper, child_half, children);
        }
    }
}

/// Hoare-style partition of `ids[start..end]` so that ids whose coordinate
/// `dim` is below `split_value` come first. Returns the first index of the
/// upper part.
fn partition<const D: usize>(
    points: &[[f64; D]],
    ids: &mut [usize],
    start: usize,
    end: usize,
    dim: usize,
    split_value: f64,
) -> usize {
    let mut l = start;
    let mut r = end;
    loop {
        while l < r && points[ids[l]][dim] < split_value {
            l += 1;
        }
        while l < r && points[ids[r - 1]][dim] >= split_value {
            r -= 1;
        }
        if l >= r {
            return l;
        }
        ids.swap(l, r - 1);
        l += 1;
        r -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_split_octants() {
        let points = vec![
            [0.1, 0.1, 0.1],
            [0.9, 0.1, 0.1],
            [0.1, 0.9, 0.1],
            [0.9, 0.9, 0.9],
            [0.2, 0.2, 0.2],
        ];
        let mut ids: Vec<usize> = (0..points.len()).collect();
        let root = NdNode::<3>::build_unit_root_node(&ids);
        let mut children = Vec::new();
        root.split(&points, &mut ids, 0.5, &mut children);

        // four non-empty octants
        assert_eq!(children.len(), 4);
        for child in &children {
            for j in 0..child.range_length() {
                let p = child.point_in_range(&points, &ids, j);
                for d in 0..3 {
                    assert!((p[d] - child.center()[d]).abs() <= 0.25);
                }
            }
        }
        let low = children.iter().find(|c| c.center() == &[0.25, 0.25, 0.25]).unwrap();
        assert_eq!(low.range_length(), 2);
    }

    #[test]
    fn test_root_node_spans_unit_cube() {
        let ids: Vec<usize> = (0..7).collect();
        let root = NdNode::<4>::build_unit_root_node(&ids);
        assert_eq!(root.center(), &[0.5; 4]);
        assert_eq!((root.begin(), root.end()), (0, 7));
        assert_eq!(root.range_length(), 7);
    }

    #[test]
    fn test_split_empty_node() {
        let points: Vec<[f64; 2]> = Vec::new();
        let mut ids: Vec<usize> = Vec::new();
        let root = NdNode::<2>::build_unit_root_node(&ids);
        let mut children = Vec::new();
        root.split(&points, &mut ids, 0.5, &mut children);
        assert!(children.is_empty());
    }

    #[test]
    fn test_partition_all_on_one_side() {
        let points = vec![[0.7], [0.8], [0.9]];
        let mut ids = vec![0, 1, 2];
        assert_eq!(partition(&points, &mut ids, 0, 3, 0, 0.5), 0);
        assert_eq!(partition(&points, &mut ids, 0, 3, 0, 1.0), 3);
    }

    proptest! {
        #[test]
        fn prop_split_preserves_ids(coords in prop::collection::vec(prop::array::uniform3(0.0..1.0f64), 0..200)) {
            let mut ids: Vec<usize> = (0..coords.len()).collect();
            let root = NdNode::<3>::build_unit_root_node(&ids);
            let mut children = Vec::new();
            root.split(&coords, &mut ids, 0.5, &mut children);

            let mut covered = Vec::new();
            for child in &children {
                prop_assert!(child.range_length() > 0);
                for j in 0..child.range_length() {
                    let id = child.id_in_range(&ids, j);
                    for d in 0..3 {
                        let below = coords[id][d] < 0.5;
                        prop_assert_eq!(below, child.center()[d] < 0.5);
                    }
                    covered.push(id);
                }
            }
            prop_assert_eq!(sorted(covered), (0..coords.len()).collect::<Vec<_>>());
        }
    }
}
