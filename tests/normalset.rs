use rand::prelude::*;
use rand::rngs::StdRng;
use super4pcs_core::point::normalized;
use super4pcs_core::{IndexedNormalHealSet, IndexedNormalSet};

fn oriented_points(n: usize, seed: u64) -> Vec<([f64; 3], [f64; 3])> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let p = [rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)];
            let n = normalized(&[rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)]);
            (p, n)
        })
        .collect()
}

#[test]
fn test_grid_set_round_trip() {
    let elements = oriented_points(500, 3);
    let mut set = IndexedNormalSet::<3>::new(0.1, 7).unwrap();
    let mut populated = 0;
    for (id, (p, n)) in elements.iter().enumerate() {
        set.add_element(p, n, id);
        assert!(set.populated_cells() >= populated);
        populated = set.populated_cells();
    }
    assert!(populated <= set.grid_size().pow(3));

    let mut nei = Vec::new();
    for (id, (p, n)) in elements.iter().enumerate() {
        nei.clear();
        set.get_neighbors_with_normal(p, n, &mut nei);
        assert!(nei.contains(&id), "element {} not found in its own bucket", id);
        for other in &nei {
            assert_eq!(set.index_pos(&elements[*other].0), set.index_pos(p));
            assert_eq!(set.index_normal(&elements[*other].1), set.index_normal(n));
        }

        nei.clear();
        set.get_neighbors(p, &mut nei);
        assert!(nei.contains(&id));
    }
}

#[test]
fn test_heal_set_round_trip() {
    let elements = oriented_points(500, 4);
    let mut set = IndexedNormalHealSet::new(0.1, 4).unwrap();
    for (id, (p, n)) in elements.iter().enumerate() {
        set.add_element(p, n, id);
    }

    let mut nei = Vec::new();
    let mut cone = Vec::new();
    for (id, (p, n)) in elements.iter().enumerate() {
        nei.clear();
        set.get_neighbors_with_normal(p, n, &mut nei);
        assert!(nei.contains(&id));

        // a zero-angle cone is the bucket of its axis
        cone.clear();
        set.get_neighbors_in_cone(p, n, 1.0, false, &mut cone);
        assert_eq!(cone, nei);

        cone.clear();
        set.get_neighbors_in_cone(p, n, 1.0, true, &mut cone);
        assert!(nei.iter().all(|i| cone.contains(i)));
    }
}

#[test]
fn test_cone_results_stay_in_cell() {
    let elements = oriented_points(300, 9);
    let mut set = IndexedNormalSet::<3>::new(0.2, 7).unwrap();
    for (id, (p, n)) in elements.iter().enumerate() {
        set.add_element(p, n, id);
    }

    let mut nei = Vec::new();
    for (p, n) in &elements {
        nei.clear();
        set.get_neighbors_in_cone(p, n, 0.3, true, &mut nei);
        let mut dedup = nei.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), nei.len());
        for id in &nei {
            assert_eq!(set.index_pos(&elements[*id].0), set.index_pos(p));
        }
    }
}

#[test]
fn test_out_of_cube_queries_are_empty() {
    let mut set = IndexedNormalSet::<3>::new(0.1, 7).unwrap();
    set.add_element(&[1.2, 0.5, 0.5], &[0.0, 0.0, 1.0], 0);
    assert_eq!(set.populated_cells(), 0);

    let mut nei = Vec::new();
    set.get_neighbors_in_cone(&[1.2, 0.5, 0.5], &[0.0, 0.0, 1.0], 0.5, true, &mut nei);
    set.get_neighbors(&[-0.1, 0.5, 0.5], &mut nei);
    assert!(nei.is_empty());
}

#[test]
fn test_finer_grids_populate_more_cells() {
    let elements = oriented_points(200, 21);
    let mut previous = (0, 0);
    for eps in [0.4, 0.2, 0.1, 0.05, 0.02, 0.01] {
        let mut set = IndexedNormalSet::<3>::new(eps, 7).unwrap();
        for (id, (p, n)) in elements.iter().enumerate() {
            set.add_element(p, n, id);
        }
        assert!(set.grid_size() > previous.0);
        assert!(
            set.populated_cells() >= previous.1,
            "{} cells at eps {}, {} before",
            set.populated_cells(),
            eps,
            previous.1
        );
        assert!(set.populated_cells() <= elements.len());
        previous = (set.grid_size(), set.populated_cells());
    }
}
