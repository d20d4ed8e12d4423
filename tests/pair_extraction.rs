use std::collections::BTreeSet;
use std::f64::consts::PI;

use rand::prelude::*;
use rand::rngs::StdRng;
use super4pcs_core::point::{add, distance, norm, normalized, sub};
use super4pcs_core::{
    BruteForceFunctor, CongruentMatcher, HyperSphere, IntersectionFunctor, IntersectionStrategy, MatchOptions, Point3D,
};

fn random_cloud(n: usize, seed: u64) -> Vec<Point3D> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let pos = [rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)];
            let n = normalized(&[rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)]);
            Point3D::new(pos, n)
        })
        .collect()
}

fn base() -> [Point3D; 4] {
    [
        Point3D::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        Point3D::new([3.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        Point3D::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        Point3D::new([0.0, 1.0, 2.0], [0.0, 0.0, 1.0]),
    ]
}

/// O(n^2) scan, both orientations of every accepted pair.
fn naive_pairs(q: &[Point3D], target: f64, eps: f64, normal_threshold: Option<(f64, f64)>) -> BTreeSet<(usize, usize)> {
    let mut pairs = BTreeSet::new();
    for i in 0..q.len() {
        for j in 0..i {
            if (distance(&q[i].pos, &q[j].pos) - target).abs() > eps {
                continue;
            }
            if let Some((angle, threshold)) = normal_threshold {
                let first = norm(&sub(&q[i].normal, &q[j].normal));
                let second = norm(&add(&q[i].normal, &q[j].normal));
                if (first - angle).abs().min((second - angle).abs()) > threshold {
                    continue;
                }
            }
            pairs.insert((i, j));
            pairs.insert((j, i));
        }
    }
    pairs
}

#[test]
fn test_extraction_is_complete() {
    for (size, seed) in [(50, 1), (200, 2), (500, 3)] {
        let q = random_cloud(size, seed);
        let mut matcher = CongruentMatcher::new(&q, MatchOptions::default()).unwrap();
        let pairs = matcher.extract_pairs(&IntersectionFunctor, 3.0, 0.05, 0, 1, &base()).unwrap();

        let found: BTreeSet<(usize, usize)> = pairs.iter().copied().collect();
        assert_eq!(found.len(), pairs.len(), "duplicate pairs for {} points", size);
        assert_eq!(found, naive_pairs(&q, 3.0, 0.05, None), "mismatch for {} points", size);
    }
}

#[test]
fn test_extraction_with_normal_filter() {
    let q = random_cloud(300, 11);
    let options = MatchOptions { max_normal_difference: 30.0, ..Default::default() };
    let mut matcher = CongruentMatcher::new(&q, options).unwrap();
    let b = base();
    let pairs = matcher.extract_pairs(&IntersectionFunctor, 4.0, 0.1, 0, 1, &b).unwrap();

    let angle = norm(&sub(&b[1].normal, &b[0].normal));
    let threshold = 0.5 * 30.0 * PI / 180.0;
    let expected = naive_pairs(&q, 4.0, 0.1, Some((angle, threshold)));
    let found: BTreeSet<(usize, usize)> = pairs.into_iter().collect();
    assert!(!expected.is_empty());
    assert_eq!(found, expected);
}

#[test]
fn test_strategies_agree() {
    let q = random_cloud(250, 5);
    let mut matcher = CongruentMatcher::new(&q, MatchOptions::default()).unwrap();
    let fast: BTreeSet<_> = matcher
        .extract_pairs(&IntersectionFunctor, 2.0, 0.05, 0, 1, &base())
        .unwrap()
        .into_iter()
        .collect();
    let slow: BTreeSet<_> = matcher
        .extract_pairs(&BruteForceFunctor, 2.0, 0.05, 0, 1, &base())
        .unwrap()
        .into_iter()
        .collect();
    assert!(!fast.is_empty());
    assert_eq!(fast, slow);
}

#[test]
fn test_tiny_clouds() {
    let empty: Vec<Point3D> = Vec::new();
    let mut matcher = CongruentMatcher::new(&empty, MatchOptions::default()).unwrap();
    assert!(matcher.extract_pairs(&IntersectionFunctor, 1.0, 0.01, 0, 1, &base()).unwrap().is_empty());

    let single = vec![Point3D::from_pos([1.0, 2.0, 3.0])];
    let mut matcher = CongruentMatcher::new(&single, MatchOptions::default()).unwrap();
    assert!(matcher.extract_pairs(&IntersectionFunctor, 1.0, 0.01, 0, 1, &base()).unwrap().is_empty());
}

#[test]
fn test_invalid_base_index() {
    let q = random_cloud(10, 0);
    let mut matcher = CongruentMatcher::new(&q, MatchOptions::default()).unwrap();
    assert!(matcher.extract_pairs(&IntersectionFunctor, 1.0, 0.01, 0, 4, &base()).is_err());
    assert!(matcher.extract_pairs(&IntersectionFunctor, 1.0, 0.0, 0, 1, &base()).is_err());
}

#[test]
fn test_power_of_two_epsilon_at_any_node_size() {
    let mut rng = StdRng::seed_from_u64(42);
    let points: Vec<[f64; 3]> = (0..400)
        .map(|_| [rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)])
        .collect();
    let primitives: Vec<HyperSphere<3>> = points.iter().map(|p| HyperSphere::new(*p, 0.3)).collect();
    let epsilon = 1.0 / 32.0;

    let mut reference: Vec<(usize, usize)> = Vec::new();
    BruteForceFunctor.process(&primitives, &points, epsilon, 1, &mut reference).unwrap();
    let reference: BTreeSet<_> = reference.into_iter().filter(|(i, j)| i > j).collect();
    assert!(!reference.is_empty());

    for min_node_size in [1, 10, 1000] {
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        let used = IntersectionFunctor.process(&primitives, &points, epsilon, min_node_size, &mut pairs).unwrap();
        assert_eq!(used, epsilon);
        let found: BTreeSet<_> = pairs.iter().copied().collect();
        assert_eq!(found.len(), pairs.len());
        assert_eq!(found, reference, "min_node_size {}", min_node_size);
    }
}

#[test]
fn test_tolerance_wider_than_cloud() {
    let q = vec![
        Point3D::from_pos([0.0, 0.0, 0.0]),
        Point3D::from_pos([0.7, 0.0, 0.0]),
        Point3D::from_pos([1.0, 1.0, 1.0]),
    ];
    let mut matcher = CongruentMatcher::new(&q, MatchOptions::default()).unwrap();
    let fast: BTreeSet<_> = matcher
        .extract_pairs(&IntersectionFunctor, 5.0, 4.5, 0, 1, &base())
        .unwrap()
        .into_iter()
        .collect();
    let slow: BTreeSet<_> = matcher
        .extract_pairs(&BruteForceFunctor, 5.0, 4.5, 0, 1, &base())
        .unwrap()
        .into_iter()
        .collect();

    // every distance of the cloud lies in [0.5, 9.5]
    assert_eq!(fast, naive_pairs(&q, 5.0, 4.5, None));
    assert_eq!(fast.len(), 6);
    assert_eq!(fast, slow);
}
