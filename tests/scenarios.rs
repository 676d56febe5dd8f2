use bevy_math::DVec3;
use ptsearch::{PointSearch, SearchError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn brute_force_closest(points: &[(f64, f64)], x: f64, y: f64) -> usize {
    points
        .iter()
        .enumerate()
        .map(|(i, &(px, py))| (i, (px - x).powi(2) + (py - y).powi(2)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .map(|(i, _)| i)
        .unwrap()
}

fn random_cloud(n: usize, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (rng.gen_range(-500.0..500.0), rng.gen_range(-500.0..500.0)))
        .collect()
}

fn exhaustive_check(n: usize, seed: u64, refine_level: i64) {
    let points = random_cloud(n, seed);
    let mut search = PointSearch::new();
    for &(x, y) in &points {
        search.add_point(DVec3::new(x, y, 0.0), DVec3::ZERO).unwrap();
    }
    search.refine_times(refine_level).unwrap();

    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    for _ in 0..50 {
        let qx = rng.gen_range(-500.0..500.0);
        let qy = rng.gen_range(-500.0..500.0);
        let expected = brute_force_closest(&points, qx, qy);
        let (got, _) = search.closest_xy(qx, qy).unwrap();
        let expected_loc = points[expected];
        let got_loc = search.get(got as usize).unwrap().location();
        let expected_d2 = (expected_loc.0 - qx).powi(2) + (expected_loc.1 - qy).powi(2);
        let got_d2 = (got_loc.x - qx).powi(2) + (got_loc.y - qy).powi(2);
        assert!(
            (got_d2 - expected_d2).abs() < 1e-9,
            "n={n} seed={seed}: query ({qx}, {qy}) got dist_sq {got_d2}, expected {expected_d2} (ties aside, distances must match)"
        );
    }
}

#[test]
fn test_correctness_single_point() {
    exhaustive_check(1, 1, 3);
}

#[test]
fn test_correctness_ten_points() {
    exhaustive_check(10, 2, 4);
}

#[test]
fn test_correctness_one_thousand_points() {
    exhaustive_check(1_000, 3, 6);
}

#[test]
fn test_correctness_fifty_thousand_points() {
    exhaustive_check(50_000, 4, 8);
}

#[test]
fn test_refinement_is_idempotent_in_cell_count() {
    let points = random_cloud(2_000, 10);
    let mut search = PointSearch::new();
    for &(x, y) in &points {
        search.add_point(DVec3::new(x, y, 0.0), DVec3::ZERO).unwrap();
    }
    let cells_a = search.refine_times(5).unwrap();
    let cells_b = search.refine_times(0).unwrap();
    assert_eq!(cells_a, cells_b);
}

#[test]
fn test_region_widening_is_monotone() {
    let mut search = PointSearch::new();
    search.add_point(DVec3::new(0.0, 0.0, 0.0), DVec3::ZERO).unwrap();
    let r0 = search.region();
    search.add_point(DVec3::new(10.0, -5.0, 0.0), DVec3::ZERO).unwrap();
    let r1 = search.region();
    assert!(r1.xmax() >= r0.xmax());
    assert!(r1.ymin() <= r0.ymin());

    search.expand_region(-20.0, -20.0, 20.0, 20.0).unwrap();
    let r2 = search.region();
    assert!(r2.xmin() <= r1.xmin());
    assert!(r2.xmax() >= r1.xmax());
}

#[test]
fn test_select_count_is_observable_and_resettable() {
    let points = random_cloud(200, 20);
    let mut search = PointSearch::new();
    for &(x, y) in &points {
        search.add_point(DVec3::new(x, y, 0.0), DVec3::ZERO).unwrap();
    }
    search.refine_times(4).unwrap();

    let (idx, count1) = search.closest_xy(points[0].0, points[0].1).unwrap();
    assert_eq!(count1, 1);
    let (idx2, count2) = search.closest_xy(points[0].0, points[0].1).unwrap();
    assert_eq!(idx, idx2);
    assert_eq!(count2, 2);

    search.clear_select_counts();
    assert_eq!(search.get(idx as usize).unwrap().select_count(), 0);
}

#[test]
fn test_closest_xy_rejects_out_of_region_query() {
    let mut search = PointSearch::new();
    search.add_point(DVec3::new(0.0, 0.0, 0.0), DVec3::ZERO).unwrap();
    search.add_point(DVec3::new(10.0, 10.0, 0.0), DVec3::ZERO).unwrap();
    search.refine_times(3).unwrap();
    let err = search.closest_xy(1000.0, 1000.0).unwrap_err();
    assert!(matches!(err, SearchError::OutOfRegion { .. }));
}

#[test]
fn test_closest_xy_on_empty_store_errors() {
    let mut search = PointSearch::new();
    let err = search.closest_xy(0.0, 0.0).unwrap_err();
    assert!(matches!(err, SearchError::EmptyStore));
}

#[test]
fn test_cell_list_invariant_holds_after_many_refinements() {
    // A cell's list must be a superset of entries it physically contains;
    // in_count can never exceed list length.
    let points = random_cloud(5_000, 55);
    let mut search = PointSearch::new();
    for &(x, y) in &points {
        search.add_point(DVec3::new(x, y, 0.0), DVec3::ZERO).unwrap();
    }
    search.refine_until(2048, 0.0, 0.0).unwrap();
    let stats = search.stats();
    assert!(stats.avg_in_count <= stats.avg_list_len + 1e-9);
}
