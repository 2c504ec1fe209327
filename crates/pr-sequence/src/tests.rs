//! Unit tests for pr-sequence.

#[cfg(test)]
mod helpers {
    use rand::rngs::SmallRng;
    use rand::Rng;

    use pr_core::TimeMatrix;

    /// Depot D plus stops A, B, C with symmetric times
    /// D→A=2, D→B=6, D→C=9, A→B=5, A→C=10, B→C=3.
    pub fn dabc() -> TimeMatrix {
        TimeMatrix::from_rows(vec![
            vec![0.0, 2.0, 6.0, 9.0],
            vec![2.0, 0.0, 5.0, 10.0],
            vec![6.0, 5.0, 0.0, 3.0],
            vec![9.0, 10.0, 3.0, 0.0],
        ])
        .unwrap()
    }

    /// Random asymmetric matrix with all finite entries.
    pub fn random_matrix(rng: &mut SmallRng, n: usize) -> TimeMatrix {
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|_| (0..n).map(|_| f64::from(rng.gen_range(1u32..500))).collect())
            .collect();
        TimeMatrix::from_rows(rows).unwrap()
    }

    /// `true` if `order` is a permutation of `0..n`.
    pub fn is_permutation(order: &[usize], n: usize) -> bool {
        let mut seen = vec![false; n];
        for &i in order {
            if i >= n || seen[i] {
                return false;
            }
            seen[i] = true;
        }
        seen.into_iter().all(|s| s)
    }
}

// ── Sequencer ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sequencer {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use pr_core::TimeMatrix;
    use crate::{tour_cost, RouteSequencer, SequenceError};
    use super::helpers::{dabc, is_permutation, random_matrix};

    #[test]
    fn depot_a_b_c_scenario() {
        let tour = RouteSequencer::default().solve(&dabc(), 0).unwrap();
        assert_eq!(tour.order, vec![0, 1, 2, 3]);
        assert_eq!(tour.total_time, 10.0);
        assert!(tour.is_complete());
    }

    #[test]
    fn greedy_matches_on_scenario() {
        let tour = RouteSequencer::greedy().solve(&dabc(), 0).unwrap();
        assert_eq!(tour.order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn single_stop() {
        let m = TimeMatrix::from_rows(vec![vec![0.0]]).unwrap();
        let tour = RouteSequencer::default().solve(&m, 0).unwrap();
        assert_eq!(tour.order, vec![0]);
        assert_eq!(tour.total_time, 0.0);
    }

    #[test]
    fn empty_matrix_fails() {
        let err = RouteSequencer::default().solve(&TimeMatrix::unreachable(0), 0).unwrap_err();
        assert_eq!(err, SequenceError::EmptyMatrix);
    }

    #[test]
    fn depot_out_of_range_fails() {
        let err = RouteSequencer::default().solve(&dabc(), 4).unwrap_err();
        assert_eq!(err, SequenceError::DepotOutOfRange { depot: 4, n: 4 });
    }

    #[test]
    fn non_zero_depot_comes_first() {
        let tour = RouteSequencer::default().solve(&dabc(), 3).unwrap();
        assert_eq!(tour.order[0], 3);
        assert!(is_permutation(&tour.order, 4));
    }

    #[test]
    fn ties_prefer_lowest_index() {
        let m = TimeMatrix::from_rows(vec![
            vec![0.0, 4.0, 4.0],
            vec![4.0, 0.0, 4.0],
            vec![4.0, 4.0, 0.0],
        ])
        .unwrap();
        let tour = RouteSequencer::default().solve(&m, 0).unwrap();
        assert_eq!(tour.order, vec![0, 1, 2]);
    }

    #[test]
    fn two_opt_untangles_greedy_path() {
        // Greedy from 0 goes 0→1 (1), 1→3 (1) and is then stuck with
        // 3→2 (50).  2-opt settles on 0→1→2→3 = 1 + 2 + 2.
        let m = TimeMatrix::from_rows(vec![
            vec![0.0, 1.0, 9.0, 9.0],
            vec![9.0, 0.0, 2.0, 1.0],
            vec![9.0, 9.0, 0.0, 2.0],
            vec![9.0, 9.0, 50.0, 0.0],
        ])
        .unwrap();
        let greedy = RouteSequencer::greedy().solve(&m, 0).unwrap();
        assert_eq!(greedy.order, vec![0, 1, 3, 2]);
        assert_eq!(greedy.total_time, 52.0);

        let improved = RouteSequencer::default().solve(&m, 0).unwrap();
        assert_eq!(improved.order, vec![0, 1, 2, 3]);
        assert_eq!(improved.total_time, 5.0);
    }

    #[test]
    fn unreachable_stop_excluded_and_reported() {
        let inf = f64::INFINITY;
        let m = TimeMatrix::from_rows(vec![
            vec![0.0, 3.0, inf],
            vec![3.0, 0.0, inf],
            vec![1.0, 1.0, 0.0],
        ])
        .unwrap();
        let tour = RouteSequencer::default().solve(&m, 0).unwrap();
        assert_eq!(tour.order, vec![0, 1]);
        assert_eq!(tour.unreachable, vec![2]);
        assert_eq!(tour.total_time, 3.0);
        assert!(!tour.is_complete());
    }

    #[test]
    fn dead_end_stop_spliced_in_earlier() {
        // Greedy takes D→A (1) and then A→B is impassable, but D→B→A
        // (5 + 1) is a complete finite path.
        let inf = f64::INFINITY;
        let m = TimeMatrix::from_rows(vec![
            vec![0.0, 1.0, 5.0],
            vec![inf, 0.0, inf],
            vec![inf, 1.0, 0.0],
        ])
        .unwrap();
        for sequencer in [RouteSequencer::default(), RouteSequencer::greedy()] {
            let tour = sequencer.solve(&m, 0).unwrap();
            assert_eq!(tour.order, vec![0, 2, 1]);
            assert!(tour.is_complete());
            assert_eq!(tour.total_time, 6.0);
        }
    }

    #[test]
    fn splice_picks_cheapest_finite_slot() {
        // Path 0→1→2 dead-ends at 2.  Stop 3 fits between 0 and 1
        // (+2 + 2 - 1 = 3) or between 1 and 2 (+1 + 1 - 1 = 1).
        let inf = f64::INFINITY;
        let m = TimeMatrix::from_rows(vec![
            vec![0.0, 1.0, 9.0, 2.0],
            vec![inf, 0.0, 1.0, 1.0],
            vec![inf, inf, 0.0, inf],
            vec![inf, 2.0, 1.0, 0.0],
        ])
        .unwrap();
        let tour = RouteSequencer::greedy().solve(&m, 0).unwrap();
        assert_eq!(tour.order, vec![0, 1, 3, 2]);
        assert!(tour.unreachable.is_empty());
        assert_eq!(tour.total_time, 3.0);
    }

    #[test]
    fn one_way_reachable_through_intermediate() {
        // 2 is unreachable from the depot directly but reachable via 1.
        let inf = f64::INFINITY;
        let m = TimeMatrix::from_rows(vec![
            vec![0.0, 5.0, inf],
            vec![inf, 0.0, 4.0],
            vec![inf, inf, 0.0],
        ])
        .unwrap();
        let tour = RouteSequencer::default().solve(&m, 0).unwrap();
        assert_eq!(tour.order, vec![0, 1, 2]);
        assert_eq!(tour.total_time, 9.0);
    }

    #[test]
    fn two_opt_never_introduces_infinite_leg() {
        let inf = f64::INFINITY;
        // Reversing [1, 2] would skip the 100 s leg, but 2→1 is impassable.
        let m = TimeMatrix::from_rows(vec![
            vec![0.0, 1.0, 2.0],
            vec![inf, 0.0, 100.0],
            vec![inf, inf, 0.0],
        ])
        .unwrap();
        let tour = RouteSequencer::default().solve(&m, 0).unwrap();
        assert_eq!(tour.order, vec![0, 1, 2]);
        assert_eq!(tour.total_time, 101.0);
    }

    #[test]
    fn random_permutations_from_depot() {
        let mut rng = SmallRng::seed_from_u64(42);
        for n in 1..20 {
            let m = random_matrix(&mut rng, n);
            let tour = RouteSequencer::default().solve(&m, 0).unwrap();
            assert!(is_permutation(&tour.order, n), "n={n}: {:?}", tour.order);
            assert_eq!(tour.order[0], 0);
            assert!(tour.unreachable.is_empty());
            assert_eq!(tour.total_time, tour_cost(&m, &tour.order));
        }
    }

    #[test]
    fn two_opt_never_worse_than_greedy() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..30 {
            let m = random_matrix(&mut rng, 12);
            let greedy = RouteSequencer::greedy().solve(&m, 0).unwrap();
            let improved = RouteSequencer::default().solve(&m, 0).unwrap();
            assert!(improved.total_time <= greedy.total_time);
        }
    }

    #[test]
    fn deterministic() {
        let mut rng = SmallRng::seed_from_u64(9);
        let m = random_matrix(&mut rng, 15);
        let first = RouteSequencer::default().solve(&m, 0).unwrap();
        for _ in 0..5 {
            assert_eq!(RouteSequencer::default().solve(&m, 0).unwrap(), first);
        }
    }

    #[test]
    fn tour_cost_of_short_paths() {
        let m = dabc();
        assert_eq!(tour_cost(&m, &[]), 0.0);
        assert_eq!(tour_cost(&m, &[2]), 0.0);
        assert_eq!(tour_cost(&m, &[3, 2, 1]), 8.0);
    }
}

// ── Clusterer ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cluster {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use pr_core::GeoPoint;
    use crate::{ClusterMode, ClusterPoint, ProximityClusterer, SequenceError};

    fn points(coords: &[(f64, f64)]) -> Vec<ClusterPoint> {
        coords
            .iter()
            .enumerate()
            .map(|(i, &(lat, lon))| ClusterPoint::new(format!("p{i}"), GeoPoint::new(lat, lon)))
            .collect()
    }

    #[test]
    fn mode_limits() {
        assert_eq!(ClusterMode::Fast.max_stops(), 15);
        assert_eq!(ClusterMode::Efficient.max_stops(), 12);
        assert_eq!(ClusterMode::Thorough.max_stops(), 8);
    }

    #[test]
    fn unknown_mode_defaults_to_efficient() {
        assert_eq!(ClusterMode::parse_or_default(Some("turbo")), ClusterMode::Efficient);
        assert_eq!(ClusterMode::parse_or_default(None), ClusterMode::Efficient);
        assert_eq!(ClusterMode::parse_or_default(Some("thorough")), ClusterMode::Thorough);
        // Names are matched exactly.
        assert_eq!(ClusterMode::parse_or_default(Some("FAST")), ClusterMode::Efficient);
        assert_eq!(ClusterMode::parse_or_default(Some(" fast ")), ClusterMode::Efficient);
        assert!(matches!(
            "turbo".parse::<ClusterMode>(),
            Err(SequenceError::UnknownClusterMode(_))
        ));
    }

    #[test]
    fn twenty_identical_points_fast() {
        let pts = points(&[(48.4, -122.3); 20]);
        let routes = ProximityClusterer::for_mode(ClusterMode::Fast).cluster(pts);
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].len(), 15);
        assert_eq!(routes[1].len(), 5);
        // Identical distances fall back to input order.
        let first: Vec<&str> = routes[0].stops.iter().map(|s| s.parcel_id.as_str()).collect();
        let expected: Vec<String> = (0..15).map(|i| format!("p{i}")).collect();
        assert_eq!(first, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn route_metadata() {
        let pts = points(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]);
        let routes = ProximityClusterer::new(2).cluster(pts);
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].route_id, 1);
        assert_eq!(routes[1].route_id, 2);
        assert_eq!(routes[0].total_time, 2 * 5 + 20);
        assert_eq!(routes[1].total_time, 5 + 20);
        let orders: Vec<usize> = routes[0].stops.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2]);
        assert_eq!(routes[0].stops[1].lng, 1.0);
        assert_eq!(routes[0].stops[0].estimated_dwell, 5);
    }

    #[test]
    fn chains_from_most_recent_stop() {
        // From p0 the nearest is p1; from p1 the nearest is p2, even though
        // p3 is closer to the seed than p2 is.
        let pts = points(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (0.0, -1.5)]);
        let routes = ProximityClusterer::new(4).cluster(pts);
        let ids: Vec<&str> = routes[0].stops.iter().map(|s| s.parcel_id.as_str()).collect();
        assert_eq!(ids, vec!["p0", "p1", "p2", "p3"]);
    }

    #[test]
    fn empty_input() {
        assert!(ProximityClusterer::for_mode(ClusterMode::Thorough).cluster(Vec::new()).is_empty());
    }

    #[test]
    fn zero_cap_is_clamped() {
        let routes = ProximityClusterer::new(0).cluster(points(&[(0.0, 0.0), (1.0, 1.0)]));
        assert_eq!(routes.len(), 2);
    }

    #[test]
    fn every_point_exactly_once() {
        let mut rng = SmallRng::seed_from_u64(2024);
        for mode in [ClusterMode::Fast, ClusterMode::Efficient, ClusterMode::Thorough] {
            for n in [0, 1, 7, 8, 9, 40, 101] {
                let coords: Vec<(f64, f64)> = (0..n)
                    .map(|_| (rng.gen_range(48.0..49.0), rng.gen_range(-123.0..-122.0)))
                    .collect();
                let routes = ProximityClusterer::for_mode(mode).cluster(points(&coords));

                let mut seen = vec![0u32; n];
                for route in &routes {
                    assert!(!route.is_empty());
                    assert!(route.len() <= mode.max_stops());
                    for stop in &route.stops {
                        let i: usize = stop.parcel_id[1..].parse().unwrap();
                        seen[i] += 1;
                    }
                }
                assert!(seen.iter().all(|&c| c == 1), "{mode} n={n}");
                assert_eq!(routes.len(), n.div_ceil(mode.max_stops()));
            }
        }
    }
}
