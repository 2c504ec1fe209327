//! Unit tests for pr-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::from_index(42), Some(id));
    }

    #[test]
    fn from_index_refuses_sentinel() {
        assert_eq!(NodeId::from_index(u32::MAX as usize), None);
        assert_eq!(EdgeId::from_index(usize::MAX), None);
    }

    #[test]
    fn invalid_is_default() {
        assert_eq!(NodeId::default(), NodeId::INVALID);
        assert!(!NodeId::INVALID.is_valid());
        assert!(EdgeId(0).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "n7");
        assert_eq!(EdgeId(3).to_string(), "e3");
        assert_eq!(NodeId::INVALID.to_string(), "n?");
    }
}

#[cfg(test)]
mod geo {
    use crate::{CoreError, GeoPoint};

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(48.418, -122.339);
        assert!(p.distance_m(p) < 0.01);
    }

    #[test]
    fn one_degree_latitude() {
        // ~1 degree of latitude ≈ 111 km
        let a = GeoPoint::new(48.0, -122.0);
        let b = GeoPoint::new(49.0, -122.0);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 500.0, "got {d}");
    }

    #[test]
    fn planar_distance_is_euclidean_in_degrees() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(3.0, 4.0);
        assert_eq!(a.planar_distance(b), 5.0);
        assert_eq!(a.planar_distance_2(b), 25.0);
    }

    #[test]
    fn xy_is_lon_lat() {
        let p = GeoPoint::new(48.4, -122.3);
        assert_eq!(p.xy(), [-122.3, 48.4]);
        assert_eq!(GeoPoint::from_xy(-122.3, 48.4), p);
    }

    #[test]
    fn checked_rejects_garbage() {
        assert!(GeoPoint::checked(48.4, -122.3).is_ok());
        assert!(matches!(
            GeoPoint::checked(f64::NAN, 0.0),
            Err(CoreError::InvalidCoordinate { .. })
        ));
        assert!(GeoPoint::checked(91.0, 0.0).is_err());
        assert!(GeoPoint::checked(0.0, -181.0).is_err());
    }
}

#[cfg(test)]
mod mode {
    use crate::{CoreError, TravelMode};

    #[test]
    fn parse_known_modes() {
        assert_eq!("drive".parse::<TravelMode>().unwrap(), TravelMode::Drive);
        assert_eq!(" Walk ".parse::<TravelMode>().unwrap(), TravelMode::Walk);
    }

    #[test]
    fn parse_unknown_mode() {
        let err = "bike".parse::<TravelMode>().unwrap_err();
        assert_eq!(err, CoreError::UnknownMode("bike".into()));
    }

    #[test]
    fn walking_is_slower() {
        assert!(TravelMode::Walk.default_speed_mps() < TravelMode::Drive.default_speed_mps());
        assert_eq!(TravelMode::default(), TravelMode::Drive);
        assert_eq!(TravelMode::Walk.to_string(), "walk");
    }
}

#[cfg(test)]
mod matrix {
    use crate::{CoreError, TimeMatrix};

    #[test]
    fn unreachable_has_zero_diagonal() {
        let m = TimeMatrix::unreachable(3);
        for i in 0..3 {
            assert_eq!(m.get(i, i), 0.0);
        }
        assert!(m.get(0, 2).is_infinite());
        assert_eq!(m.unreachable_pairs().len(), 6);
    }

    #[test]
    fn from_rows_forces_diagonal() {
        let m = TimeMatrix::from_rows(vec![vec![9.0, 1.0], vec![2.0, 9.0]]).unwrap();
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(1, 1), 0.0);
        assert_eq!(m.get(0, 1), 1.0);
        assert_eq!(m.row(1), &[2.0, 0.0]);
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = TimeMatrix::from_rows(vec![vec![0.0, 1.0], vec![0.0]]).unwrap_err();
        assert_eq!(err, CoreError::RaggedMatrix { expected: 2, row: 1, got: 1 });
    }

    #[test]
    fn set_ignores_diagonal() {
        let mut m = TimeMatrix::unreachable(2);
        m.set(0, 0, 5.0);
        m.set(0, 1, 7.5);
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(0, 1), 7.5);
        assert_eq!(m.unreachable_pairs(), vec![(1, 0)]);
    }
}

#[cfg(all(test, feature = "serde"))]
mod matrix_serde {
    use crate::TimeMatrix;

    #[test]
    fn wrong_cell_count_rejected() {
        let err = serde_json::from_str::<TimeMatrix>(r#"{"n": 2, "cells": [0.0, 1.0, 2.0]}"#).unwrap_err();
        assert!(err.to_string().contains("matrix of size 2 must have n² cells, got 3"));
    }

    #[test]
    fn diagonal_forced_to_zero() {
        let m: TimeMatrix = serde_json::from_str(r#"{"n": 2, "cells": [5.0, 1.0, 2.0, 5.0]}"#).unwrap();
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(1, 1), 0.0);
        assert_eq!(m.get(1, 0), 2.0);
    }

    #[test]
    fn serialized_matrix_reads_back() {
        let m = TimeMatrix::from_rows(vec![vec![0.0, 3.5], vec![4.0, 0.0]]).unwrap();
        let text = serde_json::to_string(&m).unwrap();
        assert_eq!(serde_json::from_str::<TimeMatrix>(&text).unwrap(), m);
    }
}
