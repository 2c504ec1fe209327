//! Open-path stop sequencing over a travel-time matrix.
//!
//! # Algorithm
//!
//! 1. **Nearest neighbour** from the depot: repeatedly step to the unvisited
//!    stop with the smallest finite time from the current path end (lowest
//!    index on a tie).
//! 2. **2-opt**, first improvement: reverse any sub-path `order[i..=j]`
//!    (`i ≥ 1`, so the depot stays first) whose reversal makes the whole path
//!    strictly cheaper.  The matrix may be asymmetric, so every candidate is
//!    costed end to end rather than by the four boundary edges.
//!
//! The path is open: there is no return leg to the depot.
//!
//! # Dead ends
//!
//! One-way streets can leave the path end with no finite leg to any
//! remaining stop even though those stops are reachable from earlier on the
//! path.  Construction then switches to **cheapest insertion**: each
//! remaining stop may be spliced between two consecutive path stops when both
//! new legs are finite, and the cheapest such splice is taken until none is
//! left.  Only stops with no finite placement anywhere go to
//! [`Tour::unreachable`].  `order` therefore only ever contains finite legs,
//! and [`Tour::total_time`] is always finite.

use log::{debug, warn};

use pr_core::TimeMatrix;

use crate::{SequenceError, SequenceResult};

/// Improvements smaller than this are treated as float noise.
const IMPROVEMENT_EPS: f64 = 1e-9;

/// The result of [`RouteSequencer::solve`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tour {
    /// Matrix indices in visiting order.  `order[0]` is the depot.
    pub order: Vec<usize>,

    /// Indices that could not be reached with a finite leg, ascending.
    pub unreachable: Vec<usize>,

    /// Sum of consecutive matrix weights along `order`, in seconds.
    pub total_time: f64,
}

impl Tour {
    /// `true` when every index made it into `order`.
    pub fn is_complete(&self) -> bool {
        self.unreachable.is_empty()
    }
}

/// Nearest-neighbour construction plus optional 2-opt improvement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteSequencer {
    /// Run the 2-opt pass after construction.
    pub two_opt: bool,

    /// Upper bound on full 2-opt sweeps.
    pub max_passes: usize,
}

impl Default for RouteSequencer {
    fn default() -> Self {
        Self { two_opt: true, max_passes: 50 }
    }
}

impl RouteSequencer {
    /// Nearest neighbour only.
    pub fn greedy() -> Self {
        Self { two_opt: false, ..Self::default() }
    }

    /// Order every index of `matrix`, starting at `depot`.
    ///
    /// Deterministic: identical input always gives an identical [`Tour`].
    ///
    /// # Errors
    ///
    /// [`SequenceError::EmptyMatrix`] for a 0×0 matrix and
    /// [`SequenceError::DepotOutOfRange`] for a depot index `>= size()`.
    pub fn solve(&self, matrix: &TimeMatrix, depot: usize) -> SequenceResult<Tour> {
        let n = matrix.size();
        if n == 0 {
            return Err(SequenceError::EmptyMatrix);
        }
        if depot >= n {
            return Err(SequenceError::DepotOutOfRange { depot, n });
        }

        let (mut order, unreachable) = nearest_neighbour(matrix, depot);
        if !unreachable.is_empty() {
            warn!(
                "{} of {n} stops unreachable from the path end; excluded from the tour",
                unreachable.len()
            );
        }

        if self.two_opt && order.len() > 2 {
            let passes = two_opt(matrix, &mut order, self.max_passes);
            debug!("2-opt settled after {passes} passes over {} stops", order.len());
        }

        let total_time = tour_cost(matrix, &order);
        Ok(Tour { order, unreachable, total_time })
    }
}

/// Sum of `matrix[order[k]][order[k + 1]]` along `order`.
///
/// `0.0` for paths of fewer than two stops; `+∞` if any leg is.
pub fn tour_cost(matrix: &TimeMatrix, order: &[usize]) -> f64 {
    order.windows(2).map(|w| matrix.get(w[0], w[1])).sum()
}

// ── Construction ──────────────────────────────────────────────────────────────

fn nearest_neighbour(matrix: &TimeMatrix, depot: usize) -> (Vec<usize>, Vec<usize>) {
    let n = matrix.size();
    let mut visited = vec![false; n];
    visited[depot] = true;
    let mut order = Vec::with_capacity(n);
    order.push(depot);

    let mut current = depot;
    while order.len() < n {
        let row = matrix.row(current);
        let mut next: Option<(usize, f64)> = None;
        for (j, &t) in row.iter().enumerate() {
            if visited[j] || !t.is_finite() {
                continue;
            }
            // Strict `<` keeps the lowest index among equal times.
            if next.is_none_or(|(_, best)| t < best) {
                next = Some((j, t));
            }
        }
        match next {
            Some((j, _)) => {
                visited[j] = true;
                order.push(j);
                current = j;
            }
            None => break,
        }
    }

    if order.len() < n {
        let inserted = insert_stranded(matrix, &mut order, &mut visited);
        debug!("path end is a dead end; spliced {inserted} stops in by cheapest insertion");
    }

    let unreachable = (0..n).filter(|&j| !visited[j]).collect();
    (order, unreachable)
}

/// Splice unvisited stops into `order` wherever both new legs are finite,
/// cheapest first, until no stop fits.  Returns how many were placed.
fn insert_stranded(matrix: &TimeMatrix, order: &mut Vec<usize>, visited: &mut [bool]) -> usize {
    let mut inserted = 0;
    loop {
        // (added cost, stop, position it would occupy)
        let mut best: Option<(f64, usize, usize)> = None;
        for stop in (0..visited.len()).filter(|&j| !visited[j]) {
            for pos in 1..=order.len() {
                let Some(added) = insertion_cost(matrix, order, stop, pos) else { continue };
                // Strict `<` keeps the lowest stop, then the earliest position.
                if best.is_none_or(|(cost, _, _)| added < cost) {
                    best = Some((added, stop, pos));
                }
            }
        }
        let Some((_, stop, pos)) = best else { return inserted };
        order.insert(pos, stop);
        visited[stop] = true;
        inserted += 1;
    }
}

/// Extra time from placing `stop` at `order[pos]`, `None` if a new leg is
/// infinite.
fn insertion_cost(matrix: &TimeMatrix, order: &[usize], stop: usize, pos: usize) -> Option<f64> {
    let prev = order[pos - 1];
    let into = matrix.get(prev, stop);
    if !into.is_finite() {
        return None;
    }
    match order.get(pos) {
        None => Some(into),
        Some(&next) => {
            let out = matrix.get(stop, next);
            out.is_finite().then(|| into + out - matrix.get(prev, next))
        }
    }
}

// ── Improvement ───────────────────────────────────────────────────────────────

/// First-improvement 2-opt.  Returns the number of sweeps performed.
fn two_opt(matrix: &TimeMatrix, order: &mut [usize], max_passes: usize) -> usize {
    let m = order.len();
    let mut best = tour_cost(matrix, order);
    let mut passes = 0;

    while passes < max_passes {
        passes += 1;
        let mut improved = false;
        for i in 1..m - 1 {
            for j in i + 1..m {
                let candidate = reversed_cost(matrix, order, i, j);
                if candidate.is_finite() && candidate + IMPROVEMENT_EPS < best {
                    order[i..=j].reverse();
                    best = candidate;
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }
    passes
}

/// Cost of `order` as if `order[i..=j]` were reversed, without reversing it.
fn reversed_cost(matrix: &TimeMatrix, order: &[usize], i: usize, j: usize) -> f64 {
    let at = |k: usize| if (i..=j).contains(&k) { order[i + j - k] } else { order[k] };
    (1..order.len()).map(|k| matrix.get(at(k - 1), at(k))).sum()
}
