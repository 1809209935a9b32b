//! Move representation shared by all neighborhood operators.

use crate::distance::ArcCost;
use crate::error::Result;
use crate::evaluation::SolutionState;
use crate::models::DEPOT;

/// A single neighborhood move, expressed in positions of the current solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Move one stop to another position (same or different route).
    /// `to_pos` indexes the target route after the stop has been removed.
    Relocate {
        from_route: usize,
        from_pos: usize,
        to_route: usize,
        to_pos: usize,
    },
    /// Exchange two stops.
    Swap {
        route_a: usize,
        pos_a: usize,
        route_b: usize,
        pos_b: usize,
    },
    /// Reverse `start..=end` within one route.
    TwoOpt { route: usize, start: usize, end: usize },
    /// Move a segment of `len` stops within one route.
    OrOpt {
        route: usize,
        start: usize,
        len: usize,
        to_pos: usize,
    },
    /// Exchange the tails of two routes after the given cut positions.
    TwoOptStar {
        route_a: usize,
        cut_a: usize,
        route_b: usize,
        cut_b: usize,
    },
}

impl Move {
    /// Short operator name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Move::Relocate { .. } => "relocate",
            Move::Swap { .. } => "swap",
            Move::TwoOpt { .. } => "2-opt",
            Move::OrOpt { .. } => "or-opt",
            Move::TwoOptStar { .. } => "2-opt*",
        }
    }

    /// Applies the move through the state's checked mutators.
    pub fn apply(&self, state: &mut SolutionState<'_>) -> Result<()> {
        match *self {
            Move::Relocate {
                from_route,
                from_pos,
                to_route,
                to_pos,
            } => state.relocate(from_route, from_pos, to_route, to_pos),
            Move::Swap {
                route_a,
                pos_a,
                route_b,
                pos_b,
            } => state.swap(route_a, pos_a, route_b, pos_b),
            Move::TwoOpt { route, start, end } => state.reverse(route, start, end),
            Move::OrOpt {
                route,
                start,
                len,
                to_pos,
            } => state.move_segment(route, start, len, to_pos),
            Move::TwoOptStar {
                route_a,
                cut_a,
                route_b,
                cut_b,
            } => state.exchange_tails(route_a, cut_a, route_b, cut_b),
        }
    }
}

/// A move together with its cost change under the evaluating cost function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMove {
    pub mv: Move,
    pub delta: i64,
}

impl ScoredMove {
    /// Keeps `mv` in `best` if it is improving and strictly better.
    #[inline]
    pub(crate) fn offer(best: &mut Option<ScoredMove>, mv: Move, delta: i64) {
        if delta < 0 && best.as_ref().is_none_or(|b| delta < b.delta) {
            *best = Some(ScoredMove { mv, delta });
        }
    }
}

/// Node visited before position `pos` (the depot for the first stop).
#[inline]
pub(crate) fn node_before(stops: &[usize], pos: usize) -> usize {
    if pos == 0 {
        DEPOT
    } else {
        stops[pos - 1]
    }
}

/// Node at index `idx`, or the depot past the end of the route.
#[inline]
pub(crate) fn node_at(stops: &[usize], idx: usize) -> usize {
    stops.get(idx).copied().unwrap_or(DEPOT)
}

/// Repeatedly applies the best move returned by `find` until none improves.
///
/// Returns the number of moves applied.
pub(crate) fn descend<C, F>(state: &mut SolutionState<'_>, costs: &C, find: F) -> Result<usize>
where
    C: ArcCost + ?Sized,
    F: Fn(&SolutionState<'_>, &C) -> Option<ScoredMove>,
{
    let mut applied = 0;
    while let Some(best) = find(state, costs) {
        best.mv.apply(state)?;
        applied += 1;
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_fall_back_to_depot() {
        let stops = [4, 7, 9];
        assert_eq!(node_before(&stops, 0), DEPOT);
        assert_eq!(node_before(&stops, 2), 7);
        assert_eq!(node_at(&stops, 2), 9);
        assert_eq!(node_at(&stops, 3), DEPOT);
        assert_eq!(node_at(&[], 0), DEPOT);
    }

    #[test]
    fn test_offer_keeps_strictly_better() {
        let a = Move::TwoOpt { route: 0, start: 0, end: 1 };
        let b = Move::TwoOpt { route: 0, start: 1, end: 2 };
        let mut best = None;
        ScoredMove::offer(&mut best, a, 0);
        assert!(best.is_none());
        ScoredMove::offer(&mut best, a, -3);
        ScoredMove::offer(&mut best, b, -3);
        assert_eq!(best.map(|m| m.mv), Some(a));
        ScoredMove::offer(&mut best, b, -4);
        assert_eq!(best.map(|m| m.delta), Some(-4));
    }

    #[test]
    fn test_names() {
        assert_eq!(Move::TwoOpt { route: 0, start: 0, end: 1 }.name(), "2-opt");
        assert_eq!(
            Move::TwoOptStar { route_a: 0, cut_a: 0, route_b: 1, cut_b: 1 }.name(),
            "2-opt*"
        );
    }
}
