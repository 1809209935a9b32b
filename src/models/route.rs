//! Route type.

use serde::{Deserialize, Serialize};

use crate::distance::ArcCost;

use super::DEPOT;

/// An ordered sequence of stops assigned to a single vehicle.
///
/// A route starts and ends at the depot; the depot is not stored in `stops`.
/// An empty route is an unused vehicle.
///
/// # Examples
///
/// ```
/// use u_fleet::models::Route;
/// use u_fleet::distance::CostMatrix;
///
/// let cm = CostMatrix::from_rows(vec![
///     vec![0, 1, 2],
///     vec![1, 0, 1],
///     vec![2, 1, 0],
/// ]).unwrap();
/// let route = Route::with_stops(0, vec![1, 2]);
/// assert_eq!(route.len(), 2);
/// assert_eq!(route.cost(&cm), 4); // 0→1→2→0 = 1 + 1 + 2
/// assert_eq!(route.sequence(), vec![0, 1, 2, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    vehicle_id: usize,
    stops: Vec<usize>,
}

impl Route {
    /// Creates an empty route for the given vehicle.
    pub fn new(vehicle_id: usize) -> Self {
        Self {
            vehicle_id,
            stops: Vec::new(),
        }
    }

    /// Creates a route visiting `stops` in order.
    pub fn with_stops(vehicle_id: usize, stops: Vec<usize>) -> Self {
        Self { vehicle_id, stops }
    }

    /// Returns the vehicle assigned to this route.
    pub fn vehicle_id(&self) -> usize {
        self.vehicle_id
    }

    /// Returns the ordered stops (depot excluded).
    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    pub(crate) fn stops_mut(&mut self) -> &mut Vec<usize> {
        &mut self.stops
    }

    /// Returns the number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if this vehicle serves nobody.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Full visiting sequence including the depot at both ends.
    pub fn sequence(&self) -> Vec<usize> {
        std::iter::once(DEPOT)
            .chain(self.stops.iter().copied())
            .chain(std::iter::once(DEPOT))
            .collect()
    }

    /// Total cost `depot → stops[0] → ... → stops[n-1] → depot`; 0 when empty.
    pub fn cost<C: ArcCost + ?Sized>(&self, costs: &C) -> i64 {
        route_cost(&self.stops, costs)
    }
}

/// Cost of a stop sequence travelled from and back to the depot.
pub(crate) fn route_cost<C: ArcCost + ?Sized>(stops: &[usize], costs: &C) -> i64 {
    let (Some(&first), Some(&last)) = (stops.first(), stops.last()) else {
        return 0;
    };
    let inner: i64 = stops.windows(2).map(|w| costs.arc(w[0], w[1])).sum();
    costs.arc(DEPOT, first) + inner + costs.arc(last, DEPOT)
}
