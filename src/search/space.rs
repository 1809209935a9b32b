//! Integer search space over fleet size and vehicle capacity.

use serde::{Deserialize, Serialize};

use crate::error::{FleetError, Result};

/// One point of the search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FleetParams {
    pub fleet_size: usize,
    pub capacity: i64,
}

impl FleetParams {
    /// Pairs a fleet size with a capacity.
    pub fn new(fleet_size: usize, capacity: i64) -> Self {
        Self {
            fleet_size,
            capacity,
        }
    }
}

/// Inclusive ranges `[min_fleet, max_fleet] × [min_capacity, max_capacity]`.
///
/// # Examples
///
/// ```
/// use u_fleet::search::{FleetParams, SearchSpace};
///
/// let space = SearchSpace::new(2, 3, 40, 50).unwrap();
/// assert_eq!(space.num_points(), 22);
/// assert!(space.contains(FleetParams::new(3, 40)));
/// assert!(!space.contains(FleetParams::new(4, 40)));
///
/// assert!(SearchSpace::new(3, 2, 40, 50).is_err());
/// assert!(SearchSpace::new(0, 2, 40, 50).is_err());
/// ```
///
/// Deserialization goes through the same checks as [`SearchSpace::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSearchSpace")]
pub struct SearchSpace {
    min_fleet: usize,
    max_fleet: usize,
    min_capacity: i64,
    max_capacity: i64,
}

impl SearchSpace {
    /// Validates and creates a search space. Bounds must be positive and
    /// each minimum must not exceed its maximum.
    pub fn new(min_fleet: usize, max_fleet: usize, min_capacity: i64, max_capacity: i64) -> Result<Self> {
        if min_fleet == 0 {
            return Err(FleetError::InvalidParameterRange(
                "fleet size must be at least 1".to_string(),
            ));
        }
        if min_fleet > max_fleet {
            return Err(FleetError::InvalidParameterRange(format!(
                "fleet range {min_fleet}..={max_fleet} is empty"
            )));
        }
        if min_capacity < 1 {
            return Err(FleetError::InvalidParameterRange(format!(
                "capacity must be at least 1, got {min_capacity}"
            )));
        }
        if min_capacity > max_capacity {
            return Err(FleetError::InvalidParameterRange(format!(
                "capacity range {min_capacity}..={max_capacity} is empty"
            )));
        }
        Ok(Self {
            min_fleet,
            max_fleet,
            min_capacity,
            max_capacity,
        })
    }

    /// Smallest fleet size.
    pub fn min_fleet(&self) -> usize {
        self.min_fleet
    }

    /// Largest fleet size.
    pub fn max_fleet(&self) -> usize {
        self.max_fleet
    }

    /// Smallest capacity.
    pub fn min_capacity(&self) -> i64 {
        self.min_capacity
    }

    /// Largest capacity.
    pub fn max_capacity(&self) -> i64 {
        self.max_capacity
    }

    /// Number of distinct fleet sizes.
    pub fn fleet_span(&self) -> u64 {
        (self.max_fleet - self.min_fleet) as u64 + 1
    }

    /// Number of distinct capacities.
    pub fn capacity_span(&self) -> u64 {
        self.max_capacity.abs_diff(self.min_capacity) + 1
    }

    /// Number of grid points, saturating at `u64::MAX`.
    pub fn num_points(&self) -> u64 {
        self.fleet_span().saturating_mul(self.capacity_span())
    }

    /// `true` if `params` lies inside both ranges.
    pub fn contains(&self, params: FleetParams) -> bool {
        (self.min_fleet..=self.max_fleet).contains(&params.fleet_size)
            && (self.min_capacity..=self.max_capacity).contains(&params.capacity)
    }

    /// Point at row-major `index` (fleet-major, capacity varying fastest),
    /// wrapping past the end.
    pub fn point_at(&self, index: u64) -> FleetParams {
        let index = index % self.num_points();
        let span = self.capacity_span();
        FleetParams {
            fleet_size: self.min_fleet + (index / span) as usize,
            capacity: self.min_capacity + (index % span) as i64,
        }
    }
}

/// Unchecked wire form of [`SearchSpace`].
#[derive(Deserialize)]
struct RawSearchSpace {
    min_fleet: usize,
    max_fleet: usize,
    min_capacity: i64,
    max_capacity: i64,
}

impl TryFrom<RawSearchSpace> for SearchSpace {
    type Error = FleetError;

    fn try_from(raw: RawSearchSpace) -> Result<Self> {
        SearchSpace::new(raw.min_fleet, raw.max_fleet, raw.min_capacity, raw.max_capacity)
    }
}
