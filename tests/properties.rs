//! Property tests over random small instances.

use std::time::Duration;

use proptest::prelude::*;
use u_fleet::constructive::{cheapest_insertion, path_cheapest_arc};
use u_fleet::distance::ScaledEuclidean;
use u_fleet::evaluation::{CvrpEvaluator, Evaluation};
use u_fleet::local_search::GlsConfig;
use u_fleet::models::{DemandVector, Instance, Location};

fn instance(points: &[(i32, i32)], demands: Option<Vec<i64>>) -> Instance {
    let locations: Vec<Location> = points
        .iter()
        .map(|&(x, y)| Location::new(f64::from(x), f64::from(y)))
        .collect();
    let base = Instance::from_locations(&locations, &ScaledEuclidean::new(10.0));
    match demands {
        Some(d) => Instance::new(base.costs().clone(), DemandVector::from_vec(d).expect("valid"))
            .expect("valid"),
        None => base,
    }
}

fn evaluator(instance: &Instance) -> CvrpEvaluator<'_> {
    CvrpEvaluator::new(instance).with_config(
        GlsConfig::default()
            .with_time_budget(Duration::from_secs(60))
            .with_max_cycles(8),
    )
}

fn points() -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((-50i32..50, -50i32..50), 1..9)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_unit_demand_feasible_iff_fleet_fits(
        pts in points(),
        fleet in 1usize..4,
        capacity in 1i64..5,
    ) {
        let inst = instance(&pts, None);
        let fits = inst.num_stops() as i64 <= fleet as i64 * capacity;
        let built = cheapest_insertion(&inst, fleet, capacity);
        prop_assert_eq!(built.is_ok(), fits);
        if let Ok(state) = built {
            prop_assert!(state.verify().is_ok());
            let solution = state.into_solution();
            prop_assert!(solution.validate(inst.demands(), capacity).is_ok());
            prop_assert_eq!(solution.num_routes(), fleet);
        }
    }

    #[test]
    fn prop_path_cheapest_arc_respects_capacity(
        pts in points(),
        fleet in 1usize..4,
        capacity in 1i64..5,
    ) {
        let inst = instance(&pts, None);
        if let Ok(state) = path_cheapest_arc(&inst, fleet, capacity) {
            prop_assert!(state.into_solution().validate(inst.demands(), capacity).is_ok());
        }
    }

    #[test]
    fn prop_improvement_never_worse_than_construction(
        pts in points(),
        weights in prop::collection::vec(0i64..4, 9),
        fleet in 1usize..4,
        capacity in 1i64..8,
    ) {
        let mut demands = vec![0];
        demands.extend(weights.iter().take(pts.len() - 1));
        let inst = instance(&pts, Some(demands));
        if let Evaluation::Feasible(plan) = evaluator(&inst).evaluate(fleet, capacity).expect("valid") {
            prop_assert!(plan.total_distance <= plan.construction_distance);
            prop_assert_eq!(plan.total_distance, plan.solution.total_cost(inst.costs()));
            prop_assert!(plan.solution.validate(inst.demands(), capacity).is_ok());
            prop_assert_eq!(plan.solution.num_served(), inst.num_stops());
        }
    }

    #[test]
    fn prop_evaluation_deterministic_with_cycle_cap(
        pts in points(),
        fleet in 1usize..4,
        capacity in 1i64..5,
    ) {
        let inst = instance(&pts, None);
        let eval = evaluator(&inst);
        prop_assert_eq!(
            eval.evaluate(fleet, capacity).expect("valid"),
            eval.evaluate(fleet, capacity).expect("valid")
        );
    }
}
