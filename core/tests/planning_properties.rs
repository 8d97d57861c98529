mod common;

use common::{assert_valid_plan, random_subtasks};
use pretty_assertions::assert_eq;
use skillwave_core::api::{
    analyze_wave, Dag, ExclusivityRegistry, ExecutionPlanner, Subtask, ValidationError,
};

#[test]
fn acyclic_inputs_always_plan_every_node() {
    for seed in 0..40u64 {
        for n in [1usize, 2, 5, 13, 40] {
            let dag = Dag::build(random_subtasks(n, seed, 6)).unwrap();
            let plan = ExecutionPlanner::default().plan(&dag).unwrap();
            assert_eq!(plan.total_nodes, n, "seed {seed} n {n}");
            assert_valid_plan(&plan, &dag);
        }
    }
}

#[test]
fn parallel_waves_never_share_a_path() {
    for seed in 0..25u64 {
        let dag = Dag::build(random_subtasks(30, seed, 4)).unwrap();
        let plan = ExecutionPlanner::default().plan(&dag).unwrap();
        for wave in plan.waves.iter().filter(|w| w.node_ids.len() > 1) {
            assert!(wave.parallel_safe);
            let analysis = analyze_wave(&wave.node_ids, &dag, &ExclusivityRegistry::default());
            assert!(analysis.is_safe(), "seed {seed}: {:?}", analysis.conflicts);
        }
    }
}

#[test]
fn planning_twice_gives_identical_plans() {
    let dag = Dag::build(random_subtasks(25, 7, 3)).unwrap();
    let planner = ExecutionPlanner::default();
    assert_eq!(planner.plan(&dag).unwrap(), planner.plan(&dag).unwrap());
}

#[test]
fn back_edge_reports_the_cycle() {
    let mut tasks = random_subtasks(6, 3, 0);
    // t0 -> t5 closes a loop whenever t5 reaches t0; force that path.
    tasks[5] = Subtask::new("t5", "").with_dependencies(["t4"]);
    tasks[4] = Subtask::new("t4", "").with_dependencies(["t0"]);
    tasks[0] = Subtask::new("t0", "").with_dependencies(["t5"]);

    match Dag::build(tasks) {
        Err(ValidationError::Cycle { path }) => {
            assert_eq!(path.first(), path.last());
            for id in ["t0", "t4", "t5"] {
                assert!(path.iter().any(|p| p == id), "{id} missing from {path:?}");
            }
        }
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn disjoint_paths_never_conflict_shared_paths_always_do() {
    let disjoint = Dag::build(vec![
        Subtask::new("a", "").with_write_paths(["a.rs"]),
        Subtask::new("b", "").with_write_paths(["b.rs"]),
        Subtask::new("c", ""),
    ])
    .unwrap();
    let ids: Vec<String> = disjoint.node_ids().to_vec();
    assert!(analyze_wave(&ids, &disjoint, &ExclusivityRegistry::default()).is_safe());

    let shared = Dag::build(vec![
        Subtask::new("a", "").with_write_paths(["lib.rs"]),
        Subtask::new("b", "").with_write_paths(["lib.rs"]),
    ])
    .unwrap();
    let ids: Vec<String> = shared.node_ids().to_vec();
    assert!(!analyze_wave(&ids, &shared, &ExclusivityRegistry::default()).is_safe());
}
