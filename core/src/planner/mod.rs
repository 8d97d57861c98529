//! Wave planning.
//!
//! ```text
//! Dag ──topological_layers──▶ layer ──analyze_wave──▶ safe?  ──▶ one parallel wave
//!                                                     unsafe ──▶ one wave per conflicting
//!                                                                node, then the rest
//! ```

use std::collections::HashMap;

use serde::Serialize;

use crate::conflict::{analyze_wave, Conflict, ExclusivityRegistry};
use crate::error::PlanningError;
use crate::graph::Dag;

/// A batch of nodes an executor may start once every earlier wave is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wave {
    pub index: usize,
    pub node_ids: Vec<String>,
    /// `true`: members may run concurrently. `false`: run in listed order.
    pub parallel_safe: bool,
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub waves: Vec<Wave>,
    pub total_nodes: usize,
}

impl ExecutionPlan {
    pub fn wave_of(&self, node_id: &str) -> Option<usize> {
        self.waves
            .iter()
            .find(|w| w.node_ids.iter().any(|n| n == node_id))
            .map(|w| w.index)
    }

    pub fn sequential_waves(&self) -> usize {
        self.waves.iter().filter(|w| !w.parallel_safe).count()
    }
}

/// Turns a resolved [`Dag`] into an [`ExecutionPlan`].
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlanner {
    exclusivity: ExclusivityRegistry,
}

impl ExecutionPlanner {
    pub fn new(exclusivity: ExclusivityRegistry) -> Self {
        Self { exclusivity }
    }

    pub fn exclusivity(&self) -> &ExclusivityRegistry {
        &self.exclusivity
    }

    pub fn plan(&self, dag: &Dag) -> Result<ExecutionPlan, PlanningError> {
        let mut waves: Vec<Wave> = Vec::new();

        for layer in dag.topological_layers() {
            if layer.len() < 2 {
                push_wave(&mut waves, layer, true, Vec::new());
                continue;
            }

            let analysis = analyze_wave(&layer, dag, &self.exclusivity);
            if analysis.is_safe() {
                push_wave(&mut waves, layer, true, Vec::new());
                continue;
            }

            tracing::info!(
                target: "skillwave.planner",
                layer_size = layer.len(),
                conflicts = analysis.conflicts.len(),
                "splitting conflicting layer into sequential waves"
            );
            for node_id in &analysis.remediation {
                let named: Vec<Conflict> = analysis
                    .conflicts
                    .iter()
                    .filter(|c| c.involves(node_id))
                    .cloned()
                    .collect();
                push_wave(&mut waves, vec![node_id.clone()], false, named);
            }
            let rest: Vec<String> = layer
                .into_iter()
                .filter(|id| !analysis.remediation.contains(id))
                .collect();
            if !rest.is_empty() {
                push_wave(&mut waves, rest, true, Vec::new());
            }
        }

        let plan = ExecutionPlan {
            waves,
            total_nodes: dag.len(),
        };
        verify(&plan, dag)?;

        tracing::debug!(
            target: "skillwave.planner",
            waves = plan.waves.len(),
            total_nodes = plan.total_nodes,
            sequential = plan.sequential_waves(),
            "plan computed"
        );
        Ok(plan)
    }
}

fn push_wave(waves: &mut Vec<Wave>, node_ids: Vec<String>, parallel_safe: bool, conflicts: Vec<Conflict>) {
    let index = waves.len();
    waves.push(Wave {
        index,
        node_ids,
        parallel_safe,
        conflicts,
    });
}

/// Every node in exactly one wave, every dependency in a strictly earlier wave.
fn verify(plan: &ExecutionPlan, dag: &Dag) -> Result<(), PlanningError> {
    let mut placed: HashMap<&str, usize> = HashMap::with_capacity(dag.len());
    for (pos, wave) in plan.waves.iter().enumerate() {
        if wave.index != pos {
            return Err(PlanningError::InvariantViolated(format!(
                "wave at position {pos} has index {}",
                wave.index
            )));
        }
        if wave.node_ids.is_empty() {
            return Err(PlanningError::InvariantViolated(format!(
                "wave {pos} is empty"
            )));
        }
        for id in &wave.node_ids {
            if !dag.contains(id) {
                return Err(PlanningError::InvariantViolated(format!(
                    "wave {pos} names unknown node '{id}'"
                )));
            }
            if placed.insert(id.as_str(), pos).is_some() {
                return Err(PlanningError::InvariantViolated(format!(
                    "node '{id}' placed in more than one wave"
                )));
            }
        }
    }

    if placed.len() != dag.len() {
        return Err(PlanningError::InvariantViolated(format!(
            "{} of {} nodes placed",
            placed.len(),
            dag.len()
        )));
    }

    for id in dag.node_ids() {
        let wave = placed[id.as_str()];
        for dep in dag.dependencies(id) {
            if placed[dep.as_str()] >= wave {
                return Err(PlanningError::InvariantViolated(format!(
                    "'{id}' in wave {wave} does not follow its dependency '{dep}'"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeResolution, Subtask};
    use crate::skill::SkillDescriptor;
    use pretty_assertions::assert_eq;

    fn diamond(b_paths: &[&str], c_paths: &[&str]) -> Dag {
        Dag::build(vec![
            Subtask::new("A", "scaffold"),
            Subtask::new("B", "api")
                .with_dependencies(["A"])
                .with_write_paths(b_paths.iter().copied()),
            Subtask::new("C", "ui")
                .with_dependencies(["A"])
                .with_write_paths(c_paths.iter().copied()),
            Subtask::new("D", "ship").with_dependencies(["B", "C"]),
        ])
        .unwrap()
    }

    fn ids(waves: &[Wave]) -> Vec<Vec<&str>> {
        waves
            .iter()
            .map(|w| w.node_ids.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_diamond_without_conflicts() {
        let plan = ExecutionPlanner::default()
            .plan(&diamond(&["api.rs"], &["ui.rs"]))
            .unwrap();
        assert_eq!(ids(&plan.waves), vec![vec!["A"], vec!["B", "C"], vec!["D"]]);
        assert!(plan.waves.iter().all(|w| w.parallel_safe));
        assert_eq!(plan.total_nodes, 4);
    }

    #[test]
    fn test_diamond_with_shared_file_splits_layer() {
        let plan = ExecutionPlanner::default()
            .plan(&diamond(&["app.ts"], &["app.ts"]))
            .unwrap();
        assert_eq!(
            ids(&plan.waves),
            vec![vec!["A"], vec!["B"], vec!["C"], vec!["D"]]
        );
        let expected = vec![Conflict::File {
            path: "app.ts".into(),
            node_ids: vec!["B".into(), "C".into()],
        }];
        assert!(!plan.waves[1].parallel_safe);
        assert!(!plan.waves[2].parallel_safe);
        assert_eq!(plan.waves[1].conflicts, expected);
        assert_eq!(plan.waves[2].conflicts, expected);
        assert!(plan.waves[0].parallel_safe && plan.waves[3].parallel_safe);
        assert_eq!(
            plan.waves.iter().map(|w| w.index).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn test_non_conflicting_remainder_stays_parallel() {
        let dag = Dag::build(vec![
            Subtask::new("a", "").with_write_paths(["x"]),
            Subtask::new("b", "").with_write_paths(["y"]),
            Subtask::new("c", "").with_write_paths(["x"]),
            Subtask::new("d", "").with_write_paths(["z"]),
        ])
        .unwrap();
        let plan = ExecutionPlanner::default().plan(&dag).unwrap();
        assert_eq!(ids(&plan.waves), vec![vec!["a"], vec!["c"], vec!["b", "d"]]);
        assert_eq!(
            plan.waves.iter().map(|w| w.parallel_safe).collect::<Vec<_>>(),
            vec![false, false, true]
        );
        assert!(plan.waves[2].conflicts.is_empty());
    }

    #[test]
    fn test_singleton_skills_are_serialized() {
        let skills = vec![
            SkillDescriptor::new("deploy", "Deploy", "").with_tags(["singleton"]),
            SkillDescriptor::new("other", "Other", ""),
        ];
        let dag = Dag::build(vec![Subtask::new("a", ""), Subtask::new("b", "")]).unwrap();
        let res: HashMap<String, NodeResolution> = ["a", "b"]
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    NodeResolution {
                        skill_id: Some("deploy".into()),
                        skill_write_paths: Vec::new(),
                    },
                )
            })
            .collect();
        let dag = dag.with_resolutions(&res);

        let planner = ExecutionPlanner::new(ExclusivityRegistry::from_skills(&skills, ["singleton"]));
        let plan = planner.plan(&dag).unwrap();
        assert_eq!(ids(&plan.waves), vec![vec!["a"], vec!["b"]]);
        assert_eq!(plan.sequential_waves(), 2);
    }

    #[test]
    fn test_empty_dag_has_no_waves() {
        let plan = ExecutionPlanner::default()
            .plan(&Dag::build(Vec::new()).unwrap())
            .unwrap();
        assert!(plan.waves.is_empty());
        assert_eq!(plan.total_nodes, 0);
    }

    #[test]
    fn test_planning_is_idempotent() {
        let dag = diamond(&["app.ts"], &["app.ts"]);
        let planner = ExecutionPlanner::default();
        assert_eq!(planner.plan(&dag).unwrap(), planner.plan(&dag).unwrap());
    }

    #[test]
    fn test_verify_rejects_misordered_plan() {
        let dag = diamond(&[], &[]);
        let plan = ExecutionPlan {
            waves: vec![
                Wave {
                    index: 0,
                    node_ids: vec!["B".into(), "A".into(), "C".into()],
                    parallel_safe: true,
                    conflicts: Vec::new(),
                },
                Wave {
                    index: 1,
                    node_ids: vec!["D".into()],
                    parallel_safe: true,
                    conflicts: Vec::new(),
                },
            ],
            total_nodes: 4,
        };
        let err = verify(&plan, &dag).unwrap_err();
        assert!(matches!(err, PlanningError::InvariantViolated(_)));
    }

    #[test]
    fn test_wave_of() {
        let plan = ExecutionPlanner::default()
            .plan(&diamond(&[], &[]))
            .unwrap();
        assert_eq!(plan.wave_of("D"), Some(2));
        assert_eq!(plan.wave_of("zzz"), None);
    }
}
