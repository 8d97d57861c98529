//! Plan output for external executors: JSON wire shape and a text summary.

use std::fmt::Write as _;
use std::io::Write;

use serde::Serialize;

use crate::conflict::Conflict;
use crate::engine::PlanReport;
use crate::error::{PlanningError, ValidationError};
use crate::matcher::MatchResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveOutput {
    pub wave_number: usize,
    pub node_ids: Vec<String>,
    pub parallelizable: bool,
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutput {
    pub waves: Vec<WaveOutput>,
    pub total_nodes: usize,
    pub matches: Vec<MatchResult>,
    pub unmatched: Vec<String>,
    pub error: Option<OutputError>,
}

impl PlanOutput {
    pub fn from_report(report: &PlanReport) -> Self {
        Self {
            waves: report
                .plan
                .waves
                .iter()
                .map(|w| WaveOutput {
                    wave_number: w.index,
                    node_ids: w.node_ids.clone(),
                    parallelizable: w.parallel_safe,
                    conflicts: w.conflicts.clone(),
                })
                .collect(),
            total_nodes: report.plan.total_nodes,
            matches: report.matches.clone(),
            unmatched: report.unmatched().into_iter().map(str::to_string).collect(),
            error: None,
        }
    }

    /// Failure shape: `error` set, everything else empty.
    pub fn from_error(err: &PlanningError) -> Self {
        let code = match err {
            PlanningError::Validation(v) => v.code().to_string(),
            PlanningError::Service(s) => format!("{}_service", s.service()),
            PlanningError::InvariantViolated(_) => "invariant_violated".to_string(),
        };
        Self {
            error: Some(OutputError {
                code,
                message: err.to_string(),
            }),
            ..Self::default()
        }
    }

    pub fn from_validation(err: &ValidationError) -> Self {
        Self {
            error: Some(OutputError {
                code: err.code().to_string(),
                message: err.to_string(),
            }),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn write_json<W: Write>(&self, mut out: W, pretty: bool) -> std::io::Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut out, self)?;
        } else {
            serde_json::to_writer(&mut out, self)?;
        }
        writeln!(out)
    }

    pub fn render_text(&self) -> String {
        let mut s = String::new();
        if let Some(err) = &self.error {
            let _ = writeln!(s, "error [{}]: {}", err.code, err.message);
            return s;
        }

        for wave in &self.waves {
            let mode = if wave.parallelizable { "parallel" } else { "sequential" };
            let _ = writeln!(
                s,
                "Wave {} [{}]: {}",
                wave.wave_number,
                mode,
                wave.node_ids.join(", ")
            );
            for conflict in &wave.conflicts {
                let _ = match conflict {
                    Conflict::File { path, node_ids } => {
                        writeln!(s, "  file conflict on {path}: {}", node_ids.join(", "))
                    }
                    Conflict::Exclusivity {
                        capability_tag,
                        node_ids,
                    } => writeln!(
                        s,
                        "  exclusive '{capability_tag}': {}",
                        node_ids.join(", ")
                    ),
                };
            }
        }

        let _ = writeln!(s, "{} nodes in {} waves", self.total_nodes, self.waves.len());
        for m in &self.matches {
            match &m.skill_id {
                Some(skill) => {
                    let _ = writeln!(s, "  {} -> {} ({:.2})", m.subtask_id, skill, m.confidence);
                }
                None => {
                    let _ = writeln!(s, "  {} -> (unmatched)", m.subtask_id);
                }
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{ExecutionPlan, Wave};
    use pretty_assertions::assert_eq;

    fn report() -> PlanReport {
        PlanReport {
            plan: ExecutionPlan {
                waves: vec![
                    Wave {
                        index: 0,
                        node_ids: vec!["a".into(), "b".into()],
                        parallel_safe: true,
                        conflicts: Vec::new(),
                    },
                    Wave {
                        index: 1,
                        node_ids: vec!["c".into()],
                        parallel_safe: false,
                        conflicts: vec![Conflict::File {
                            path: "app.ts".into(),
                            node_ids: vec!["c".into(), "d".into()],
                        }],
                    },
                    Wave {
                        index: 2,
                        node_ids: vec!["d".into()],
                        parallel_safe: false,
                        conflicts: Vec::new(),
                    },
                ],
                total_nodes: 4,
            },
            matches: vec![
                MatchResult {
                    subtask_id: "a".into(),
                    skill_id: Some("api".into()),
                    confidence: 0.5,
                    reasoning: String::new(),
                },
                MatchResult::no_match("b", "nothing"),
            ],
            match_errors: vec![crate::error::MatchError::NoQualifyingSkill {
                subtask_id: "b".into(),
            }],
            strategy: None,
            complexity: None,
        }
    }

    #[test]
    fn test_wire_shape() {
        let v = serde_json::to_value(PlanOutput::from_report(&report())).unwrap();
        assert_eq!(v["totalNodes"], 4);
        assert_eq!(v["waves"][0]["waveNumber"], 0);
        assert_eq!(v["waves"][0]["parallelizable"], true);
        assert_eq!(v["waves"][1]["conflicts"][0]["type"], "file");
        assert_eq!(v["unmatched"], serde_json::json!(["b"]));
        assert!(v["error"].is_null());
        assert!(v["matches"][1]["skillId"].is_null());
    }

    #[test]
    fn test_error_output_is_otherwise_empty() {
        let err = PlanningError::Validation(ValidationError::Cycle {
            path: vec!["a".into(), "b".into(), "a".into()],
        });
        let out = PlanOutput::from_error(&err);
        assert!(out.waves.is_empty() && out.matches.is_empty() && out.unmatched.is_empty());
        let e = out.error.as_ref().unwrap();
        assert_eq!(e.code, "cycle");
        assert!(e.message.contains("a -> b -> a"));
    }

    #[test]
    fn test_render_text() {
        let text = PlanOutput::from_report(&report()).render_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Wave 0 [parallel]: a, b");
        assert_eq!(lines[1], "Wave 1 [sequential]: c");
        assert_eq!(lines[2], "  file conflict on app.ts: c, d");
        assert_eq!(lines[3], "Wave 2 [sequential]: d");
        assert!(text.contains("b -> (unmatched)"));
    }

    #[test]
    fn test_write_json_ends_with_newline() {
        let mut buf = Vec::new();
        PlanOutput::from_report(&report()).write_json(&mut buf, false).unwrap();
        assert_eq!(buf.last(), Some(&b'\n'));
    }
}
