use crate::graph::Subtask;
use crate::skill::SkillDescriptor;

use super::text::clamp_unit;
use super::{MatchResult, SelectionPolicy};

/// Candidate indices ordered by score, highest first. Ties keep registry order.
pub fn rank(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    // sort_by is stable, so equal scores stay in declaration order.
    order.sort_by(|a, b| {
        clamp_unit(scores[*b])
            .partial_cmp(&clamp_unit(scores[*a]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// Pick the strictly highest score; the first-declared candidate wins ties.
pub fn select_best(
    strategy: &str,
    subtask: &Subtask,
    candidates: &[SkillDescriptor],
    scores: &[f64],
    policy: &SelectionPolicy,
) -> MatchResult {
    let mut best: Option<(usize, f64)> = None;
    for (idx, raw) in scores.iter().enumerate().take(candidates.len()) {
        let score = clamp_unit(*raw);
        match best {
            Some((_, current)) if score <= current => {}
            _ => best = Some((idx, score)),
        }
    }

    match best {
        Some((idx, score)) if policy.qualifies(score) => {
            let skill = &candidates[idx];
            MatchResult {
                subtask_id: subtask.id.clone(),
                skill_id: Some(skill.id.clone()),
                confidence: score,
                reasoning: format!(
                    "{strategy}: '{}' scored {:.3} (best of {})",
                    skill.id,
                    score,
                    candidates.len()
                ),
            }
        }
        Some((idx, score)) if score > 0.0 => MatchResult::no_match(
            &subtask.id,
            format!(
                "{strategy}: best candidate '{}' scored {:.3}, below threshold {:.3}",
                candidates[idx].id, score, policy.min_confidence
            ),
        ),
        Some(_) => MatchResult::no_match(
            &subtask.id,
            format!("{strategy}: no candidate scored above zero"),
        ),
        None => MatchResult::no_match(&subtask.id, format!("{strategy}: no candidate skills")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(ids: &[&str]) -> Vec<SkillDescriptor> {
        ids.iter().map(|id| SkillDescriptor::new(*id, *id, "")).collect()
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        assert_eq!(rank(&[0.2, 0.9, 0.2, 0.9]), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_select_best_tie_goes_to_first_registered() {
        let task = Subtask::new("t", "x");
        let result = select_best(
            "lexical",
            &task,
            &skills(&["a", "b", "c"]),
            &[0.5, 0.7, 0.7],
            &SelectionPolicy::default(),
        );
        assert_eq!(result.skill_id.as_deref(), Some("b"));
        assert!((result.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_select_best_zero_scores_are_no_match() {
        let task = Subtask::new("t", "x");
        let result = select_best(
            "lexical",
            &task,
            &skills(&["a"]),
            &[0.0],
            &SelectionPolicy::default(),
        );
        assert_eq!(result.skill_id, None);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_select_best_respects_threshold() {
        let task = Subtask::new("t", "x");
        let policy = SelectionPolicy {
            min_confidence: 0.8,
        };
        let result = select_best("vector", &task, &skills(&["a"]), &[0.75], &policy);
        assert_eq!(result.skill_id, None);
        assert!(result.reasoning.contains("below threshold"));
    }
}
