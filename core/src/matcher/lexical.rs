use async_trait::async_trait;

use crate::error::ExternalServiceError;
use crate::graph::Subtask;
use crate::skill::SkillDescriptor;

use super::text::{jaccard, tokenize};
use super::MatchStrategy;

/// Token-overlap matching. Pure and deterministic.
///
/// Without required capabilities the score is the Jaccard ratio of the two
/// token sets. With them, it is `0.5 * jaccard + 0.5 * coverage`, and a skill
/// whose tags cover none of the required capabilities scores 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalStrategy;

impl LexicalStrategy {
    pub fn new() -> Self {
        Self
    }

    pub fn score_one(&self, subtask: &Subtask, skill: &SkillDescriptor) -> f64 {
        let query = tokenize(&format!(
            "{} {}",
            subtask.description,
            subtask.required_capabilities.join(" ")
        ));
        let target = tokenize(&format!(
            "{} {} {}",
            skill.name,
            skill.description,
            skill.capability_tags.join(" ")
        ));
        let overlap = jaccard(&query, &target);

        let required: Vec<&str> = subtask
            .required_capabilities
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        if required.is_empty() {
            return overlap;
        }

        let covered = required.iter().filter(|c| skill.has_tag(c)).count();
        if covered == 0 {
            return 0.0;
        }
        let coverage = covered as f64 / required.len() as f64;
        0.5 * overlap + 0.5 * coverage
    }
}

#[async_trait]
impl MatchStrategy for LexicalStrategy {
    fn name(&self) -> &str {
        "lexical"
    }

    async fn score(
        &self,
        subtask: &Subtask,
        candidates: &[SkillDescriptor],
    ) -> Result<Vec<f64>, ExternalServiceError> {
        Ok(candidates
            .iter()
            .map(|skill| self.score_one(subtask, skill))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{SelectionPolicy, SkillMatcher};

    fn registry() -> Vec<SkillDescriptor> {
        vec![
            SkillDescriptor::new("docs", "Docs writer", "Write markdown documentation")
                .with_tags(["docs", "markdown"]),
            SkillDescriptor::new("api", "API builder", "Build REST API endpoints in Rust")
                .with_tags(["http", "rust"]),
        ]
    }

    #[test]
    fn test_scores_are_in_unit_range() {
        let lexical = LexicalStrategy::new();
        let task = Subtask::new("t", "build rest api endpoints").with_capabilities(["http"]);
        for skill in registry() {
            let s = lexical.score_one(&task, &skill);
            assert!((0.0..=1.0).contains(&s), "{s}");
        }
    }

    #[tokio::test]
    async fn test_lexical_picks_overlapping_skill() {
        let matcher = SkillMatcher::new(Box::new(LexicalStrategy), SelectionPolicy::default());
        let task = Subtask::new("t", "Build REST endpoints for the user API");
        let result = matcher.find_best_match(&task, &registry()).await.unwrap();
        assert_eq!(result.skill_id.as_deref(), Some("api"));
        assert!(result.confidence > 0.0 && result.confidence <= 1.0);
    }

    #[tokio::test]
    async fn test_missing_capability_yields_no_match() {
        let matcher = SkillMatcher::new(Box::new(LexicalStrategy), SelectionPolicy::default());
        let task = Subtask::new("t", "Build REST API endpoints").with_capabilities(["x"]);
        let result = matcher.find_best_match(&task, &registry()).await.unwrap();
        assert_eq!(result.skill_id, None);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_capability_coverage_is_case_insensitive() {
        let lexical = LexicalStrategy::new();
        let task = Subtask::new("t", "").with_capabilities(["HTTP", "rust"]);
        let skill = &registry()[1];
        // No description tokens overlap beyond the capabilities themselves.
        assert!(lexical.score_one(&task, skill) >= 0.5);
    }
}
