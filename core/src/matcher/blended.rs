use async_trait::async_trait;

use crate::error::ExternalServiceError;
use crate::graph::Subtask;
use crate::skill::SkillDescriptor;

use super::lexical::LexicalStrategy;
use super::text::clamp_unit;
use super::vector::VectorStrategy;
use super::MatchStrategy;

/// Weights for the blended score. Normalized to sum to 1 before use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    pub lexical: f64,
    pub vector: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            lexical: 0.4,
            vector: 0.6,
        }
    }
}

impl BlendWeights {
    pub fn new(lexical: f64, vector: f64) -> Self {
        Self { lexical, vector }.normalized()
    }

    /// Negative or NaN weights count as 0; if nothing is left, use the defaults.
    pub fn normalized(self) -> Self {
        let sanitize = |w: f64| if w.is_nan() || w < 0.0 { 0.0 } else { w };
        let lexical = sanitize(self.lexical);
        let vector = sanitize(self.vector);
        let sum = lexical + vector;
        if sum <= 0.0 || !sum.is_finite() {
            return Self::default();
        }
        Self {
            lexical: lexical / sum,
            vector: vector / sum,
        }
    }

    /// `w_lexical * lexical + w_vector * vector`
    pub fn blend(&self, lexical: f64, vector: f64) -> f64 {
        clamp_unit(self.lexical * lexical + self.vector * vector)
    }
}

pub struct BlendedStrategy {
    lexical: LexicalStrategy,
    vector: VectorStrategy,
    weights: BlendWeights,
}

impl BlendedStrategy {
    pub fn new(vector: VectorStrategy, weights: BlendWeights) -> Self {
        Self {
            lexical: LexicalStrategy::new(),
            vector,
            weights: weights.normalized(),
        }
    }

    pub fn weights(&self) -> BlendWeights {
        self.weights
    }
}

#[async_trait]
impl MatchStrategy for BlendedStrategy {
    fn name(&self) -> &str {
        "blended"
    }

    async fn score(
        &self,
        subtask: &Subtask,
        candidates: &[SkillDescriptor],
    ) -> Result<Vec<f64>, ExternalServiceError> {
        let lexical = self.lexical.score(subtask, candidates).await?;
        let vector = self.vector.score(subtask, candidates).await?;
        Ok(lexical
            .iter()
            .zip(vector.iter())
            .map(|(l, v)| self.weights.blend(*l, *v))
            .collect())
    }
}
