#![allow(dead_code)]

use std::collections::HashMap;

use async_trait::async_trait;
use skillwave_core::api::{
    Dag, Embedding, EmbeddingService, ExecutionPlan, ExternalServiceError, SkillDescriptor,
    SkillRegistry, Subtask,
};

/// Deterministic pseudo-random DAG: node `i` may depend on any `j < i`.
pub fn random_subtasks(n: usize, seed: u64, paths: usize) -> Vec<Subtask> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };

    (0..n)
        .map(|i| {
            let deps: Vec<String> = (0..i)
                .filter(|_| next() % 4 == 0)
                .map(|j| format!("t{j}"))
                .collect();
            let mut task = Subtask::new(format!("t{i}"), format!("task number {i}"))
                .with_dependencies(deps);
            if paths > 0 {
                task = task.with_write_paths([format!("src/f{}.rs", next() % paths)]);
            }
            task
        })
        .collect()
}

/// Every node placed exactly once, dependencies in strictly earlier waves.
pub fn assert_valid_plan(plan: &ExecutionPlan, dag: &Dag) {
    let mut wave_of: HashMap<&str, usize> = HashMap::new();
    for (pos, wave) in plan.waves.iter().enumerate() {
        assert_eq!(wave.index, pos, "wave indices must be 0..n");
        for id in &wave.node_ids {
            assert!(
                wave_of.insert(id.as_str(), pos).is_none(),
                "node {id} placed twice"
            );
        }
    }
    assert_eq!(wave_of.len(), dag.len());
    assert_eq!(plan.total_nodes, dag.len());

    for id in dag.node_ids() {
        for dep in dag.dependencies(id) {
            assert!(
                wave_of[dep.as_str()] < wave_of[id.as_str()],
                "{id} must come after {dep}"
            );
        }
    }
}

pub fn sample_registry() -> SkillRegistry {
    SkillRegistry::new(vec![
        SkillDescriptor::new("scaffold", "Project scaffolder", "Create project layout and config")
            .with_tags(["setup"]),
        SkillDescriptor::new("api", "API builder", "Build REST API endpoints")
            .with_tags(["http", "backend"]),
        SkillDescriptor::new("ui", "UI builder", "Build frontend pages and components")
            .with_tags(["frontend"]),
        SkillDescriptor::new("deploy", "Deployer", "Deploy the release to production")
            .with_tags(["ops", "singleton"]),
    ])
    .expect("sample registry is valid")
}

/// Embeds text onto keyword axes; counts batch calls.
#[derive(Default)]
pub struct KeywordEmbedder {
    pub batch_calls: std::sync::atomic::AtomicUsize,
}

pub fn keyword_axes(text: &str) -> Vec<f32> {
    let t = text.to_lowercase();
    ["api", "frontend", "deploy", "project"]
        .iter()
        .map(|k| if t.contains(k) { 1.0 } else { 0.0 })
        .chain(std::iter::once(0.05))
        .collect()
}

#[async_trait]
impl EmbeddingService for KeywordEmbedder {
    fn model_id(&self) -> &str {
        "keyword-test"
    }

    async fn embed(&self, text: &str) -> Result<Embedding, ExternalServiceError> {
        Ok(Embedding {
            vector: keyword_axes(text),
            model_id: "keyword-test".into(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, ExternalServiceError> {
        self.batch_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|t| Embedding {
                vector: keyword_axes(t),
                model_id: "keyword-test".into(),
            })
            .collect())
    }
}
