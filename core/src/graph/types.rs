use serde::{Deserialize, Serialize};

/// One unit of declared work, as produced by the decomposition step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub required_capabilities: Vec<String>,

    /// Ids of subtasks that must finish before this one starts.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// File paths the subtask itself declares it will write.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub write_paths: Vec<String>,
}

impl Subtask {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            required_capabilities: Vec::new(),
            dependencies: Vec::new(),
            write_paths: Vec::new(),
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_capabilities<I, S>(mut self, caps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_capabilities = caps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_write_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.write_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Text sent to the embedding service for this subtask.
    pub fn embedding_text(&self) -> String {
        if self.required_capabilities.is_empty() {
            self.description.clone()
        } else {
            format!(
                "{}\ncapabilities: {}",
                self.description,
                self.required_capabilities.join(", ")
            )
        }
    }
}

/// A subtask placed in the graph, plus what matching resolved for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub subtask: Subtask,
    pub skill_id: Option<String>,
    pub predicted_write_paths: Vec<String>,
}

impl GraphNode {
    pub fn new(subtask: Subtask) -> Self {
        let predicted_write_paths = merge_paths(&subtask.write_paths, &[]);
        Self {
            subtask,
            skill_id: None,
            predicted_write_paths,
        }
    }

    pub fn id(&self) -> &str {
        &self.subtask.id
    }

    pub fn dependencies(&self) -> &[String] {
        &self.subtask.dependencies
    }
}

/// Skill resolution attached to a node after matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeResolution {
    pub skill_id: Option<String>,
    pub skill_write_paths: Vec<String>,
}

/// Declared paths first, then skill paths; duplicates keep their first position.
pub(crate) fn merge_paths(declared: &[String], from_skill: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(declared.len() + from_skill.len());
    for path in declared.iter().chain(from_skill.iter()) {
        let path = path.trim();
        if path.is_empty() || out.iter().any(|p| p == path) {
            continue;
        }
        out.push(path.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtask_deserializes_camel_case_with_defaults() {
        let json = r#"{"id":"a","description":"write docs","requiredCapabilities":["docs"]}"#;
        let task: Subtask = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "a");
        assert_eq!(task.required_capabilities, vec!["docs".to_string()]);
        assert!(task.dependencies.is_empty());
        assert!(task.write_paths.is_empty());
    }

    #[test]
    fn test_merge_paths_dedups_in_first_seen_order() {
        let declared = vec!["app.ts".to_string(), " app.ts ".to_string(), "".to_string()];
        let skill = vec!["lib.rs".to_string(), "app.ts".to_string()];
        assert_eq!(merge_paths(&declared, &skill), vec!["app.ts", "lib.rs"]);
    }

    #[test]
    fn test_embedding_text_includes_capabilities() {
        let task = Subtask::new("a", "Build API").with_capabilities(["http", "rust"]);
        assert_eq!(task.embedding_text(), "Build API\ncapabilities: http, rust");
    }
}
