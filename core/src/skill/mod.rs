//! Skill descriptors and the ordered registry they are matched from.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDescriptor {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub capability_tags: Vec<String>,

    /// Files this skill is known to write when it runs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub write_paths: Vec<String>,
}

impl SkillDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            capability_tags: Vec::new(),
            write_paths: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capability_tags = tags.into_iter().map(Into::into).collect();
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

    pub fn has_tag(&self, tag: &str) -> bool {
        self.capability_tags
            .iter()
            .any(|t| t.trim().eq_ignore_ascii_case(tag.trim()))
    }

    /// Text sent to the embedding service; also the cache signature source.
    pub fn embedding_text(&self) -> String {
        format!(
            "{}\n{}\ntags: {}",
            self.name,
            self.description,
            self.capability_tags.join(", ")
        )
    }
}

/// Skills in declaration order. Order is the tie-break for matching.
#[derive(Debug, Clone, Default)]
pub struct SkillRegistry {
    skills: Vec<SkillDescriptor>,
}

impl SkillRegistry {
    pub fn new(skills: Vec<SkillDescriptor>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for skill in &skills {
            if !seen.insert(skill.id.as_str()) {
                return Err(RegistryError::DuplicateSkillId(skill.id.clone()));
            }
        }
        Ok(Self { skills })
    }

    /// Load a JSON array of skill descriptors.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let path_str = path.as_ref().display().to_string();
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|source| RegistryError::Io {
            path: path_str.clone(),
            source,
        })?;
        let skills: Vec<SkillDescriptor> =
            serde_json::from_str(&raw).map_err(|source| RegistryError::Parse {
                path: path_str.clone(),
                source,
            })?;
        tracing::debug!(target: "skillwave.registry", path = %path_str, skills = skills.len(), "registry loaded");
        Self::new(skills)
    }

    pub fn skills(&self) -> &[SkillDescriptor] {
        &self.skills
    }

    pub fn get(&self, id: &str) -> Option<&SkillDescriptor> {
        self.skills.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_registry_rejects_duplicate_ids() {
        let err = SkillRegistry::new(vec![
            SkillDescriptor::new("s1", "one", ""),
            SkillDescriptor::new("s1", "again", ""),
        ])
        .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSkillId(id) if id == "s1"));
    }

    #[test]
    fn test_load_json_keeps_declaration_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"b","name":"B","description":"second","capabilityTags":["x"]}},
                {{"id":"a","name":"A","description":"first"}}]"#
        )
        .unwrap();

        let registry = SkillRegistry::load_json(file.path()).unwrap();
        let ids: Vec<&str> = registry.skills().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(registry.get("b").unwrap().has_tag("X"));
    }

    #[test]
    fn test_load_json_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = SkillRegistry::load_json(file.path()).unwrap_err();
        assert!(matches!(err, RegistryError::Parse { .. }));
    }
}
