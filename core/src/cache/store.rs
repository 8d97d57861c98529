use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::skill::SkillDescriptor;

use super::signature::source_signature;

/// One cached vector, keyed by skill id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Skill id. Stored as the map key on disk.
    #[serde(skip)]
    pub key: String,

    pub embedding: Vec<f32>,

    pub model_id: String,

    pub source_description: String,

    /// Entries written before signatures existed deserialize as stale.
    #[serde(default)]
    pub source_signature: String,

    #[serde(rename = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn for_skill(skill: &SkillDescriptor, embedding: Vec<f32>, model_id: &str) -> Self {
        let text = skill.embedding_text();
        Self {
            key: skill.id.clone(),
            embedding,
            model_id: model_id.to_string(),
            source_signature: source_signature(&text),
            source_description: text,
            updated_at: Utc::now(),
        }
    }

    pub fn is_fresh_for(&self, skill: &SkillDescriptor) -> bool {
        self.source_signature == source_signature(&skill.embedding_text())
    }
}

/// Freshness counts for a set of skills.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatus {
    pub total: usize,
    pub fresh: usize,
    pub stale: usize,
    pub missing: usize,
}

/// Persisted skill id → vector store with content-addressed staleness.
#[derive(Debug, Clone, Default)]
pub struct MatchCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, CacheEntry>,
}

impl MatchCache {
    /// In-memory cache with no backing file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`, degrading to an empty cache if the file is unreadable
    /// or malformed. A missing file is simply an empty cache.
    pub fn load<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        match Self::try_load(&path) {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!(
                    target: "skillwave.cache",
                    path = %path.display(),
                    error = %e,
                    "cache unreadable, starting empty"
                );
                Self {
                    path: Some(path),
                    entries: BTreeMap::new(),
                }
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, CacheError> {
        let path_str = path.display().to_string();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self {
                    path: Some(path.to_path_buf()),
                    entries: BTreeMap::new(),
                });
            }
            Err(source) => {
                return Err(CacheError::Io {
                    path: path_str,
                    source,
                })
            }
        };

        let mut entries: BTreeMap<String, CacheEntry> =
            serde_json::from_str(&raw).map_err(|source| CacheError::Malformed {
                path: path_str.clone(),
                source,
            })?;
        for (key, entry) in entries.iter_mut() {
            entry.key = key.clone();
        }

        tracing::debug!(target: "skillwave.cache", path = %path_str, entries = entries.len(), "cache loaded");

        Ok(Self {
            path: Some(path.to_path_buf()),
            entries,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write to the backing file, if any.
    pub fn save(&self) -> Result<(), CacheError> {
        match &self.path {
            Some(path) => self.save_to(path),
            None => Ok(()),
        }
    }

    /// Write the whole cache to `path` (temp file, then rename).
    pub fn save_to(&self, path: &Path) -> Result<(), CacheError> {
        let path_str = path.display().to_string();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| CacheError::Io {
            path: tmp.display().to_string(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| CacheError::Io {
            path: path_str.clone(),
            source,
        })?;

        tracing::debug!(target: "skillwave.cache", path = %path_str, entries = self.entries.len(), "cache saved");
        Ok(())
    }

    /// Skills with no entry matching the signature of their current text.
    pub fn find_missing<'a>(&self, skills: &'a [SkillDescriptor]) -> Vec<&'a SkillDescriptor> {
        skills
            .iter()
            .filter(|skill| self.get_fresh(skill).is_none())
            .collect()
    }

    /// Insert or overwrite entries by key. Last write wins.
    pub fn set_batch(&mut self, entries: Vec<CacheEntry>) {
        for entry in entries {
            self.entries.insert(entry.key.clone(), entry);
        }
    }

    /// Stored vector for a skill id, fresh or not.
    pub fn get(&self, skill_id: &str) -> Option<&[f32]> {
        self.entries.get(skill_id).map(|e| e.embedding.as_slice())
    }

    pub fn entry(&self, skill_id: &str) -> Option<&CacheEntry> {
        self.entries.get(skill_id)
    }

    /// Stored vector only if it was produced from the skill's current text.
    pub fn get_fresh(&self, skill: &SkillDescriptor) -> Option<&[f32]> {
        self.entries
            .get(&skill.id)
            .filter(|e| e.is_fresh_for(skill))
            .map(|e| e.embedding.as_slice())
    }

    pub fn status(&self, skills: &[SkillDescriptor]) -> CacheStatus {
        let mut status = CacheStatus {
            total: skills.len(),
            ..CacheStatus::default()
        };
        for skill in skills {
            match self.entries.get(&skill.id) {
                Some(e) if e.is_fresh_for(skill) => status.fresh += 1,
                Some(_) => status.stale += 1,
                None => status.missing += 1,
            }
        }
        status
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
