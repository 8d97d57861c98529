//! Conflict detection for a candidate concurrent wave.
//!
//! Pure function of its inputs: the exclusivity registry is passed in
//! explicitly rather than held as process-wide state.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::graph::Dag;
use crate::skill::SkillDescriptor;

pub const DEFAULT_SINGLETON_TAG: &str = "singleton";

/// Reason two nodes of one wave cannot safely run concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Conflict {
    #[serde(rename_all = "camelCase")]
    File { path: String, node_ids: Vec<String> },

    #[serde(rename_all = "camelCase")]
    Exclusivity {
        capability_tag: String,
        node_ids: Vec<String>,
    },
}

impl Conflict {
    pub fn node_ids(&self) -> &[String] {
        match self {
            Self::File { node_ids, .. } | Self::Exclusivity { node_ids, .. } => node_ids,
        }
    }

    pub fn involves(&self, node_id: &str) -> bool {
        self.node_ids().iter().any(|n| n == node_id)
    }
}

/// Which capability tags are exclusive, and which tags each skill carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusivityRegistry {
    exclusive_tags: BTreeSet<String>,
    skill_tags: HashMap<String, Vec<String>>,
}

impl ExclusivityRegistry {
    pub fn new<I, S>(exclusive_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclusive_tags: exclusive_tags
                .into_iter()
                .map(|t| Into::<String>::into(t).trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            skill_tags: HashMap::new(),
        }
    }

    /// Registry over `skills`, treating `exclusive_tags` as singleton markers.
    pub fn from_skills<I, S>(skills: &[SkillDescriptor], exclusive_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new(exclusive_tags);
        for skill in skills {
            registry.register_skill(&skill.id, skill.capability_tags.iter().cloned());
        }
        registry
    }

    pub fn register_skill<I, S>(&mut self, skill_id: &str, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skill_tags.insert(
            skill_id.to_string(),
            tags.into_iter()
                .map(|t| Into::<String>::into(t).trim().to_lowercase())
                .collect(),
        );
    }

    pub fn is_exclusive(&self, tag: &str) -> bool {
        self.exclusive_tags.contains(&tag.trim().to_lowercase())
    }

    /// Exclusive tags carried by a skill, in the skill's tag order.
    pub fn exclusive_tags_of(&self, skill_id: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        if let Some(tags) = self.skill_tags.get(skill_id) {
            for tag in tags {
                if self.exclusive_tags.contains(tag) && !out.contains(&tag.as_str()) {
                    out.push(tag);
                }
            }
        }
        out
    }
}

/// Conflicts found in one wave, plus a suggested safe ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveAnalysis {
    pub conflicts: Vec<Conflict>,
    /// Conflicting nodes in original wave order, to run one at a time.
    pub remediation: Vec<String>,
}

impl WaveAnalysis {
    pub fn is_safe(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Check every unordered pair of `node_ids` for shared write paths and shared
/// exclusive capability tags.
///
/// Ids not present in `dag` are ignored.
pub fn analyze_wave(node_ids: &[String], dag: &Dag, exclusivity: &ExclusivityRegistry) -> WaveAnalysis {
    let nodes: Vec<_> = node_ids.iter().filter_map(|id| dag.node(id)).collect();

    // path -> members, in first-seen order
    let mut file_groups: Vec<(String, BTreeSet<usize>)> = Vec::new();
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            for path in &nodes[i].predicted_write_paths {
                if !nodes[j].predicted_write_paths.contains(path) {
                    continue;
                }
                match file_groups.iter_mut().find(|(p, _)| p == path) {
                    Some((_, members)) => {
                        members.insert(i);
                        members.insert(j);
                    }
                    None => file_groups.push((path.clone(), BTreeSet::from([i, j]))),
                }
            }
        }
    }

    // tag -> members, in first-seen order
    let mut tag_groups: Vec<(String, BTreeSet<usize>)> = Vec::new();
    for (idx, node) in nodes.iter().enumerate() {
        let Some(skill_id) = node.skill_id.as_deref() else {
            continue;
        };
        for tag in exclusivity.exclusive_tags_of(skill_id) {
            match tag_groups.iter_mut().find(|(t, _)| t == tag) {
                Some((_, members)) => {
                    members.insert(idx);
                }
                None => tag_groups.push((tag.to_string(), BTreeSet::from([idx]))),
            }
        }
    }

    let ids = |members: &BTreeSet<usize>| -> Vec<String> {
        members.iter().map(|i| nodes[*i].id().to_string()).collect()
    };

    let mut conflicts = Vec::new();
    let mut involved: BTreeSet<usize> = BTreeSet::new();

    for (path, members) in &file_groups {
        involved.extend(members.iter().copied());
        conflicts.push(Conflict::File {
            path: path.clone(),
            node_ids: ids(members),
        });
    }
    for (tag, members) in tag_groups.iter().filter(|(_, m)| m.len() > 1) {
        involved.extend(members.iter().copied());
        conflicts.push(Conflict::Exclusivity {
            capability_tag: tag.clone(),
            node_ids: ids(members),
        });
    }

    let remediation = involved
        .into_iter()
        .map(|i| nodes[i].id().to_string())
        .collect();

    if !conflicts.is_empty() {
        tracing::debug!(
            target: "skillwave.conflict",
            wave_size = nodes.len(),
            conflicts = conflicts.len(),
            "unsafe wave detected"
        );
    }

    WaveAnalysis {
        conflicts,
        remediation,
    }
}
