use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use skillwave_core::api::{CliError, SkillRegistry, Subtask};

#[derive(Deserialize)]
#[serde(untagged)]
enum SubtaskFile {
    List(Vec<Subtask>),
    Wrapped { subtasks: Vec<Subtask> },
}

pub fn parse_subtasks(raw: &str) -> Result<Vec<Subtask>, CliError> {
    let file: SubtaskFile = serde_json::from_str(raw)
        .map_err(|e| CliError::Command(format!("invalid subtasks JSON: {e}")))?;
    Ok(match file {
        SubtaskFile::List(list) => list,
        SubtaskFile::Wrapped { subtasks } => subtasks,
    })
}

/// Read subtasks from a file path, or from stdin when `source` is `-`.
pub fn read_subtasks(source: &str) -> Result<Vec<Subtask>, CliError> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source)?
    };
    parse_subtasks(&raw)
}

pub fn read_registry(path: &Path) -> Result<SkillRegistry, CliError> {
    Ok(SkillRegistry::load_json(path)?)
}
