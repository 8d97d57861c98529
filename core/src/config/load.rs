use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Default data directory: ~/.skillwave
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".skillwave"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.skillwave/config.toml
    let data_dir = get_data_dir()?;
    let user_config = data_dir.join("config.toml");

    // Priority 2: ./skillwave.toml
    let local_config = Path::new("skillwave.toml");

    let mut cfg = if user_config.exists() {
        load_from(&user_config)?
    } else if local_config.exists() {
        load_from(local_config)?
    } else {
        AppConfig::default()
    };

    if cfg.cache.path.trim().is_empty() {
        cfg.cache.path = data_dir
            .join("embeddings.json")
            .to_string_lossy()
            .to_string();
    }

    if cfg.logging.file
        && cfg
            .logging
            .directory
            .as_ref()
            .map(|s| s.trim().is_empty())
            .unwrap_or(true)
    {
        let logs_dir = data_dir.join("logs");
        std::fs::create_dir_all(&logs_dir)?;
        cfg.logging.directory = Some(logs_dir.to_string_lossy().to_string());
    }

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

pub fn load_from(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config {}: {e}", path.display()))?;
    toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("failed to parse config {}: {e}", path.display()))
}

/// Environment overrides (highest priority). Blank values are ignored.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("SKILLWAVE_EMBEDDING_URL") {
        cfg.embedding.base_url = v;
    }
    if let Some(v) = get("SKILLWAVE_EMBEDDING_API_KEY") {
        cfg.embedding.api_key = v;
    }
    if let Some(v) = get("SKILLWAVE_EMBEDDING_MODEL") {
        cfg.embedding.model = v;
    }
    if let Some(v) = get("SKILLWAVE_RERANK_URL") {
        cfg.rerank.base_url = v;
    }
    if let Some(v) = get("SKILLWAVE_RERANK_API_KEY") {
        cfg.rerank.api_key = v;
    }
    if let Some(v) = get("SKILLWAVE_DECOMPOSITION_URL") {
        cfg.decomposition.base_url = v;
    }
    if let Some(v) = get("SKILLWAVE_DECOMPOSITION_API_KEY") {
        cfg.decomposition.api_key = v;
    }
    if let Some(v) = get("SKILLWAVE_CACHE_PATH") {
        cfg.cache.path = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides_skip_blank_values() {
        let env: HashMap<&str, &str> = [
            ("SKILLWAVE_RERANK_URL", "http://rerank:9000"),
            ("SKILLWAVE_EMBEDDING_URL", "  "),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.rerank.base_url, "http://rerank:9000");
        assert_eq!(cfg.embedding.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skillwave.toml");
        std::fs::write(&path, "[matcher]\nstrategy = \"psychic\"\n").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }
}
