use crate::bm25::Bm25Config;
use crate::boolean::MatchMode;
use crate::tokenizer::AnalyzerConfig;
use crate::vsm::VsmConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for one run, passed explicitly to each builder. Missing JSON fields
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub analyzer: AnalyzerConfig,
    pub vsm: VsmConfig,
    pub bm25: Bm25Config,
    pub boolean_mode: MatchMode,
    pub k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            vsm: VsmConfig::default(),
            bm25: Bm25Config::default(),
            boolean_mode: MatchMode::Exact,
            k: 3,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        let config: EngineConfig =
            serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::StopwordSet;
    use crate::vsm::TfWeighting;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: EngineConfig = serde_json::from_str(
            r#"{"vsm": {"weighting": "sublinear"}, "boolean_mode": "substring", "analyzer": {"stopwords": "english"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.vsm.weighting, TfWeighting::Sublinear);
        assert!(cfg.vsm.smooth_idf);
        assert_eq!(cfg.boolean_mode, MatchMode::Substring);
        assert_eq!(cfg.analyzer.stopwords, StopwordSet::English);
        assert!(cfg.analyzer.stem);
        assert_eq!(cfg.bm25, Bm25Config::default());
        assert_eq!(cfg.k, 3);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }
}
