use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::resolver::{IndustryResolver, DEFAULT_UNCLASSIFIED_LABEL};
use crate::data::schema::pad_stock_code;

/// Runtime configuration.  Every field has a default, so a JSON file only
/// needs the keys it changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory holding both input files.  Created on first load if absent.
    pub data_dir: PathBuf,
    /// Word-frequency file name, relative to `data_dir`.  Required.
    pub primary_file: PathBuf,
    /// Industry classification file name, relative to `data_dir`.  Optional.
    pub secondary_file: PathBuf,
    /// Rows with an earlier year are dropped from both files.
    pub year_cutoff: i32,
    /// Industry label for rows nothing could classify.
    pub unclassified_label: String,
    /// Company name used when the source cell is blank.
    pub unknown_company_label: String,
    /// How long a successful load is reused before reading the files again.
    pub cache_ttl_secs: u64,
    /// Maximum number of companies offered in the selector.
    pub company_option_limit: usize,
    /// Maximum number of industries offered for extra comparison lines.
    pub industry_option_limit: usize,
    /// Extra or overriding code → industry entries.
    pub code_industry: BTreeMap<String, String>,
    /// Extra or overriding company name → industry entries.
    pub name_industry: BTreeMap<String, String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            primary_file: PathBuf::from("word_frequency.xlsx"),
            secondary_file: PathBuf::from("industry_codes.xlsx"),
            year_cutoff: 2010,
            unclassified_label: DEFAULT_UNCLASSIFIED_LABEL.to_string(),
            unknown_company_label: "未知企业".to_string(),
            cache_ttl_secs: 3600,
            company_option_limit: 100,
            industry_option_limit: 20,
            code_industry: BTreeMap::new(),
            name_industry: BTreeMap::new(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Configuration rooted at `data_dir`, everything else default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn primary_path(&self) -> PathBuf {
        self.data_dir.join(&self.primary_file)
    }

    pub fn secondary_path(&self) -> PathBuf {
        self.data_dir.join(&self.secondary_file)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Built-in industry tables with this config's entries layered on top.
    pub fn resolver(&self) -> IndustryResolver {
        let mut resolver = IndustryResolver::builtin(&self.unclassified_label);
        // lookups use padded identifiers, so "1" must land on "000001"
        for (code, industry) in &self.code_industry {
            resolver.insert_code(&pad_stock_code(code), industry);
        }
        resolver.extend_names(
            self.name_industry
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
        resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digiscope.json");
        std::fs::write(
            &path,
            r#"{ "year_cutoff": 2000, "code_industry": { "000001": "Finance" } }"#,
        )
        .unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.year_cutoff, 2000);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.primary_path(), PathBuf::from("data/word_frequency.xlsx"));
        assert_eq!(config.resolver().resolve("000001", None, None), "Finance");
    }

    #[test]
    fn unpadded_code_keys_match_padded_lookups() {
        let mut config = DashboardConfig::default();
        config
            .code_industry
            .insert("1".to_string(), "Finance".to_string());
        config
            .code_industry
            .insert(" 300750 ".to_string(), "电池".to_string());

        let resolver = config.resolver();
        assert_eq!(resolver.resolve("000001", None, None), "Finance");
        assert_eq!(resolver.resolve("300750", None, None), "电池");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("digiscope.json");
        std::fs::write(&path, "{ year_cutoff: }").unwrap();
        assert!(DashboardConfig::from_file(&path).is_err());
    }
}
