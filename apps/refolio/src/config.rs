//! Site configuration (`refolio.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use refolio_core::SortMode;

/// Top-level site configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub tagline: Option<String>,
    /// Folder holding one sub-folder of `.bib` files per section.
    pub data_dir: PathBuf,
    /// Output folder for the generated site.
    pub out_dir: PathBuf,
    pub sections: Vec<SectionConfig>,
}

/// One section of the site: a page backed by one collection folder.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionConfig {
    /// Page slug (`<slug>.html`, `data/<slug>.json`).
    pub slug: String,
    pub title: String,
    /// Collection folder under `data_dir`; defaults to the slug.
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub sort: SortMode,
}

impl SectionConfig {
    pub fn folder(&self) -> &str {
        self.folder.as_deref().unwrap_or(&self.slug)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Biblioteca de Referencias".to_string(),
            tagline: None,
            data_dir: PathBuf::from("data"),
            out_dir: PathBuf::from("site"),
            sections: vec![
                SectionConfig {
                    slug: "referencias".to_string(),
                    title: "Referencias de la Investigación".to_string(),
                    folder: Some("investigacion".to_string()),
                    sort: SortMode::AuthorYear,
                },
                SectionConfig {
                    slug: "presentacion".to_string(),
                    title: "Referencias de la Presentación".to_string(),
                    folder: None,
                    sort: SortMode::AuthorYear,
                },
                SectionConfig {
                    slug: "desarrollo".to_string(),
                    title: "Artículos Desarrollados".to_string(),
                    folder: None,
                    sort: SortMode::YearAuthor,
                },
            ],
        }
    }
}

impl SiteConfig {
    /// Load a config file; a missing file means the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("could not read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("could not parse config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_the_three_sections() {
        let config = SiteConfig::default();
        assert_eq!(config.sections.len(), 3);
        assert_eq!(config.sections[0].folder(), "investigacion");
        assert_eq!(config.sections[1].folder(), "presentacion");
        assert_eq!(config.sections[2].sort, SortMode::YearAuthor);
    }

    #[test]
    fn parses_a_config_file() {
        let toml = r#"
title = "Mi Biblioteca"
data_dir = "bibs"

[[sections]]
slug = "lecturas"
title = "Lecturas"
sort = "year-author"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.title, "Mi Biblioteca");
        assert_eq!(config.data_dir, PathBuf::from("bibs"));
        assert_eq!(config.sections.len(), 1);
        assert_eq!(config.sections[0].folder(), "lecturas");
        assert_eq!(config.sections[0].sort, SortMode::YearAuthor);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let config = SiteConfig::load(Path::new("/no/such/refolio.toml")).unwrap();
        assert_eq!(config.title, "Biblioteca de Referencias");
    }
}
