//! Application configuration for the handbook builder.
//!
//! User config lives at `~/.handbook/handbook.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{HandbookError, Result};
use crate::types::{Chapter, ContentSelector, Outline, Section};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "handbook.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".handbook";

/// Site the default outline is scraped from.
const DEFAULT_SITE_URL: &str = "https://bioinformatics.ucsd.edu";

// ---------------------------------------------------------------------------
// Config structs (matching handbook.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Title page settings.
    #[serde(default)]
    pub document: DocumentConfig,

    /// HTTP fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Output file and typesetter.
    #[serde(default)]
    pub output: OutputConfig,

    /// Chapters in reading order.
    #[serde(default = "default_chapters")]
    pub chapters: Vec<Chapter>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            document: DocumentConfig::default(),
            fetch: FetchConfig::default(),
            output: OutputConfig::default(),
            chapters: default_chapters(),
        }
    }
}

impl AppConfig {
    /// The ordered outline described by `[[chapters]]`.
    pub fn outline(&self) -> Outline {
        Outline {
            chapters: self.chapters.clone(),
        }
    }
}

/// `[document]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Bold first line of the title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Second line of the title.
    #[serde(default = "default_subtitle")]
    pub subtitle: String,

    /// Authoritative website, linked from the title page.
    #[serde(default = "default_site_url")]
    pub site_url: Url,

    /// Note printed under the compile date.
    #[serde(default = "default_notice")]
    pub notice: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
            site_url: default_site_url(),
            notice: default_notice(),
        }
    }
}

fn default_title() -> String {
    "Bioinformatics & Systems Biology".into()
}
fn default_subtitle() -> String {
    "Graduate Student Handbook".into()
}
fn default_site_url() -> Url {
    Url::parse(DEFAULT_SITE_URL).expect("valid default site url")
}
fn default_notice() -> String {
    "This unofficial PDF is automatically generated. Information on the website is the authority."
        .into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Override for the User-Agent header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: default_timeout_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_redirects() -> usize {
    5
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path of the generated `.tex` file.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Typesetter executable used by `--compile`.
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Run the typesetter after every successful build.
    #[serde(default)]
    pub compile: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            compiler: default_compiler(),
            compile: false,
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("main.tex")
}
fn default_compiler() -> String {
    "pdflatex".into()
}

/// The outline of the original handbook.
fn default_chapters() -> Vec<Chapter> {
    let mission = Url::parse(DEFAULT_SITE_URL)
        .and_then(|base| base.join("/node/1"))
        .expect("valid default section url");

    vec![Chapter {
        title: "Introduction".into(),
        sections: vec![Section {
            title: "Mission Statement".into(),
            url: mission,
            selector: ContentSelector::default(),
        }],
    }]
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.handbook/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| HandbookError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.handbook/handbook.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| HandbookError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        HandbookError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| HandbookError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| HandbookError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| HandbookError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject outlines that cannot produce a document.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.chapters.is_empty() {
        return Err(HandbookError::config("no [[chapters]] configured"));
    }

    for chapter in &config.chapters {
        if chapter.title.trim().is_empty() {
            return Err(HandbookError::config("chapter with an empty title"));
        }
        if chapter.sections.is_empty() {
            tracing::warn!(chapter = %chapter.title, "chapter has no sections");
        }
        for section in &chapter.sections {
            if !matches!(section.url.scheme(), "http" | "https") {
                return Err(HandbookError::config(format!(
                    "section '{}': unsupported URL scheme in {}",
                    section.title, section.url
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("pdflatex"));
        assert!(toml_str.contains("Mission Statement"));
        assert!(toml_str.contains("div.field"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.fetch.timeout_secs, 30);
        assert_eq!(parsed.output.path, PathBuf::from("main.tex"));
        assert_eq!(parsed.outline().section_count(), 1);
    }

    #[test]
    fn config_with_chapters() {
        let toml_str = r#"
[document]
title = "Lab Handbook"

[[chapters]]
title = "Courses"

[[chapters.sections]]
title = "Requirements"
url = "https://example.com/node/7"

[[chapters.sections]]
title = "Electives"
url = "https://example.com/electives"
selector = "*"

[[chapters]]
title = "Funding"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        validate_config(&config).expect("valid");

        assert_eq!(config.document.title, "Lab Handbook");
        assert_eq!(config.document.subtitle, "Graduate Student Handbook");

        let outline = config.outline();
        assert_eq!(outline.chapters.len(), 2);
        assert_eq!(outline.chapters[0].sections[0].title, "Requirements");
        assert_eq!(
            outline.chapters[0].sections[0].selector,
            ContentSelector::class("div", "field")
        );
        assert_eq!(
            outline.chapters[0].sections[1].selector,
            ContentSelector::AllChildren
        );
        assert_eq!(outline.section_count(), 2);
    }

    #[test]
    fn invalid_selector_is_rejected() {
        let toml_str = r#"
[[chapters]]
title = "Broken"

[[chapters.sections]]
title = "Bad"
url = "https://example.com/"
selector = "div"
"#;
        assert!(toml::from_str::<AppConfig>(toml_str).is_err());
    }

    #[test]
    fn non_http_section_fails_validation() {
        let mut config = AppConfig::default();
        config.chapters[0].sections[0].url = Url::parse("file:///etc/passwd").unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("unsupported URL scheme"));
    }

    #[test]
    fn empty_outline_fails_validation() {
        let mut config = AppConfig::default();
        config.chapters.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn load_config_from_file() {
        let dir = std::env::temp_dir().join(format!("handbook-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[output]\npath = \"out/handbook.tex\"\ncompile = true\n",
        )
        .unwrap();

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.output.path, PathBuf::from("out/handbook.tex"));
        assert!(config.output.compile);
        assert_eq!(config.output.compiler, "pdflatex");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
