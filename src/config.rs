use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{PublishError, Result};

/// File name looked up in the current directory and the user config directory.
pub const CONFIG_FILE_NAME: &str = "docpublish.toml";

/// Represents the complete configuration for docs-publish.
///
/// Contains the default branch, the publishing branch layout, remote settings
/// and the documentation generator invocation.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_branch")]
    pub default_branch: String,

    #[serde(default)]
    pub pages: PagesConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,
}

fn default_branch() -> String {
    "master".to_string()
}

/// Layout of the publishing branch.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PagesConfig {
    /// Branch holding the rendered documentation.
    #[serde(default = "default_pages_branch")]
    pub branch: String,

    /// Directory, relative to the build directory, receiving the checkout.
    #[serde(default = "default_checkout_dir")]
    pub checkout_dir: PathBuf,

    /// Directory name used for default-branch builds.
    #[serde(default = "default_latest_dir")]
    pub latest_dir: String,

    /// Write an empty `.nojekyll` at the root of the publishing branch.
    ///
    /// Off by default: adding the marker is itself a change, so enabling it
    /// on a branch that lacks it produces one commit even for identical docs.
    #[serde(default)]
    pub nojekyll: bool,

    /// Only tags matching this regular expression are published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_pattern: Option<String>,
}

fn default_pages_branch() -> String {
    "gh-pages".to_string()
}

fn default_checkout_dir() -> PathBuf {
    PathBuf::from("gh-pages")
}

fn default_latest_dir() -> String {
    "latest".to_string()
}

impl Default for PagesConfig {
    fn default() -> Self {
        PagesConfig {
            branch: default_pages_branch(),
            checkout_dir: default_checkout_dir(),
            latest_dir: default_latest_dir(),
            nojekyll: false,
            tag_pattern: None,
        }
    }
}

/// Remote the publishing branch is cloned from and pushed to.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_name")]
    pub name: String,

    /// Clone URL, `{slug}` is replaced by the repository slug.
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// Environment variable holding an optional push token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_remote_name() -> String {
    "origin".to_string()
}

fn default_url_template() -> String {
    "https://github.com/{slug}.git".to_string()
}

fn default_token_env() -> String {
    "GH_TOKEN".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            name: default_remote_name(),
            url_template: default_url_template(),
            token_env: default_token_env(),
        }
    }
}

impl RemoteConfig {
    /// Expands the URL template for a repository slug.
    pub fn url_for(&self, slug: &str) -> String {
        self.url_template.replace("{slug}", slug)
    }
}

/// A single external command of the documentation build.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CommandStep {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandStep {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        CommandStep {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl std::fmt::Display for CommandStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Documentation generator invocation and output handling.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Directory, relative to the build directory, the steps run in.
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Rendered HTML tree, relative to the build directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Glob patterns, relative to the output tree, removed before publishing.
    #[serde(default = "default_cleanup")]
    pub cleanup: Vec<String>,

    #[serde(default = "default_steps")]
    pub steps: Vec<CommandStep>,
}

fn default_working_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build/doc/html")
}

fn default_steps() -> Vec<CommandStep> {
    vec![
        CommandStep::new("cmake", ["-DBUILD_DOCUMENTATION=ON", ".."]),
        CommandStep::new("make", ["doc_html"]),
    ]
}

/// Vendored bundles the Sphinx bootstrap theme copies into `_static`.
fn default_cleanup() -> Vec<String> {
    vec![
        "_static/bootswatch-*".to_string(),
        "_static/bootstrap-2*".to_string(),
        "_static/bootstrap-3*".to_string(),
    ]
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            working_dir: default_working_dir(),
            output_dir: default_output_dir(),
            cleanup: default_cleanup(),
            steps: default_steps(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_branch: default_branch(),
            pages: PagesConfig::default(),
            remote: RemoteConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl Config {
    /// Parses and validates a configuration document.
    pub fn from_toml(data: &str) -> Result<Self> {
        let config: Config = toml::from_str(data)
            .map_err(|e| PublishError::config(format!("Cannot parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| PublishError::config(format!("Cannot render configuration: {}", e)))
    }

    /// Checks invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.default_branch.trim().is_empty() {
            return Err(PublishError::config("default_branch must not be empty"));
        }
        if self.pages.branch.trim().is_empty() {
            return Err(PublishError::config("pages.branch must not be empty"));
        }
        if !is_plain_dir_name(&self.pages.latest_dir) {
            return Err(PublishError::config(format!(
                "pages.latest_dir '{}' must be a single directory name",
                self.pages.latest_dir
            )));
        }
        if !is_relative_inside(&self.pages.checkout_dir) {
            return Err(PublishError::config(format!(
                "pages.checkout_dir '{}' must be a relative path inside the build directory",
                self.pages.checkout_dir.display()
            )));
        }
        if let Some(pattern) = &self.pages.tag_pattern {
            regex::Regex::new(pattern).map_err(|e| {
                PublishError::config(format!("pages.tag_pattern '{}' is invalid: {}", pattern, e))
            })?;
        }
        if self.remote.name.trim().is_empty() {
            return Err(PublishError::config("remote.name must not be empty"));
        }
        if let Some(index) = self
            .generator
            .steps
            .iter()
            .position(|step| step.program.trim().is_empty())
        {
            return Err(PublishError::config(format!(
                "generator.steps[{}] has an empty program",
                index
            )));
        }
        for pattern in &self.generator.cleanup {
            glob::Pattern::new(pattern).map_err(|e| {
                PublishError::config(format!(
                    "generator.cleanup pattern '{}' is invalid: {}",
                    pattern, e
                ))
            })?;
        }

        Ok(())
    }
}

/// True when `name` can be used as exactly one directory component.
pub fn is_plain_dir_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

fn is_relative_inside(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `docpublish.toml` in current directory
/// 3. `docpublish.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);

    let path = if let Some(path) = config_path {
        path.to_path_buf()
    } else if local.exists() {
        local
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_path = config_dir.join(CONFIG_FILE_NAME);
        if user_path.exists() {
            user_path
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    tracing::debug!("loading configuration from {}", path.display());
    let config_str = fs::read_to_string(&path).map_err(|e| {
        PublishError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;

    Config::from_toml(&config_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_url_for_slug() {
        let remote = RemoteConfig::default();
        assert_eq!(
            remote.url_for("chemfiles/chemfiles.py"),
            "https://github.com/chemfiles/chemfiles.py.git"
        );
    }

    #[test]
    fn test_command_step_display() {
        let step = CommandStep::new("make", ["doc_html", "-j2"]);
        assert_eq!(step.to_string(), "make doc_html -j2");
    }

    #[test]
    fn test_latest_dir_must_be_single_component() {
        let mut config = Config::default();
        config.pages.latest_dir = "docs/latest".to_string();
        assert!(config.validate().is_err());

        config.pages.latest_dir = "..".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_checkout_dir_must_stay_inside_build_dir() {
        let mut config = Config::default();
        config.pages.checkout_dir = PathBuf::from("../gh-pages");
        assert!(config.validate().is_err());

        config.pages.checkout_dir = PathBuf::from("/tmp/gh-pages");
        assert!(config.validate().is_err());

        config.pages.checkout_dir = PathBuf::from("out/gh-pages");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_tag_pattern_rejected() {
        let err = Config::from_toml("[pages]\ntag_pattern = \"v(\"\n").unwrap_err();
        assert!(err.to_string().contains("tag_pattern"));
    }

    #[test]
    fn test_empty_program_rejected() {
        let data = r#"
[[generator.steps]]
program = ""
"#;
        let err = Config::from_toml(data).unwrap_err();
        assert!(err.to_string().contains("generator.steps[0]"));
    }

    #[test]
    fn test_invalid_cleanup_glob_rejected() {
        let data = r#"
[generator]
cleanup = ["_static/[bootstrap"]
"#;
        assert!(Config::from_toml(data).is_err());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = Config::default();
        config.pages.tag_pattern = Some(r"^v\d+".to_string());
        let rendered = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&rendered).unwrap(), config);
    }
}
