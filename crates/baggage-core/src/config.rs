use crate::errors::{BaggageError, Result};
use crate::inject::DEFAULT_BANNER;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Options that shape every injected statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderOptions {
    /// Prepended verbatim to every injected module path (default: "")
    #[serde(default)]
    pub require_prefix: String,

    /// Comment placed above the injected statements
    #[serde(default = "default_banner")]
    pub banner: String,

    /// Report results as cacheable to the host (default: true)
    #[serde(default = "default_true")]
    pub cacheable: bool,

    /// Pretty-print diagnostics (default: true)
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_true() -> bool {
    true
}

fn default_banner() -> String {
    DEFAULT_BANNER.to_string()
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            require_prefix: String::new(),
            banner: default_banner(),
            cacheable: true,
            pretty: true,
        }
    }
}

/// Contents of `baggage.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaggageConfig {
    #[serde(default)]
    pub loader_options: LoaderOptions,

    /// Default query string, used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Default directives, used when no query is given at all
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub directives: IndexMap<String, Value>,
}

/// Values supplied on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub require_prefix: Option<String>,
    pub banner: Option<String>,
    pub query: Option<String>,
    pub pretty: Option<bool>,
}

pub const CONFIG_FILE_NAME: &str = "baggage.yaml";

pub const CONFIG_TEMPLATE: &str = r#"# Baggage configuration file

loaderOptions:
  requirePrefix: ""      # Prepended to every injected module path
  banner: "/* injects from baggage-loader */"
  cacheable: true

# Directives applied when no --query is given, in order.
# Value syntax: [ignoreFlag]#[addFlag]*[variableName], or true
directives:
  "./[dirname]-helper": "[filename]Helper"
"#;

impl BaggageConfig {
    /// Load configuration from a YAML (or JSON) file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| BaggageError::Config(e.to_string()))
    }

    /// Write the commented default configuration to a file
    pub fn init_file(path: &Path) -> Result<()> {
        std::fs::write(path, CONFIG_TEMPLATE)?;
        Ok(())
    }

    /// Merge CLI overrides into this configuration
    pub fn merge(&mut self, overrides: &CliOverrides) {
        if let Some(ref prefix) = overrides.require_prefix {
            self.loader_options.require_prefix = prefix.clone();
        }
        if let Some(ref banner) = overrides.banner {
            self.loader_options.banner = banner.clone();
        }
        if let Some(ref query) = overrides.query {
            self.query = Some(query.clone());
        }
        if let Some(pretty) = overrides.pretty {
            self.loader_options.pretty = pretty;
        }
    }

    /// The query string to run with: the explicit query if any, otherwise
    /// one built from `directives`.
    pub fn effective_query(&self) -> String {
        if let Some(ref query) = self.query {
            return query.clone();
        }
        if self.directives.is_empty() {
            return String::new();
        }

        let object: serde_json::Map<String, Value> = self
            .directives
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        format!("?{}", Value::Object(object))
    }
}
