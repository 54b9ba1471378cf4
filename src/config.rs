//! Per-deployment configuration.
//!
//! WebAdvisor is deployed by many institutions with the same engine but
//! different entry URLs, menu labels and certificate hygiene. Each deployment
//! gets a table in `webadvisor.toml`:
//!
//! ```toml
//! [deployments."oasis.oglethorpe.edu"]
//! url = "https://oasis.oglethorpe.edu"
//! to_section = ["for Students", "Search for Sections"]
//! verify = true
//! ```

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "webadvisor.toml";

/// Environment variables that may override top-level settings.
const ENV_PREFIX: &str = "WEBADVISOR_";
const ENV_KEYS: [&str; 3] = ["log_level", "timeout", "default_deployment"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Per-request timeout, e.g. `6s` or `1500ms`. Bare integers are seconds.
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    /// Deployment used when none is named, or the named one is unknown.
    #[serde(default = "default_deployment")]
    pub default_deployment: String,
    #[serde(default)]
    pub deployments: BTreeMap<String, Deployment>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Deployment {
    pub url: String,
    /// Link labels to follow from the home page to the section search form.
    #[serde(default)]
    pub to_section: Vec<String>,
    /// Link labels to follow after login to reach the term selection page.
    #[serde(default = "default_to_schedule")]
    pub to_schedule: Vec<String>,
    #[serde(default = "default_verify")]
    pub verify: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(6)
}

fn default_deployment() -> String {
    "oasis.oglethorpe.edu".to_string()
}

fn default_to_schedule() -> Vec<String> {
    vec!["for Students".to_string(), "My class".to_string()]
}

fn default_verify() -> bool {
    true
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => fundu::parse_duration(text.trim()).map_err(serde::de::Error::custom),
    }
}

impl Config {
    /// Load from `path` (or `webadvisor.toml`) with `WEBADVISOR_*` overrides.
    ///
    /// A missing file is not an error; the deployment lookup will report it.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        Self::figment(path)
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).only(&ENV_KEYS))
    }

    /// Look up a deployment, falling back to the default one.
    pub fn deployment(&self, name: Option<&str>) -> anyhow::Result<(&str, &Deployment)> {
        if let Some(name) = name {
            if let Some((key, deployment)) = self.deployments.get_key_value(name) {
                return Ok((key.as_str(), deployment));
            }
            tracing::warn!(
                requested = name,
                fallback = self.default_deployment.as_str(),
                "Unknown deployment, using default"
            );
        }

        self.deployments
            .get_key_value(self.default_deployment.as_str())
            .map(|(key, deployment)| (key.as_str(), deployment))
            .with_context(|| {
                format!(
                    "No configuration for deployment '{}'",
                    self.default_deployment
                )
            })
    }
}
