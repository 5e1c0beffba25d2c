use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::{DecodePolicy, Operation, Params};

pub const DEFAULT_BASE_URL: &str = "http://io.nowdb.net/operation";

/// Connection parameters for one client: credentials, active collection and
/// transport settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub token: String,
    pub project: String,
    pub app_id: String,
    #[serde(default)]
    pub collection: Option<String>,

    /// Fail on any non-JSON body instead of returning it as text
    #[serde(default)]
    pub strict_json_only: bool,

    /// Whole-request timeout; transport default when unset
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ClientConfig {
    pub fn new(
        token: impl Into<String>,
        project: impl Into<String>,
        app_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: default_base_url(),
            token: token.into(),
            project: project.into(),
            app_id: app_id.into(),
            collection: None,
            strict_json_only: false,
            timeout_ms: None,
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_strict_json_only(mut self, strict: bool) -> Self {
        self.strict_json_only = strict;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn decode_policy(&self) -> DecodePolicy {
        if self.strict_json_only {
            DecodePolicy::Strict
        } else {
            DecodePolicy::Lenient
        }
    }

    /// URL an operation is POSTed to
    pub fn endpoint(&self, operation: Operation) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), operation)
    }

    /// Stored fields sent with every request. An unset collection is left out
    /// of the form rather than sent empty.
    pub fn credentials(&self) -> Params {
        let mut params = Params::new()
            .with("token", &self.token)
            .with("project", &self.project)
            .with("appid", &self.app_id);
        if let Some(collection) = &self.collection {
            params.insert("collection", collection);
        }
        params
    }
}
