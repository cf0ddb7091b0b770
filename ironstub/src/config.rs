//! Client configuration

use serde::{Deserialize, Serialize};

/// Options accepted by [`create_client`](crate::create_client).
///
/// `project_id`, `token` and `host` mirror the hosted client's options and are
/// only kept for inspection; nothing here talks to a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    /// Release timeout for queues created without an explicit one
    #[serde(default = "default_release_timeout_ms")]
    pub release_timeout_ms: u64,

    /// Value reported in each message's `timeout` field
    #[serde(default = "default_message_timeout_secs")]
    pub message_timeout_secs: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            project_id: None,
            token: None,
            host: default_host(),
            release_timeout_ms: default_release_timeout_ms(),
            message_timeout_secs: default_message_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "mq-aws-us-east-1.iron.io".to_string()
}

fn default_release_timeout_ms() -> u64 {
    ironstub_mq::queue::DEFAULT_RELEASE_TIMEOUT_MS
}

fn default_message_timeout_secs() -> u64 {
    ironstub_mq::message::DEFAULT_MESSAGE_TIMEOUT_SECS
}

impl ClientOptions {
    /// Load options from an optional `ironstub` config file and `IRONSTUB_*`
    /// environment variables
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("ironstub").required(false))
            .add_source(config::Environment::with_prefix("IRONSTUB"))
            .build()?;

        Ok(config.try_deserialize::<ClientOptions>()?)
    }

    /// Parse options from a TOML document
    pub fn from_toml(source: &str) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize::<ClientOptions>()?)
    }
}
