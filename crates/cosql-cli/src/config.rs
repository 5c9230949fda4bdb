use std::fmt;
use std::num::NonZeroU32;

use cosql_core::QuerySettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    Direct,
    Gateway,
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionMode::Direct => f.write_str("Direct"),
            ConnectionMode::Gateway => f.write_str("Gateway"),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub endpoint: String,
    pub key: String,
    pub database: String,
    pub container: String,
    pub mode: ConnectionMode,
    pub page_size: NonZeroU32,
    pub metrics: bool,
}

impl Config {
    pub fn query_settings(&self) -> QuerySettings {
        QuerySettings {
            page_size: self.page_size,
            metrics: self.metrics,
        }
    }
}

// The account key never reaches logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("key", &"<redacted>")
            .field("database", &self.database)
            .field("container", &self.container)
            .field("mode", &self.mode)
            .field("page_size", &self.page_size)
            .field("metrics", &self.metrics)
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn sample() -> Config {
    Config {
        endpoint: "https://acct.documents.azure.com:443/".into(),
        key: "c2VjcmV0LWtleQ==".into(),
        database: "shop".into(),
        container: "orders".into(),
        mode: ConnectionMode::Gateway,
        page_size: cosql_core::paging::DEFAULT_PAGE_SIZE,
        metrics: false,
    }
}
