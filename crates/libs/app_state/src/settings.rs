use crate::{ApiSettings, LoggingSettings, RawSettings, SecretSettings};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub logging: LoggingSettings,
    pub api: ApiSettings,
    pub secrets: SecretSettings,
}

impl From<RawSettings> for AppSettings {
    fn from(raw: RawSettings) -> Self {
        Self {
            logging: raw.logging,
            api: raw.api,
            secrets: raw.secrets,
        }
    }
}

impl ApiSettings {
    #[must_use]
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
