use crate::{AuthConstants, DatabaseConstants, QuotaConstants, RawSettings};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConstants {
    pub database: DatabaseConstants,
    pub auth: AuthConstants,
    pub quota: QuotaConstants,
}

impl From<RawSettings> for AppConstants {
    fn from(raw: RawSettings) -> Self {
        Self {
            database: raw.constants.database,
            auth: raw.constants.auth,
            quota: raw.constants.quota,
        }
    }
}
