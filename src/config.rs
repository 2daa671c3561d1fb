use serde::{Deserialize, Serialize};

/// Connection settings for the backing API.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ApiConfig {
    /// Base URL up to and including the API prefix,
    /// e.g. `http://localhost:3000/api/v1`.
    pub base_url: String,
    /// Transport-level request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api/v1".to_string(),
            timeout_secs: 30,
        }
    }
}
