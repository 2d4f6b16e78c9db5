use serde::{Deserialize, Serialize};

/// Body of `POST /generate-text`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateTextRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl GenerateTextRequest {
    /// The prompt to send, if one was given. An empty string counts as missing.
    pub fn prompt(self) -> Option<String> {
        self.message.filter(|m| !m.is_empty())
    }
}

/// Success body shared by all generation routes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateResponse {
    pub output: String,
}
