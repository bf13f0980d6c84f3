//! Wire types for the gateway's JSON API.

use serde::{Deserialize, Serialize};

/// Body of `POST /textract`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionRequest {
    /// File extension without the leading dot, e.g. `pdf`.
    pub file_type: String,
    /// Base64-encoded file bytes.
    pub data: String,
    #[serde(default, rename = "withCoords", alias = "with_coords")]
    pub with_coords: bool,
}

/// A recognized word and its bounding box in the OCR engine's pixel space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBox {
    pub text: String,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Body of a successful `POST /textract`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub text: String,
    /// Word boxes; empty unless coordinates were requested.
    pub data: Vec<WordBox>,
}

/// Body of `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
        }
    }
}

/// JSON body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
