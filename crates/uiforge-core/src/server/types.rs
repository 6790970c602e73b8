//! Request/response types for the HTTP API.
//!
//! Generation payloads use camelCase field names; the health check keeps
//! snake_case.

use serde::{Deserialize, Serialize};

use crate::catalog::ComponentMetadata;
use crate::cost::TokenUsage;

/// Body of `POST /api/generate-code`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateCodeRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// Successful generation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeResponse {
    /// Extracted source, empty when the answer had no matching fence.
    pub code: String,
    pub token_usage: TokenUsage,
    /// Full catalog listing, independent of the model's selection.
    pub available_components: Vec<String>,
    pub success: bool,
}

/// Error body returned with every non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error chain, only in development.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub git_hash: String,
    pub build_profile: String,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub name: String,
    pub title: String,
    pub description: String,
}

impl ComponentInfo {
    pub fn new(name: String, metadata: ComponentMetadata) -> Self {
        Self {
            name,
            title: metadata.title,
            description: metadata.description,
        }
    }
}

/// Catalog listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentsResponse {
    pub components: Vec<ComponentInfo>,
}
