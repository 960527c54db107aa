//! Shared request/response types for the HTTP API.
//!
//! These types are serialized as JSON. Both the server and the client
//! (CLI) use these types.

use serde::{Deserialize, Serialize};

/// Query parameters for `GET /execute`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteParams {
    /// The natural-language question.
    pub q: String,
}

/// A successfully resolved call.
///
/// `arguments` is the order-preserving JSON serialization of the
/// parameter/value pairs — a string field, so the pair order survives any
/// consumer-side object handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub name: String,
    pub arguments: String,
}

/// A classified failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// `unrecognized_input` or `configuration_error`.
    pub kind: String,
}

/// Server health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub git_hash: String,
    pub build_profile: String,
}

/// Server runtime status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub version: String,
    pub uptime_secs: u64,
    pub listen_addr: String,
    pub listen_port: u16,
    pub log_level: String,
    pub functions_count: usize,
    pub rules_count: usize,
    pub pid: u32,
}

/// One declared parameter in a function listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// One declared function in a function listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub params: Vec<ParamInfo>,
}

/// Function listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionsResponse {
    pub functions: Vec<FunctionInfo>,
}

/// One recognition rule in a rule listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleInfo {
    pub pattern: String,
    pub function: String,
}

/// Rule listing response, in evaluation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesResponse {
    pub rules: Vec<RuleInfo>,
}

/// Configuration response (serialized TOML).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub toml: String,
}

/// Server shutdown response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopResponse {
    pub acknowledged: bool,
    pub message: String,
}
