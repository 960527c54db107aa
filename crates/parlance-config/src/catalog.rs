//! Declarative catalog definitions.
//!
//! Functions and recognition rules can be declared in TOML instead of
//! using the built-in set. Declarations here are plain data — they are
//! compiled into the engine (and fully validated) by `parlance-core` at
//! startup, so a defective declaration halts initialization rather than
//! failing requests.
//!
//! ## TOML Example
//!
//! ```toml
//! [[catalog.functions]]
//! name = "get_ticket_status"
//! params = [{ name = "ticket_id", type = "int" }]
//!
//! [[catalog.functions]]
//! name = "schedule_meeting"
//! params = [
//!     { name = "date" },
//!     { name = "time" },
//!     { name = "meeting_room", transform = { label = { prefix = "Room" } } },
//! ]
//!
//! [[catalog.rules]]
//! pattern = 'what\s+is\s+the\s+status\s+of\s+ticket\s+(\d+)'
//! function = "get_ticket_status"
//! bindings = [{ group = 1, param = "ticket_id" }]
//! ```

use serde::{Deserialize, Serialize};

/// Declarative catalog: functions and rules. Empty means "use built-ins".
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Function signature declarations.
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,

    /// Recognition rule declarations, in evaluation order.
    #[serde(default)]
    pub rules: Vec<RuleDecl>,
}

/// One declared function signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Unique function name.
    pub name: String,

    /// Parameters in canonical order.
    #[serde(default)]
    pub params: Vec<ParamDecl>,
}

/// One declared parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    /// Parameter name, unique within the function.
    pub name: String,

    /// Target value type. Defaults to `str`.
    #[serde(default, rename = "type")]
    pub ty: TypeDecl,

    /// Optional formatting transform for string values.
    #[serde(default)]
    pub transform: Option<TransformDecl>,
}

/// Declared parameter type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeDecl {
    /// Base-10 integer.
    Int,
    /// Free text.
    #[default]
    Str,
}

/// Declared formatting transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformDecl {
    /// Uppercase the captured token.
    Uppercase,
    /// Uppercase the captured token and prepend a fixed label.
    Label { prefix: String },
}

/// One declared recognition rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDecl {
    /// Lowercase regex pattern, matched with substring semantics.
    pub pattern: String,

    /// Target function name.
    pub function: String,

    /// Capture-group-to-parameter bindings.
    #[serde(default)]
    pub bindings: Vec<BindingDecl>,
}

/// One capture binding within a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingDecl {
    /// Capture group index, 1-based.
    pub group: usize,

    /// Parameter supplied by the group.
    pub param: String,
}
