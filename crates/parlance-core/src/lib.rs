#![deny(unsafe_code)]

//! Parlance core — the pattern-to-call resolution engine.
//!
//! Converts a free-text natural-language question into a canonical function
//! invocation: a function name plus an ordered, typed argument set. The
//! engine is a linear pipeline over two immutable tables — the
//! [`Registry`](signature::Registry) of function signatures and the compiled
//! [`RuleTable`](rule::RuleTable) of recognition rules — driven by the
//! [`Resolver`](resolver::Resolver). Everything else in this crate is
//! transport plumbing around that engine.

/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// The catalog: a validated registry plus compiled rule table.
pub mod catalog;
/// HTTP transport — axum server, reqwest client, and wire types.
pub mod http;
/// Query resolution: matching, coercion, and descriptor assembly.
pub mod resolver;
/// Recognition rules and the compiled, ordered rule table.
pub mod rule;
/// Function signatures and the registry of callable targets.
pub mod signature;

pub use catalog::{Catalog, CatalogError};
pub use resolver::{ArgValue, CallArguments, CallDescriptor, ResolveError, Resolver};
pub use rule::{Rule, RuleTable};
pub use signature::{FunctionSignature, ParamSpec, ParamType, Registry, Transform};
