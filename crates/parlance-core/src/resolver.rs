//! Query resolution: matching, coercion, and descriptor assembly.
//!
//! [`Resolver::resolve`] is a pure function of the input string and the
//! immutable catalog: it normalizes the input, scans the rule table in
//! declaration order, and on the first match assembles a
//! [`CallDescriptor`] with arguments in the signature's canonical order.
//! No rule matching is an [`unrecognized input`](ResolveError::Unrecognized)
//! failure; it is never a panic and never a partial descriptor.

use serde::Serialize;
use serde::ser::SerializeMap;
use tracing::debug;

use crate::catalog::Catalog;
use crate::signature::{ParamSpec, ParamType};

/// A typed argument value.
///
/// Serializes untagged: integers as JSON numbers, text as JSON strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// Successfully coerced integer.
    Int(i64),
    /// Text, either by declaration or as the coercion fallback.
    Text(String),
}

/// Ordered `(parameter name, value)` pairs.
///
/// Serializes as a JSON object whose keys appear exactly in signature
/// order — consumers rely on this, so serialization walks the pairs
/// rather than going through a hash map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArguments(Vec<(String, ArgValue)>);

impl CallArguments {
    /// The pairs in signature order.
    pub fn pairs(&self) -> &[(String, ArgValue)] {
        &self.0
    }

    /// Serialize the pairs as a JSON object string, preserving order.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for CallArguments {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// The resolved output: a function name plus ordered, typed arguments.
///
/// Constructed fresh per successful resolution; ownership passes to the
/// transport for serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallDescriptor {
    /// The matched function's name.
    pub name: String,
    /// Arguments in the signature's canonical parameter order.
    pub arguments: CallArguments,
}

/// A classified resolution failure.
///
/// Deliberately disjoint from [`CatalogError`](crate::CatalogError):
/// configuration defects are fatal at startup and can never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("unrecognized question: no rule matched the input")]
    Unrecognized,
}

impl ResolveError {
    /// Stable failure kind for the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::Unrecognized => "unrecognized_input",
        }
    }
}

/// Resolves natural-language queries against an immutable [`Catalog`].
///
/// Holds no per-request state; a single resolver may serve any number of
/// concurrent resolutions without locking.
pub struct Resolver {
    catalog: Catalog,
}

impl Resolver {
    /// Create a resolver over a validated catalog.
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// The catalog this resolver consults.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolve one query to a call descriptor, first match wins.
    pub fn resolve(&self, input: &str) -> Result<CallDescriptor, ResolveError> {
        // Lowercasing leaves digits and ASCII identifiers intact, so
        // extraction works against the normalized string and patterns are
        // written lowercase
        let normalized = input.trim().to_lowercase();

        for rule in self.catalog.rules().iter() {
            let Some(captures) = rule.regex.captures(&normalized) else {
                continue;
            };

            let signature = self.catalog.registry().by_index(rule.function);
            let mut arguments = Vec::with_capacity(signature.params().len());
            for (param, &group) in signature.params().iter().zip(&rule.groups) {
                // A non-participating optional group extracts as empty text
                let raw = captures.get(group).map(|m| m.as_str()).unwrap_or_default();
                arguments.push((param.name.clone(), extract(param, raw)));
            }

            debug!(function = signature.name(), "query resolved");
            return Ok(CallDescriptor {
                name: signature.name().to_string(),
                arguments: CallArguments(arguments),
            });
        }

        debug!("no rule matched");
        Err(ResolveError::Unrecognized)
    }
}

/// Extract one parameter value from its captured text: declared transforms
/// apply to string parameters, everything else goes through [`coerce`].
fn extract(param: &ParamSpec, raw: &str) -> ArgValue {
    if let (ParamType::Str, Some(transform)) = (param.ty, &param.transform) {
        return ArgValue::Text(transform.apply(raw));
    }
    coerce(raw, param.ty)
}

/// Best-effort coercion of captured text into the declared type.
///
/// Never fails outward: an integer that does not parse falls back to the
/// raw text and resolution still succeeds.
fn coerce(raw: &str, ty: ParamType) -> ArgValue {
    match ty {
        ParamType::Int => raw
            .parse::<i64>()
            .map(ArgValue::Int)
            .unwrap_or_else(|_| ArgValue::Text(raw.to_string())),
        ParamType::Str => ArgValue::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::rule::Rule;
    use crate::signature::{FunctionSignature, Registry, Transform};
    use pretty_assertions::assert_eq;

    fn resolver() -> Resolver {
        let registry = Registry::new(vec![
            FunctionSignature::new("get_ticket_status").param("ticket_id", ParamType::Int),
            FunctionSignature::new("get_employee_bonus")
                .param("emp_id", ParamType::Int)
                .param("year", ParamType::Int),
            FunctionSignature::new("schedule_meeting")
                .param("date", ParamType::Str)
                .param("time", ParamType::Str)
                .param_with(
                    "meeting_room",
                    ParamType::Str,
                    Transform::Label {
                        prefix: "Room".to_string(),
                    },
                ),
        ])
        .unwrap();

        let rules = vec![
            Rule::new(r"what\s+is\s+the\s+status\s+of\s+ticket\s+(\d+)", "get_ticket_status")
                .bind(1, "ticket_id"),
            // Bindings deliberately declared in reverse of signature order
            Rule::new(r"what\s+bonus\s+for\s+emp\s+(\d+)\s+in\s+(\d{4})", "get_employee_bonus")
                .bind(2, "year")
                .bind(1, "emp_id"),
            Rule::new(
                r"schedule\s+a\s+meeting\s+on\s+(\d{4}-\d{2}-\d{2})\s+at\s+(\d{2}:\d{2})\s+in\s+room\s+(\w+)",
                "schedule_meeting",
            )
            .bind(1, "date")
            .bind(2, "time")
            .bind(3, "meeting_room"),
        ];

        Resolver::new(Catalog::new(registry, rules).unwrap())
    }

    #[test]
    fn test_resolves_integer_argument() {
        let descriptor = resolver()
            .resolve("What is the status of ticket 83742?")
            .unwrap();

        assert_eq!(descriptor.name, "get_ticket_status");
        assert_eq!(
            descriptor.arguments.pairs(),
            &[("ticket_id".to_string(), ArgValue::Int(83742))]
        );
    }

    #[test]
    fn test_argument_order_follows_signature_not_bindings() {
        let descriptor = resolver()
            .resolve("what bonus for emp 27756 in 2025?")
            .unwrap();

        assert_eq!(descriptor.name, "get_employee_bonus");
        assert_eq!(
            descriptor.arguments.pairs(),
            &[
                ("emp_id".to_string(), ArgValue::Int(27756)),
                ("year".to_string(), ArgValue::Int(2025)),
            ]
        );
    }

    #[test]
    fn test_transform_derives_display_label() {
        let descriptor = resolver()
            .resolve("schedule a meeting on 2025-01-01 at 14:30 in room b")
            .unwrap();

        assert_eq!(
            descriptor.arguments.pairs(),
            &[
                ("date".to_string(), ArgValue::Text("2025-01-01".to_string())),
                ("time".to_string(), ArgValue::Text("14:30".to_string())),
                ("meeting_room".to_string(), ArgValue::Text("Room B".to_string())),
            ]
        );
    }

    #[test]
    fn test_case_and_whitespace_normalization() {
        let descriptor = resolver()
            .resolve("  WHAT IS THE STATUS OF TICKET 5?  ")
            .unwrap();

        assert_eq!(
            descriptor.arguments.pairs(),
            &[("ticket_id".to_string(), ArgValue::Int(5))]
        );
    }

    #[test]
    fn test_unrecognized_input() {
        let err = resolver().resolve("banana").unwrap_err();
        assert!(matches!(err, ResolveError::Unrecognized));
        assert_eq!(err.kind(), "unrecognized_input");
    }

    #[test]
    fn test_idempotent_resolution() {
        let resolver = resolver();
        let first = resolver.resolve("what bonus for emp 1 in 2024").unwrap();
        let second = resolver.resolve("what bonus for emp 1 in 2024").unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first.arguments.to_json().unwrap(),
            second.arguments.to_json().unwrap()
        );
    }

    #[test]
    fn test_arguments_serialize_in_order() {
        let descriptor = resolver()
            .resolve("what bonus for emp 27756 in 2025?")
            .unwrap();

        assert_eq!(
            descriptor.arguments.to_json().unwrap(),
            r#"{"emp_id":27756,"year":2025}"#
        );
    }

    #[test]
    fn test_coercion_fallback_keeps_raw_text() {
        assert_eq!(coerce("oops", ParamType::Int), ArgValue::Text("oops".to_string()));
        assert_eq!(coerce("42", ParamType::Int), ArgValue::Int(42));
        assert_eq!(coerce("42", ParamType::Str), ArgValue::Text("42".to_string()));
    }

    #[test]
    fn test_coercion_fallback_still_resolves() {
        // A capture loose enough to admit non-digits must not fail the
        // match; the raw text rides along instead of an integer
        let registry = Registry::new(vec![
            FunctionSignature::new("get_order_total").param("order_id", ParamType::Int),
        ])
        .unwrap();
        let rules = vec![
            Rule::new(r"total\s+for\s+order\s+(\w+)", "get_order_total").bind(1, "order_id"),
        ];
        let resolver = Resolver::new(Catalog::new(registry, rules).unwrap());

        let descriptor = resolver.resolve("total for order abc123").unwrap();
        assert_eq!(
            descriptor.arguments.pairs(),
            &[("order_id".to_string(), ArgValue::Text("abc123".to_string()))]
        );
        assert_eq!(
            descriptor.arguments.to_json().unwrap(),
            r#"{"order_id":"abc123"}"#
        );
    }

    #[test]
    fn test_first_match_wins() {
        let registry = Registry::new(vec![
            FunctionSignature::new("first").param("value", ParamType::Int),
            FunctionSignature::new("second").param("value", ParamType::Int),
        ])
        .unwrap();
        let rules = vec![
            Rule::new(r"check\s+(\d+)", "first").bind(1, "value"),
            Rule::new(r"check\s+(\d+)", "second").bind(1, "value"),
        ];
        let resolver = Resolver::new(Catalog::new(registry, rules).unwrap());

        let descriptor = resolver.resolve("check 7").unwrap();
        assert_eq!(descriptor.name, "first");
    }
}
