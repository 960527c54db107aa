//! Catalog fixtures for tests.
//!
//! A deliberately small catalog, disjoint from the built-in set, for tests
//! that need to prove behaviour is driven by the catalog rather than by
//! anything baked into the engine.

use parlance_core::{Catalog, FunctionSignature, ParamType, Registry, Rule, Transform};

/// Two functions, three rules. `page_oncall` has two phrasings so
/// first-match-wins is observable; `format_desk` carries a transform.
pub fn sample_catalog() -> Catalog {
    let registry = Registry::new(vec![
        FunctionSignature::new("page_oncall")
            .param("team", ParamType::Str)
            .param("severity", ParamType::Int),
        FunctionSignature::new("format_desk").param_with(
            "desk",
            ParamType::Str,
            Transform::Label {
                prefix: "Desk".to_string(),
            },
        ),
    ])
    .expect("fixture registry is valid");

    let rules = vec![
        Rule::new(r"page\s+the\s+(\w+)\s+team\s+at\s+sev\s+(\d)", "page_oncall")
            .bind(1, "team")
            .bind(2, "severity"),
        Rule::new(r"wake\s+up\s+(\w+)\s+sev\s+(\d)", "page_oncall")
            .bind(1, "team")
            .bind(2, "severity"),
        Rule::new(r"label\s+desk\s+(\w+)", "format_desk").bind(1, "desk"),
    ];

    Catalog::new(registry, rules).expect("fixture catalog is valid")
}
