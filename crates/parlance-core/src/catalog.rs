//! The catalog: a validated [`Registry`] plus a compiled [`RuleTable`].
//!
//! A catalog is built exactly once at startup — from the built-in set or
//! from TOML declarations — and is immutable afterwards. Every defect in
//! the declarations is a [`CatalogError`] that halts initialization; none
//! of them can surface during resolution.

use parlance_config::catalog::{CatalogConfig, FunctionDecl, RuleDecl, TransformDecl, TypeDecl};

use crate::rule::{Rule, RuleTable};
use crate::signature::{FunctionSignature, ParamType, Registry, Transform};

/// A configuration defect in the declared functions or rules.
///
/// Always fatal to initialization and never returned per-request — the
/// transport maps it to the `configuration_error` failure class, distinct
/// from `unrecognized_input`.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate function declaration: {0}")]
    DuplicateFunction(String),

    #[error("duplicate parameter '{param}' in function '{function}'")]
    DuplicateParameter { function: String, param: String },

    #[error("rule {rule} targets unknown function '{function}'")]
    UnknownFunction { rule: usize, function: String },

    #[error("rule {rule} binds parameter '{param}' not declared by function '{function}'")]
    UnknownParameter {
        rule: usize,
        function: String,
        param: String,
    },

    #[error("rule {rule} leaves parameter '{param}' of function '{function}' unbound")]
    UnboundParameter {
        rule: usize,
        function: String,
        param: String,
    },

    #[error("rule {rule} binds parameter '{param}' of function '{function}' more than once")]
    DuplicateBinding {
        rule: usize,
        function: String,
        param: String,
    },

    #[error("rule {rule} references capture group {group}, but the pattern has {available}")]
    MissingCaptureGroup {
        rule: usize,
        group: usize,
        available: usize,
    },

    #[error("invalid pattern in rule {rule}: {source}")]
    Pattern {
        rule: usize,
        #[source]
        source: regex::Error,
    },
}

/// The immutable pair of tables the resolver consults.
#[derive(Debug)]
pub struct Catalog {
    registry: Registry,
    rules: RuleTable,
}

impl Catalog {
    /// Build a catalog from signatures and rules, validating both.
    pub fn new(registry: Registry, rules: Vec<Rule>) -> Result<Self, CatalogError> {
        let rules = RuleTable::compile(rules, &registry)?;
        Ok(Self { registry, rules })
    }

    /// The built-in function and rule set.
    ///
    /// Both bonus phrasings are kept as independent rules: their literal
    /// anchor text differs, so neither shadows the other.
    pub fn builtin() -> Result<Self, CatalogError> {
        let registry = Registry::new(vec![
            FunctionSignature::new("get_ticket_status").param("ticket_id", ParamType::Int),
            FunctionSignature::new("get_user_details").param("username", ParamType::Str),
            FunctionSignature::new("get_order_total").param("order_id", ParamType::Int),
            FunctionSignature::new("get_product_price").param("product_name", ParamType::Str),
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
            FunctionSignature::new("get_expense_balance").param("employee_id", ParamType::Int),
            FunctionSignature::new("calculate_performance_bonus")
                .param("employee_id", ParamType::Int)
                .param("current_year", ParamType::Int),
            FunctionSignature::new("report_office_issue")
                .param("issue_code", ParamType::Int)
                .param("department", ParamType::Str),
        ])?;

        let rules = vec![
            Rule::new(
                r"what\s+is\s+the\s+status\s+of\s+ticket\s+(\d+)",
                "get_ticket_status",
            )
            .bind(1, "ticket_id"),
            Rule::new(r"show\s+details\s+for\s+user\s+(\w+)", "get_user_details")
                .bind(1, "username"),
            Rule::new(
                r"what\s+is\s+the\s+total\s+for\s+order\s+(\d+)",
                "get_order_total",
            )
            .bind(1, "order_id"),
            Rule::new(
                r"what\s+is\s+the\s+price\s+of\s+product\s+(\w+)",
                "get_product_price",
            )
            .bind(1, "product_name"),
            Rule::new(
                r"schedule\s+a\s+meeting\s+on\s+(\d{4}-\d{2}-\d{2})\s+at\s+(\d{2}:\d{2})\s+in\s+room\s+(\w+)",
                "schedule_meeting",
            )
            .bind(1, "date")
            .bind(2, "time")
            .bind(3, "meeting_room"),
            Rule::new(
                r"show\s+my\s+expense\s+balance\s+for\s+employee\s+(\d+)",
                "get_expense_balance",
            )
            .bind(1, "employee_id"),
            Rule::new(
                r"calculate\s+performance\s+bonus\s+for\s+employee\s+(\d+)\s+for\s+(\d{4})",
                "calculate_performance_bonus",
            )
            .bind(1, "employee_id")
            .bind(2, "current_year"),
            Rule::new(
                r"what\s+bonus\s+for\s+emp\s+(\d+)\s+in\s+(\d{4})",
                "get_employee_bonus",
            )
            .bind(1, "emp_id")
            .bind(2, "year"),
            Rule::new(
                r"report\s+office\s+issue\s+(\d+)\s+for\s+the\s+(\w+)\s+department",
                "report_office_issue",
            )
            .bind(1, "issue_code")
            .bind(2, "department"),
        ];

        Self::new(registry, rules)
    }

    /// Build a catalog from TOML declarations, falling back to the
    /// built-in set when the config declares nothing.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.functions.is_empty() && config.rules.is_empty() {
            return Self::builtin();
        }

        let functions = config.functions.iter().map(signature_from_decl).collect();
        let registry = Registry::new(functions)?;
        let rules = config.rules.iter().map(rule_from_decl).collect();
        Self::new(registry, rules)
    }

    /// The function registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The compiled rule table.
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// `(pattern, target function)` pairs in evaluation order, for
    /// introspection endpoints.
    pub fn rule_summaries(&self) -> Vec<(&str, &str)> {
        self.rules
            .iter()
            .map(|rule| {
                (
                    rule.pattern.as_str(),
                    self.registry.by_index(rule.function).name(),
                )
            })
            .collect()
    }
}

fn signature_from_decl(decl: &FunctionDecl) -> FunctionSignature {
    let mut signature = FunctionSignature::new(&decl.name);
    for param in &decl.params {
        let ty = match param.ty {
            TypeDecl::Int => ParamType::Int,
            TypeDecl::Str => ParamType::Str,
        };
        signature = match &param.transform {
            Some(TransformDecl::Uppercase) => {
                signature.param_with(&param.name, ty, Transform::Uppercase)
            }
            Some(TransformDecl::Label { prefix }) => signature.param_with(
                &param.name,
                ty,
                Transform::Label {
                    prefix: prefix.clone(),
                },
            ),
            None => signature.param(&param.name, ty),
        };
    }
    signature
}

fn rule_from_decl(decl: &RuleDecl) -> Rule {
    let mut rule = Rule::new(&decl.pattern, &decl.function);
    for binding in &decl.bindings {
        rule = rule.bind(binding.group, &binding.param);
    }
    rule
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlance_config::catalog::{BindingDecl, ParamDecl};

    #[test]
    fn test_builtin_catalog_compiles() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.registry().len(), 9);
        assert_eq!(catalog.rules().len(), 9);
    }

    #[test]
    fn test_empty_config_falls_back_to_builtin() {
        let catalog = Catalog::from_config(&CatalogConfig::default()).unwrap();
        assert!(catalog.registry().lookup("get_ticket_status").is_some());
    }

    #[test]
    fn test_config_catalog_replaces_builtin() {
        let config = CatalogConfig {
            functions: vec![FunctionDecl {
                name: "lookup_badge".to_string(),
                params: vec![ParamDecl {
                    name: "badge_id".to_string(),
                    ty: TypeDecl::Int,
                    transform: None,
                }],
            }],
            rules: vec![RuleDecl {
                pattern: r"where\s+is\s+badge\s+(\d+)".to_string(),
                function: "lookup_badge".to_string(),
                bindings: vec![BindingDecl {
                    group: 1,
                    param: "badge_id".to_string(),
                }],
            }],
        };

        let catalog = Catalog::from_config(&config).unwrap();
        assert_eq!(catalog.registry().len(), 1);
        assert!(catalog.registry().lookup("get_ticket_status").is_none());
        assert_eq!(catalog.rule_summaries()[0].1, "lookup_badge");
    }

    #[test]
    fn test_config_catalog_transform_declarations() {
        let config = CatalogConfig {
            functions: vec![FunctionDecl {
                name: "book_room".to_string(),
                params: vec![ParamDecl {
                    name: "room".to_string(),
                    ty: TypeDecl::Str,
                    transform: Some(TransformDecl::Label {
                        prefix: "Room".to_string(),
                    }),
                }],
            }],
            rules: vec![RuleDecl {
                pattern: r"book\s+room\s+(\w+)".to_string(),
                function: "book_room".to_string(),
                bindings: vec![BindingDecl {
                    group: 1,
                    param: "room".to_string(),
                }],
            }],
        };

        let catalog = Catalog::from_config(&config).unwrap();
        let signature = catalog.registry().lookup("book_room").unwrap();
        assert_eq!(
            signature.params()[0].transform,
            Some(Transform::Label {
                prefix: "Room".to_string()
            })
        );
    }

    #[test]
    fn test_config_catalog_defect_is_fatal() {
        let config = CatalogConfig {
            functions: vec![],
            rules: vec![RuleDecl {
                pattern: r"ping\s+(\d+)".to_string(),
                function: "missing".to_string(),
                bindings: vec![BindingDecl {
                    group: 1,
                    param: "x".to_string(),
                }],
            }],
        };

        let err = Catalog::from_config(&config).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownFunction { .. }));
    }

    #[test]
    fn test_rule_summaries_in_declaration_order() {
        let catalog = Catalog::builtin().unwrap();
        let summaries = catalog.rule_summaries();
        assert_eq!(summaries[0].1, "get_ticket_status");
        assert_eq!(summaries[summaries.len() - 1].1, "report_office_issue");
    }
}
