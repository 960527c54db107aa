//! Recognition rules and the compiled, ordered rule table.
//!
//! A [`Rule`] binds a text pattern to a target function and maps capture
//! groups to parameter names. [`RuleTable::compile`] validates every rule
//! against the registry up front — a rule that references an unknown
//! function, leaves a parameter unbound, or binds one twice is a
//! configuration defect that fails startup, never a request.
//!
//! Table order is load-bearing: rules are evaluated in declaration order
//! and the first match wins, so a more specific phrasing must be declared
//! before a more general one that would shadow it.

use regex::Regex;

use crate::catalog::CatalogError;
use crate::signature::Registry;

/// A declared recognition rule: a lowercase regex pattern, the target
/// function name, and `(capture group, parameter name)` bindings.
///
/// Patterns are matched against the normalized (trimmed, lowercased)
/// input with substring-search semantics, so they should not anchor to
/// the whole input.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    function: String,
    bindings: Vec<(usize, String)>,
}

impl Rule {
    /// Create a rule for the given pattern and target function.
    pub fn new(pattern: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            function: function.into(),
            bindings: Vec::new(),
        }
    }

    /// Bind a capture group (1-based) to a parameter name.
    ///
    /// Binding declaration order is irrelevant — arguments are always
    /// assembled in the signature's canonical order.
    pub fn bind(mut self, group: usize, param: &str) -> Self {
        self.bindings.push((group, param.to_string()));
        self
    }

    /// The pattern source text.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The target function name.
    pub fn function(&self) -> &str {
        &self.function
    }
}

/// A rule after validation against the registry.
///
/// The target function is resolved to a registry index and the capture
/// group for each parameter is precomputed *in signature order*, so
/// resolution cannot encounter an unknown function or an unbound
/// parameter.
#[derive(Debug)]
pub(crate) struct CompiledRule {
    pub(crate) regex: Regex,
    pub(crate) pattern: String,
    pub(crate) function: usize,
    /// Capture group supplying each parameter, in signature order.
    pub(crate) groups: Vec<usize>,
}

/// The compiled, validated, ordered rule set.
///
/// Deliberately a list, not a keyed map: evaluation order is the match
/// priority and must stay exactly as declared.
#[derive(Debug)]
pub struct RuleTable {
    rules: Vec<CompiledRule>,
}

impl RuleTable {
    /// Compile and validate rules against the registry.
    ///
    /// Fails fast on the first defect; the rule's position in the input
    /// list is reported in the error.
    pub fn compile(rules: Vec<Rule>, registry: &Registry) -> Result<Self, CatalogError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for (i, rule) in rules.into_iter().enumerate() {
            compiled.push(Self::compile_one(i, rule, registry)?);
        }
        Ok(Self { rules: compiled })
    }

    fn compile_one(index: usize, rule: Rule, registry: &Registry) -> Result<CompiledRule, CatalogError> {
        let regex = Regex::new(&rule.pattern).map_err(|source| CatalogError::Pattern {
            rule: index,
            source,
        })?;

        let function = registry
            .index_of(&rule.function)
            .ok_or_else(|| CatalogError::UnknownFunction {
                rule: index,
                function: rule.function.clone(),
            })?;
        let signature = registry.by_index(function);

        // captures_len() counts the implicit whole-match group 0
        let available = regex.captures_len();
        for &(group, ref param) in &rule.bindings {
            if !signature.has_param(param) {
                return Err(CatalogError::UnknownParameter {
                    rule: index,
                    function: rule.function.clone(),
                    param: param.clone(),
                });
            }
            if group == 0 || group >= available {
                return Err(CatalogError::MissingCaptureGroup {
                    rule: index,
                    group,
                    available: available - 1,
                });
            }
        }

        let mut groups = Vec::with_capacity(signature.params().len());
        for param in signature.params() {
            let mut matches = rule.bindings.iter().filter(|(_, name)| *name == param.name);
            let Some(&(group, _)) = matches.next() else {
                return Err(CatalogError::UnboundParameter {
                    rule: index,
                    function: rule.function.clone(),
                    param: param.name.clone(),
                });
            };
            if matches.next().is_some() {
                return Err(CatalogError::DuplicateBinding {
                    rule: index,
                    function: rule.function.clone(),
                    param: param.name.clone(),
                });
            }
            groups.push(group);
        }

        Ok(CompiledRule {
            regex,
            pattern: rule.pattern,
            function,
            groups,
        })
    }

    /// Number of rules in the table.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter()
    }
}
