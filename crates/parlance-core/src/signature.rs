//! Function signatures and the registry of callable targets.
//!
//! A [`FunctionSignature`] declares the canonical shape of one downstream
//! call: its name, its parameter order, and each parameter's target type.
//! Parameter order is authoritative — it is the order the downstream call
//! must present arguments in, no matter how a rule captured them.
//!
//! The [`Registry`] owns every declared signature. It is built once at
//! startup, validated, and never mutated afterwards.

use std::collections::HashMap;

use crate::catalog::CatalogError;

/// Target value type for one parameter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Base-10 integer.
    Int,
    /// Free text (the default when a declaration is silent).
    #[default]
    Str,
}

impl ParamType {
    /// Stable wire name, as used in catalog listings and TOML declarations.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Int => "int",
            ParamType::Str => "str",
        }
    }
}

/// Declared post-processing for a captured string value.
///
/// A transform belongs to the signature, not to the matching step, so a
/// display-label quirk ("room b" becomes "Room B") is declared once and
/// tested on its own rather than rebuilt inline per rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// Uppercase the captured token.
    Uppercase,
    /// Uppercase the captured token and prepend a fixed label.
    Label { prefix: String },
}

impl Transform {
    /// Apply the transform to a captured token.
    pub fn apply(&self, raw: &str) -> String {
        match self {
            Transform::Uppercase => raw.to_uppercase(),
            Transform::Label { prefix } => format!("{prefix} {}", raw.to_uppercase()),
        }
    }
}

/// One declared parameter of a function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Parameter name, unique within the signature.
    pub name: String,
    /// Target value type.
    pub ty: ParamType,
    /// Optional formatting transform, applied to string-typed values only.
    pub transform: Option<Transform>,
}

/// The declared name, parameter order, and parameter types of one
/// callable target.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    name: String,
    params: Vec<ParamSpec>,
}

impl FunctionSignature {
    /// Start a signature with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter.
    pub fn param(self, name: &str, ty: ParamType) -> Self {
        self.push_param(ParamSpec {
            name: name.to_string(),
            ty,
            transform: None,
        })
    }

    /// Append a parameter with a formatting transform.
    pub fn param_with(self, name: &str, ty: ParamType, transform: Transform) -> Self {
        self.push_param(ParamSpec {
            name: name.to_string(),
            ty,
            transform: Some(transform),
        })
    }

    fn push_param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// The unique function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameters in canonical order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Whether the signature declares a parameter with the given name.
    pub fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }
}

/// Immutable catalog of callable function signatures.
///
/// Signatures are kept in declaration order for listings; lookup by name
/// goes through a side index.
#[derive(Debug)]
pub struct Registry {
    functions: Vec<FunctionSignature>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Build a registry, rejecting duplicate function names and duplicate
    /// parameter names within a signature.
    pub fn new(functions: Vec<FunctionSignature>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(functions.len());
        for (i, function) in functions.iter().enumerate() {
            for (j, param) in function.params().iter().enumerate() {
                if function.params()[..j].iter().any(|p| p.name == param.name) {
                    return Err(CatalogError::DuplicateParameter {
                        function: function.name().to_string(),
                        param: param.name.clone(),
                    });
                }
            }
            if index.insert(function.name().to_string(), i).is_some() {
                return Err(CatalogError::DuplicateFunction(function.name().to_string()));
            }
        }
        Ok(Self { functions, index })
    }

    /// Look up a signature by function name.
    pub fn lookup(&self, name: &str) -> Option<&FunctionSignature> {
        self.index.get(name).map(|&i| &self.functions[i])
    }

    /// All signatures, in declaration order.
    pub fn functions(&self) -> &[FunctionSignature] {
        &self.functions
    }

    /// Number of declared functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn by_index(&self, index: usize) -> &FunctionSignature {
        &self.functions[index]
    }
}
