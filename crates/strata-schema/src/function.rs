//! Stored functions.

use serde::{Deserialize, Serialize};

/// Function volatility classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Volatility {
    Immutable,
    Stable,
    #[default]
    Volatile,
}

impl Volatility {
    /// SQL keyword for this volatility.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Immutable => "IMMUTABLE",
            Self::Stable => "STABLE",
            Self::Volatile => "VOLATILE",
        }
    }

    /// Parses a catalog volatility string, defaulting to volatile.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "IMMUTABLE" | "I" => Self::Immutable,
            "STABLE" | "S" => Self::Stable,
            _ => Self::Volatile,
        }
    }
}

/// Whose privileges a function executes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FunctionSecurity {
    #[default]
    Invoker,
    Definer,
}

impl FunctionSecurity {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Invoker => "INVOKER",
            Self::Definer => "DEFINER",
        }
    }
}

/// Function argument modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArgMode {
    #[default]
    In,
    Out,
    InOut,
    Variadic,
}

impl ArgMode {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
            Self::InOut => "INOUT",
            Self::Variadic => "VARIADIC",
        }
    }

    /// Parses a mode keyword; anything unrecognized is `IN`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "OUT" => Self::Out,
            "INOUT" => Self::InOut,
            "VARIADIC" => Self::Variadic,
            _ => Self::In,
        }
    }
}

/// A function argument. Only the type participates in function
/// identity; names, modes and defaults do not.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunctionArg {
    pub name: String,
    #[serde(rename = "type")]
    pub arg_type: String,
    pub mode: ArgMode,
    pub default: Option<String>,
}

impl FunctionArg {
    /// Creates an `IN` argument of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, arg_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg_type: arg_type.into(),
            mode: ArgMode::In,
            default: None,
        }
    }

    /// Sets the argument mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ArgMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets a default expression for the argument.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// A stored function. Identity is `(schema, name, argument types)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Schema namespace ("" means the default namespace).
    pub schema: String,
    pub name: String,
    pub arguments: Vec<FunctionArg>,
    /// Return type, spelled verbatim.
    pub returns: String,
    pub language: String,
    /// Function body, passed through verbatim.
    pub body: String,
    pub volatility: Volatility,
    pub strict: bool,
    pub security: FunctionSecurity,
    pub cost: i32,
}

impl Function {
    /// Creates a function with the catalog defaults: plpgsql, volatile,
    /// not strict, invoker security, cost 100.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        returns: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            schema: String::new(),
            name: name.into(),
            arguments: Vec::new(),
            returns: returns.into(),
            language: "plpgsql".to_string(),
            body: body.into(),
            volatility: Volatility::Volatile,
            strict: false,
            security: FunctionSecurity::Invoker,
            cost: 100,
        }
    }

    /// True when `other` names the same function: same schema, name
    /// and ordered argument types.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.name == other.name
            && self.schema == other.schema
            && self.arguments.len() == other.arguments.len()
            && self
                .arguments
                .iter()
                .zip(&other.arguments)
                .all(|(a, b)| a.arg_type == b.arg_type)
    }
}

/// Options accepted by the function builder.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionOption {
    Language(String),
    Immutable,
    Stable,
    Volatile,
    Strict,
    NotStrict,
    SecurityDefiner,
    SecurityInvoker,
    Cost(i32),
    InSchema(String),
    Args(Vec<FunctionArg>),
}

impl FunctionOption {
    pub(crate) fn apply(&self, function: &mut Function) {
        match self {
            Self::Language(lang) => function.language = lang.clone(),
            Self::Immutable => function.volatility = Volatility::Immutable,
            Self::Stable => function.volatility = Volatility::Stable,
            Self::Volatile => function.volatility = Volatility::Volatile,
            Self::Strict => function.strict = true,
            Self::NotStrict => function.strict = false,
            Self::SecurityDefiner => function.security = FunctionSecurity::Definer,
            Self::SecurityInvoker => function.security = FunctionSecurity::Invoker,
            Self::Cost(cost) => function.cost = *cost,
            Self::InSchema(schema) => function.schema = schema.clone(),
            Self::Args(args) => function.arguments = args.clone(),
        }
    }
}
