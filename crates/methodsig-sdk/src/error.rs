//! Error types for method declaration and method calls
//!
//! Declaration errors surface while a class is being set up, before any
//! call is possible. Call errors surface to the method caller and mean the
//! method body never ran.

use std::fmt;

use crate::value::Value;

/// Result type for declaration-time operations
pub type DeclareResult<T> = Result<T, DeclareError>;

/// Result type for call-time operations
pub type CallResult<T> = Result<T, CallError>;

/// Identifies the parameter an error refers to.
///
/// Positions are zero-based internally and rendered one-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamLabel {
    /// Positional parameter by index
    Position(usize),
    /// Named parameter by name
    Name(String),
}

impl ParamLabel {
    /// Label for a named parameter
    pub fn name(name: impl Into<String>) -> Self {
        ParamLabel::Name(name.into())
    }
}

impl fmt::Display for ParamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamLabel::Position(index) => write!(f, "Parameter {}", index + 1),
            ParamLabel::Name(name) => write!(f, "Parameter ({})", name),
        }
    }
}

/// Errors raised while building signatures and declaring methods
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeclareError {
    /// A declaration part had the wrong shape
    #[error("Invalid declaration argument: {reason}")]
    InvalidDeclarationArgument {
        /// What was wrong
        reason: String,
    },

    /// Declaration has no body
    #[error("Method '{method}' has no body")]
    MissingBody {
        /// Method name
        method: String,
    },

    /// Declaration has no signature
    #[error("Method '{method}' has no signature")]
    MissingSignature {
        /// Method name
        method: String,
    },

    /// The class's default-attributes hook returned something other than a hash
    #[error("default_method_attributes of '{class}' returned {got} for '{method}', expected a hash")]
    InvalidDefaultAttributesShape {
        /// Class name
        class: String,
        /// Method being declared
        method: String,
        /// Type name of what the hook returned
        got: String,
    },

    /// `isa` names a constraint the lookup does not know
    #[error("Unknown type constraint '{name}'")]
    UnknownTypeConstraint {
        /// Constraint name
        name: String,
    },

    /// `metaclass` names a wrapper implementation that is not registered
    #[error("Unknown method metaclass '{name}'")]
    UnknownMetaclass {
        /// Metaclass name
        name: String,
    },

    /// `coerce` was requested for a constraint with no coercion
    #[error("{param}: cannot coerce, type constraint '{constraint}' has no coercion")]
    CoercionNotAvailable {
        /// Parameter label
        param: ParamLabel,
        /// Constraint name
        constraint: String,
    },

    /// A named signature declared the same name twice
    #[error("Parameter '{name}' declared more than once")]
    DuplicateParameter {
        /// Parameter name
        name: String,
    },

    /// A type library already defines this name
    #[error("Type '{name}' is already defined")]
    DuplicateType {
        /// Type name
        name: String,
    },
}

/// Errors raised while verifying arguments or dispatching a call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    /// A required parameter was not supplied and has no default
    #[error("{param}: Must be specified")]
    MissingRequiredParameter {
        /// Parameter label
        param: ParamLabel,
    },

    /// Value failed the parameter's type constraint
    #[error("{param}: Value {value} does not satisfy type constraint '{constraint}'")]
    TypeConstraintViolation {
        /// Parameter label
        param: ParamLabel,
        /// Constraint name
        constraint: String,
        /// Offending value
        value: Value,
    },

    /// Value does not do the required role
    #[error("{param}: Value {value} does not do role '{role}'")]
    RoleConstraintViolation {
        /// Parameter label
        param: ParamLabel,
        /// Role name
        role: String,
        /// Offending value
        value: Value,
    },

    /// Coercion did not produce a value accepted by the constraint
    #[error("{param}: Could not coerce {value} to '{constraint}'")]
    CoercionFailure {
        /// Parameter label
        param: ParamLabel,
        /// Constraint name
        constraint: String,
        /// Original value
        value: Value,
    },

    /// More positional arguments than declared slots
    #[error("Too many arguments: expected at most {expected}, got {got}")]
    TooManyArguments {
        /// Number of declared slots
        expected: usize,
        /// Number of arguments supplied
        got: usize,
    },

    /// A named argument matched no declared parameter
    #[error("Unknown parameter '{name}'")]
    UnknownParameter {
        /// Supplied name
        name: String,
    },

    /// Named arguments were not name/value pairs
    #[error("Malformed named arguments: {reason}")]
    MalformedNamedArguments {
        /// What was wrong
        reason: String,
    },

    /// Dispatch found no method with this name
    #[error("Can't locate method '{method}' via class '{class}'")]
    NoSuchMethod {
        /// Class searched
        class: String,
        /// Method name
        method: String,
    },

    /// The method body itself failed
    #[error("{0}")]
    Body(String),
}

impl CallError {
    /// Label of the parameter this error is about, if any
    pub fn param(&self) -> Option<&ParamLabel> {
        match self {
            CallError::MissingRequiredParameter { param }
            | CallError::TypeConstraintViolation { param, .. }
            | CallError::RoleConstraintViolation { param, .. }
            | CallError::CoercionFailure { param, .. } => Some(param),
            _ => None,
        }
    }
}

impl From<String> for CallError {
    fn from(s: String) -> Self {
        CallError::Body(s)
    }
}

impl From<&str> for CallError {
    fn from(s: &str) -> Self {
        CallError::Body(s.to_string())
    }
}
