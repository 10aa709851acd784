//! Parameters - one argument's validation, defaulting and coercion rules
//!
//! A [`ParamSpec`] is the literal shape written at a declaration site
//! (`{isa, does, default, required, coerce, metaclass}`). Building a
//! signature resolves each spec into a [`Parameter`]: the `isa` name is
//! looked up once, the role requirement is bound to a role checker, and
//! the result is immutable from then on.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use methodsig_sdk::{
    CallError, CallResult, ConstraintLookup, ConstraintRef, DeclareError, DeclareResult,
    ParamLabel, RoleChecker, Value,
};

/// Zero-argument default producer
pub type Producer = Arc<dyn Fn() -> Value + Send + Sync>;

/// Default used when an argument is absent
#[derive(Clone)]
pub enum DefaultValue {
    /// Literal value, cloned on each use
    Value(Value),
    /// Producer evaluated on each use
    Producer(Producer),
}

impl DefaultValue {
    /// Produce the default for one call
    pub fn produce(&self) -> Value {
        match self {
            DefaultValue::Value(v) => v.clone(),
            DefaultValue::Producer(f) => f(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(v) => write!(f, "{}", v),
            DefaultValue::Producer(_) => write!(f, "<producer>"),
        }
    }
}

impl<'de> Deserialize<'de> for DefaultValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(DefaultValue::Value)
    }
}

// ============================================================================
// ParamSpec
// ============================================================================

/// Parameter spec as written at a declaration site.
///
/// Every key is optional. Unknown keys are rejected when deserializing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamSpec {
    /// Type constraint name
    pub isa: Option<String>,
    /// Role the value must do
    pub does: Option<String>,
    /// Default for an absent argument
    #[serde(default)]
    pub default: Option<DefaultValue>,
    /// Whether the argument must be present (or defaulted)
    #[serde(default)]
    pub required: bool,
    /// Whether to coerce values that fail `isa`
    #[serde(default)]
    pub coerce: bool,
    /// Parameter metaclass name. Not interpreted by validation; shown in
    /// the rendered parameter and available through `Parameter::metaclass`.
    pub metaclass: Option<String>,
}

impl ParamSpec {
    /// Create an empty spec: optional, unconstrained
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the type constraint
    pub fn isa(mut self, constraint: impl Into<String>) -> Self {
        self.isa = Some(constraint.into());
        self
    }

    /// Set the role requirement
    pub fn does(mut self, role: impl Into<String>) -> Self {
        self.does = Some(role.into());
        self
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set a literal default
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Set a default producer
    pub fn default_with(mut self, producer: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = Some(DefaultValue::Producer(Arc::new(producer)));
        self
    }

    /// Enable coercion
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Set the parameter metaclass
    pub fn metaclass(mut self, name: impl Into<String>) -> Self {
        self.metaclass = Some(name.into());
        self
    }
}

// ============================================================================
// Parameter
// ============================================================================

/// What a spec needs to resolve against.
#[derive(Clone, Copy)]
pub struct ParamContext<'a> {
    /// Type constraint lookup for `isa`
    pub types: &'a dyn ConstraintLookup,
    /// Role checker bound into parameters with `does`
    pub roles: &'a Arc<dyn RoleChecker>,
}

#[derive(Clone)]
struct RoleRequirement {
    role: String,
    checker: Arc<dyn RoleChecker>,
}

/// A resolved, immutable parameter.
#[derive(Clone)]
pub struct Parameter {
    label: ParamLabel,
    constraint: Option<ConstraintRef>,
    role: Option<RoleRequirement>,
    required: bool,
    default: Option<DefaultValue>,
    coerce: bool,
    metaclass: Option<String>,
}

impl Parameter {
    /// Resolve a spec into a parameter identified by `label`.
    pub fn resolve(label: ParamLabel, spec: ParamSpec, ctx: ParamContext<'_>) -> DeclareResult<Self> {
        let constraint = match &spec.isa {
            Some(name) => Some(ctx.types.find_constraint(name).ok_or_else(|| {
                DeclareError::UnknownTypeConstraint { name: name.clone() }
            })?),
            None => None,
        };

        if spec.coerce {
            match &constraint {
                Some(c) if c.has_coercion() => {}
                Some(c) => {
                    return Err(DeclareError::CoercionNotAvailable {
                        param: label,
                        constraint: c.name().to_string(),
                    })
                }
                None => {
                    return Err(DeclareError::InvalidDeclarationArgument {
                        reason: format!("{}: coerce requires an isa constraint", label),
                    })
                }
            }
        }

        let role = spec.does.map(|role| RoleRequirement {
            role,
            checker: Arc::clone(ctx.roles),
        });

        Ok(Self {
            label,
            constraint,
            role,
            required: spec.required,
            default: spec.default,
            coerce: spec.coerce,
            metaclass: spec.metaclass,
        })
    }

    /// Label used in errors
    pub fn label(&self) -> &ParamLabel {
        &self.label
    }

    /// Name, for named parameters
    pub fn name(&self) -> Option<&str> {
        match &self.label {
            ParamLabel::Name(name) => Some(name),
            ParamLabel::Position(_) => None,
        }
    }

    /// Type constraint, if any
    pub fn constraint(&self) -> Option<&ConstraintRef> {
        self.constraint.as_ref()
    }

    /// Required role, if any
    pub fn role(&self) -> Option<&str> {
        self.role.as_ref().map(|r| r.role.as_str())
    }

    /// Whether an absent argument is an error (defaults satisfy this)
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Default, if any
    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// Whether coercion is enabled
    pub fn coerces(&self) -> bool {
        self.coerce
    }

    /// Parameter metaclass, if any
    pub fn metaclass(&self) -> Option<&str> {
        self.metaclass.as_deref()
    }

    pub(crate) fn force_required(&mut self) {
        self.required = true;
    }

    /// Validate one argument.
    ///
    /// `None` means the argument was not supplied. Returns `Ok(None)` when
    /// the parameter is optional, absent and has no default.
    pub fn validate(&self, value: Option<&Value>) -> CallResult<Option<Value>> {
        let value = match value {
            Some(v) => v,
            None => {
                return match &self.default {
                    Some(default) => Ok(Some(default.produce())),
                    None if self.required => Err(CallError::MissingRequiredParameter {
                        param: self.label.clone(),
                    }),
                    None => Ok(None),
                };
            }
        };

        if let Some(req) = &self.role {
            if !req.checker.satisfies(value, &req.role) {
                return Err(CallError::RoleConstraintViolation {
                    param: self.label.clone(),
                    role: req.role.clone(),
                    value: value.clone(),
                });
            }
        }

        let constraint = match &self.constraint {
            Some(c) if !c.check(value) => c,
            _ => return Ok(Some(value.clone())),
        };

        if !self.coerce {
            return Err(CallError::TypeConstraintViolation {
                param: self.label.clone(),
                constraint: constraint.name().to_string(),
                value: value.clone(),
            });
        }

        match constraint.coerce(value) {
            Some(coerced) if constraint.check(&coerced) => Ok(Some(coerced)),
            _ => Err(CallError::CoercionFailure {
                param: self.label.clone(),
                constraint: constraint.name().to_string(),
                value: value.clone(),
            }),
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("label", &self.label)
            .field("isa", &self.constraint.as_ref().map(|c| c.name()))
            .field("does", &self.role())
            .field("required", &self.required)
            .field("default", &self.default)
            .field("coerce", &self.coerce)
            .field("metaclass", &self.metaclass)
            .finish()
    }
}

/// Renders as `[name: ]Type[!|?][ does Role][ = default][ coerce][ is Metaclass]`.
impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            write!(f, "{}: ", name)?;
        }
        write!(f, "{}", self.constraint.as_ref().map_or("Any", |c| c.name()))?;
        match &self.default {
            Some(_) => {}
            None if self.required => write!(f, "!")?,
            None => write!(f, "?")?,
        }
        if let Some(role) = self.role() {
            write!(f, " does {}", role)?;
        }
        if let Some(default) = &self.default {
            write!(f, " = {:?}", default)?;
        }
        if self.coerce {
            write!(f, " coerce")?;
        }
        if let Some(metaclass) = &self.metaclass {
            write!(f, " is {}", metaclass)?;
        }
        Ok(())
    }
}
