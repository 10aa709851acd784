//! Capability traits - what the engine needs from the host
//!
//! The signature engine never inspects a type system or a class registry
//! directly. Type libraries implement [`TypeConstraint`] and
//! [`ConstraintLookup`]; object systems implement [`RoleChecker`]. Any
//! implementation that satisfies these traits can back a signature.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Shared handle to a type constraint
pub type ConstraintRef = Arc<dyn TypeConstraint>;

/// A named predicate over values with an optional coercion.
pub trait TypeConstraint: Send + Sync + fmt::Debug {
    /// Constraint name as written in parameter specs
    fn name(&self) -> &str;

    /// Check whether `value` satisfies the constraint
    fn check(&self, value: &Value) -> bool;

    /// Whether [`coerce`](Self::coerce) can ever succeed
    fn has_coercion(&self) -> bool {
        false
    }

    /// Try to convert `value` into something this constraint may accept.
    ///
    /// Returns `None` when no coercion applies. The caller re-checks the
    /// result; a coercion is not required to produce a passing value.
    fn coerce(&self, _value: &Value) -> Option<Value> {
        None
    }
}

/// Resolves constraint names to constraints.
pub trait ConstraintLookup {
    /// Find a constraint by name
    fn find_constraint(&self, name: &str) -> Option<ConstraintRef>;
}

impl<F> ConstraintLookup for F
where
    F: Fn(&str) -> Option<ConstraintRef>,
{
    fn find_constraint(&self, name: &str) -> Option<ConstraintRef> {
        self(name)
    }
}

/// Answers "does this value do that role?"
pub trait RoleChecker: Send + Sync {
    /// Check whether `value` satisfies role `role`
    fn satisfies(&self, value: &Value, role: &str) -> bool;
}

impl<F> RoleChecker for F
where
    F: Fn(&Value, &str) -> bool + Send + Sync,
{
    fn satisfies(&self, value: &Value, role: &str) -> bool {
        self(value, role)
    }
}

/// Role checker for hosts without role composition: nothing does any role.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRoles;

impl RoleChecker for NoRoles {
    fn satisfies(&self, _value: &Value, _role: &str) -> bool {
        false
    }
}

/// A constraint defined by a plain predicate, with no coercion.
///
/// Handy for hosts that only need a handful of ad-hoc checks.
pub struct PredicateConstraint {
    name: String,
    predicate: Box<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl PredicateConstraint {
    /// Create a constraint from a name and predicate
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Wrap into a shared handle
    pub fn into_ref(self) -> ConstraintRef {
        Arc::new(self)
    }
}

impl fmt::Debug for PredicateConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PredicateConstraint({})", self.name)
    }
}

impl TypeConstraint for PredicateConstraint {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }
}
