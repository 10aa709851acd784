//! Runtime - type library, class table and metaclasses in one place

use std::sync::Arc;

use methodsig_sdk::{CallResult, ConstraintLookup, ConstraintRef, RoleChecker, Value, ValueMap};

use crate::class::ClassTable;
use crate::declare::Declarer;
use crate::metaclass::MetaclassRegistry;
use crate::types::{parse_parameterized, TypeLibrary};

/// The reference host: a [`TypeLibrary`], a [`ClassTable`] and a
/// [`MetaclassRegistry`] wired together.
///
/// `isa` names resolve against the type library first, then against
/// defined classes, then as parameterized or union names.
#[derive(Debug, Default)]
pub struct Runtime {
    types: Arc<TypeLibrary>,
    classes: Arc<ClassTable>,
    metaclasses: MetaclassRegistry,
}

impl Runtime {
    /// Create a runtime with the builtin types and metaclasses
    pub fn new() -> Self {
        Self::default()
    }

    /// Type library
    pub fn types(&self) -> &TypeLibrary {
        &self.types
    }

    /// Class table
    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    /// Metaclass registry
    pub fn metaclasses(&self) -> &MetaclassRegistry {
        &self.metaclasses
    }

    /// Metaclass registry, for registering custom wrappers
    pub fn metaclasses_mut(&mut self) -> &mut MetaclassRegistry {
        &mut self.metaclasses
    }

    /// Declaration API for `class`
    pub fn declarer(&self, class: impl Into<String>) -> Declarer<'_> {
        let roles: Arc<dyn RoleChecker> = Arc::new(self.classes.hierarchy().clone());
        Declarer::new(class, &*self.classes, self, roles, &self.metaclasses)
    }

    /// Call `name` on `receiver` (object or class name)
    pub fn call(&self, receiver: &Value, name: &str, args: &[Value]) -> CallResult<Value> {
        self.classes.call(receiver, name, args)
    }

    /// Create an instance of `class`
    pub fn instantiate(&self, class: &str, fields: ValueMap) -> CallResult<Value> {
        self.classes.instantiate(class, fields)
    }
}

impl ConstraintLookup for Runtime {
    fn find_constraint(&self, name: &str) -> Option<ConstraintRef> {
        self.types
            .get(name)
            .or_else(|| self.classes.class_constraint(name))
            .or_else(|| parse_parameterized(name, self))
    }
}
