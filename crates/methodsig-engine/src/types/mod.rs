//! Reference type library
//!
//! A small named-type hierarchy that backs `isa` lookups out of the box.
//! Every type has an optional parent and an optional predicate; a value
//! satisfies a type when it satisfies the parent chain and the predicate.
//! Coercions are attached per target type and tried in the order they were
//! added.
//!
//! Handles returned by [`TypeLibrary::get`] are snapshots. Adding a
//! coercion replaces the stored type, so signatures declared earlier keep
//! the rules they were built with.

mod builtin;
mod parameterized;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use methodsig_sdk::{
    ConstraintLookup, ConstraintRef, DeclareError, DeclareResult, TypeConstraint, Value,
};

pub use builtin::BUILTIN_TYPES;
pub use parameterized::{parse_parameterized, ContainerConstraint, ContainerKind, UnionConstraint};

/// Type predicate
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Coercion routine
pub type Converter = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// One coercion rule: values accepted by `from` are converted with `via`
#[derive(Clone)]
pub struct Coercion {
    from: ConstraintRef,
    via: Converter,
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coercion(from {})", self.from.name())
    }
}

// ============================================================================
// NamedType
// ============================================================================

/// A named type with parent, predicate and coercions.
#[derive(Clone)]
pub struct NamedType {
    name: String,
    parent: Option<ConstraintRef>,
    predicate: Option<Predicate>,
    coercions: Vec<Coercion>,
}

impl NamedType {
    pub(crate) fn new(
        name: impl Into<String>,
        parent: Option<ConstraintRef>,
        predicate: Option<Predicate>,
    ) -> Self {
        Self {
            name: name.into(),
            parent,
            predicate,
            coercions: Vec::new(),
        }
    }

    /// Parent type, if any
    pub fn parent(&self) -> Option<&ConstraintRef> {
        self.parent.as_ref()
    }

    /// Coercion rules in the order they are tried
    pub fn coercions(&self) -> &[Coercion] {
        &self.coercions
    }

    fn with_coercion(&self, coercion: Coercion) -> Self {
        let mut next = self.clone();
        next.coercions.push(coercion);
        next
    }
}

impl fmt::Debug for NamedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedType")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("coercions", &self.coercions)
            .finish()
    }
}

impl TypeConstraint for NamedType {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, value: &Value) -> bool {
        self.parent.as_ref().map_or(true, |p| p.check(value))
            && self.predicate.as_ref().map_or(true, |p| p(value))
    }

    fn has_coercion(&self) -> bool {
        !self.coercions.is_empty()
    }

    fn coerce(&self, value: &Value) -> Option<Value> {
        self.coercions
            .iter()
            .find(|rule| rule.from.check(value))
            .map(|rule| (rule.via)(value))
    }
}

// ============================================================================
// TypeDef
// ============================================================================

/// Definition of a new named type.
///
/// ```ignore
/// library.define(TypeDef::new("PositiveInt").parent("Int").check(|v| {
///     v.as_int().is_some_and(|i| i > 0)
/// }))?;
/// ```
pub struct TypeDef {
    name: String,
    parent: Option<String>,
    predicate: Option<Predicate>,
}

impl TypeDef {
    /// Start a definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            predicate: None,
        }
    }

    /// Set the parent type
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the predicate
    pub fn check(mut self, predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }
}

// ============================================================================
// TypeLibrary
// ============================================================================

/// Name → type table, seeded with the builtin hierarchy.
pub struct TypeLibrary {
    types: RwLock<FxHashMap<String, Arc<NamedType>>>,
}

impl TypeLibrary {
    /// Create a library holding the builtin types
    pub fn new() -> Self {
        let types = BUILTIN_TYPES
            .iter()
            .map(|ty| (ty.name.clone(), Arc::clone(ty)))
            .collect();
        Self {
            types: RwLock::new(types),
        }
    }

    /// Get a named type (parameterized names are not resolved here)
    pub fn get(&self, name: &str) -> Option<ConstraintRef> {
        self.types
            .read()
            .get(name)
            .map(|ty| Arc::clone(ty) as ConstraintRef)
    }

    /// Check if a named type exists
    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    /// All type names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Define a new named type.
    ///
    /// Fails with `DuplicateType` if the name is taken and with
    /// `UnknownTypeConstraint` if the parent is not known.
    pub fn define(&self, def: TypeDef) -> DeclareResult<ConstraintRef> {
        let parent = match &def.parent {
            Some(parent) => Some(self.find_constraint(parent).ok_or_else(|| {
                DeclareError::UnknownTypeConstraint {
                    name: parent.clone(),
                }
            })?),
            None => None,
        };

        let mut types = self.types.write();
        if types.contains_key(&def.name) {
            return Err(DeclareError::DuplicateType { name: def.name });
        }

        trace!(name = %def.name, parent = ?def.parent, "defining type");
        let ty = Arc::new(NamedType::new(def.name.clone(), parent, def.predicate));
        types.insert(def.name, Arc::clone(&ty));
        Ok(ty)
    }

    /// Add a coercion to `target`: values accepted by `from` are converted
    /// with `via`. Rules are tried in the order they were added.
    pub fn add_coercion(
        &self,
        target: &str,
        from: &str,
        via: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> DeclareResult<()> {
        let from_ty = self
            .find_constraint(from)
            .ok_or_else(|| DeclareError::UnknownTypeConstraint {
                name: from.to_string(),
            })?;

        let mut types = self.types.write();
        let current = types
            .get(target)
            .ok_or_else(|| DeclareError::UnknownTypeConstraint {
                name: target.to_string(),
            })?;

        trace!(type_name = target, from, "adding coercion");
        let next = current.with_coercion(Coercion {
            from: from_ty,
            via: Arc::new(via),
        });
        types.insert(target.to_string(), Arc::new(next));
        Ok(())
    }
}

impl Default for TypeLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeLibrary")
            .field("types", &self.types.read().len())
            .finish()
    }
}

impl ConstraintLookup for TypeLibrary {
    fn find_constraint(&self, name: &str) -> Option<ConstraintRef> {
        self.get(name).or_else(|| parse_parameterized(name, self))
    }
}
