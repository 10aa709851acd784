//! Parameterized and union constraints
//!
//! `ArrayRef[T]`, `HashRef[T]` and `Maybe[T]` are built on demand from the
//! inner constraint; `A|B` accepts a value satisfying any member. Nesting
//! works (`ArrayRef[Maybe[Int]]`, `HashRef[Int|Str]`).

use std::sync::Arc;

use methodsig_sdk::{ConstraintLookup, ConstraintRef, TypeConstraint, Value};

/// Container shape of a parameterized constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// `ArrayRef[T]`: every element satisfies `T`
    ArrayOf,
    /// `HashRef[T]`: every value satisfies `T`
    HashOf,
    /// `Maybe[T]`: undef or `T`
    Maybe,
}

impl ContainerKind {
    fn from_base(base: &str) -> Option<Self> {
        match base {
            "ArrayRef" => Some(ContainerKind::ArrayOf),
            "HashRef" => Some(ContainerKind::HashOf),
            "Maybe" => Some(ContainerKind::Maybe),
            _ => None,
        }
    }
}

/// Resolve a parameterized or union constraint name.
///
/// Member and inner names are resolved through `lookup`, so anything it
/// knows (including class names) can be nested.
pub fn parse_parameterized(name: &str, lookup: &dyn ConstraintLookup) -> Option<ConstraintRef> {
    let name = name.trim();
    let members = split_union(name);
    if members.len() > 1 {
        let members = members
            .into_iter()
            .map(|member| lookup.find_constraint(member.trim()))
            .collect::<Option<Vec<_>>>()?;
        return Some(Arc::new(UnionConstraint::new(members)));
    }

    let (base, inner) = split_generic(name)?;
    let kind = ContainerKind::from_base(base)?;
    let inner = lookup.find_constraint(inner.trim())?;
    Some(Arc::new(ContainerConstraint::new(kind, inner)))
}

/// `Base[Inner]` → `(Base, Inner)`
fn split_generic(name: &str) -> Option<(&str, &str)> {
    let open = name.find('[')?;
    if open == 0 || !name.ends_with(']') {
        return None;
    }
    let base = &name[..open];
    let inner = &name[open + 1..name.len() - 1];
    if inner.is_empty() {
        return None;
    }
    Some((base, inner))
}

/// Split on `|` outside of brackets
fn split_union(name: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in name.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                parts.push(&name[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&name[start..]);
    parts
}

// ============================================================================
// ContainerConstraint
// ============================================================================

/// `ArrayRef[T]`, `HashRef[T]` or `Maybe[T]`.
#[derive(Debug)]
pub struct ContainerConstraint {
    name: String,
    kind: ContainerKind,
    inner: ConstraintRef,
}

impl ContainerConstraint {
    /// Build from a kind and the inner constraint
    pub fn new(kind: ContainerKind, inner: ConstraintRef) -> Self {
        let base = match kind {
            ContainerKind::ArrayOf => "ArrayRef",
            ContainerKind::HashOf => "HashRef",
            ContainerKind::Maybe => "Maybe",
        };
        Self {
            name: format!("{}[{}]", base, inner.name()),
            kind,
            inner,
        }
    }

    /// Container shape
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Inner constraint
    pub fn inner(&self) -> &ConstraintRef {
        &self.inner
    }

    fn coerce_item(&self, item: &Value) -> Option<Value> {
        if self.inner.check(item) {
            return Some(item.clone());
        }
        self.inner.coerce(item)
    }
}

impl TypeConstraint for ContainerConstraint {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, value: &Value) -> bool {
        match (self.kind, value) {
            (ContainerKind::ArrayOf, Value::Array(items)) => {
                items.iter().all(|item| self.inner.check(item))
            }
            (ContainerKind::HashOf, Value::Hash(map)) => {
                map.values().all(|item| self.inner.check(item))
            }
            (ContainerKind::Maybe, Value::Undef) => true,
            (ContainerKind::Maybe, other) => self.inner.check(other),
            _ => false,
        }
    }

    fn has_coercion(&self) -> bool {
        self.inner.has_coercion()
    }

    /// Element-wise: each failing element is coerced by the inner
    /// constraint; any element without a coercion aborts.
    fn coerce(&self, value: &Value) -> Option<Value> {
        match (self.kind, value) {
            (ContainerKind::ArrayOf, Value::Array(items)) => items
                .iter()
                .map(|item| self.coerce_item(item))
                .collect::<Option<Vec<_>>>()
                .map(Value::array),
            (ContainerKind::HashOf, Value::Hash(map)) => map
                .iter()
                .map(|(k, item)| Some((k.clone(), self.coerce_item(item)?)))
                .collect::<Option<Vec<_>>>()
                .map(Value::hash),
            (ContainerKind::Maybe, Value::Undef) => Some(Value::Undef),
            (ContainerKind::Maybe, other) => self.inner.coerce(other),
            _ => None,
        }
    }
}

// ============================================================================
// UnionConstraint
// ============================================================================

/// `A|B|...`: satisfied by any member.
#[derive(Debug)]
pub struct UnionConstraint {
    name: String,
    members: Vec<ConstraintRef>,
}

impl UnionConstraint {
    /// Build from member constraints
    pub fn new(members: Vec<ConstraintRef>) -> Self {
        let name = members
            .iter()
            .map(|m| m.name())
            .collect::<Vec<_>>()
            .join("|");
        Self { name, members }
    }

    /// Member constraints
    pub fn members(&self) -> &[ConstraintRef] {
        &self.members
    }
}

impl TypeConstraint for UnionConstraint {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, value: &Value) -> bool {
        self.members.iter().any(|m| m.check(value))
    }

    fn has_coercion(&self) -> bool {
        self.members.iter().any(|m| m.has_coercion())
    }

    /// First member whose coercion produces a value it accepts
    fn coerce(&self, value: &Value) -> Option<Value> {
        self.members
            .iter()
            .filter(|m| m.has_coercion())
            .find_map(|m| m.coerce(value).filter(|v| m.check(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeLibrary;

    #[test]
    fn test_split_generic() {
        assert_eq!(split_generic("ArrayRef[Int]"), Some(("ArrayRef", "Int")));
        assert_eq!(
            split_generic("HashRef[ArrayRef[Str]]"),
            Some(("HashRef", "ArrayRef[Str]"))
        );
        assert_eq!(split_generic("[Int]"), None);
        assert_eq!(split_generic("ArrayRef[]"), None);
        assert_eq!(split_generic("Int"), None);
    }

    #[test]
    fn test_split_union_respects_brackets() {
        assert_eq!(split_union("Int|Str"), ["Int", "Str"]);
        assert_eq!(split_union("ArrayRef[Int|Str]"), ["ArrayRef[Int|Str]"]);
        assert_eq!(split_union("Undef|HashRef[Int|Str]"), ["Undef", "HashRef[Int|Str]"]);
    }

    #[test]
    fn test_maybe() {
        let lib = TypeLibrary::new();
        let maybe = parse_parameterized("Maybe[Int]", &lib).unwrap();
        assert_eq!(maybe.name(), "Maybe[Int]");
        assert!(maybe.check(&Value::Undef));
        assert!(maybe.check(&Value::Int(3)));
        assert!(!maybe.check(&Value::str("3")));
    }

    #[test]
    fn test_nested_hash_of_union() {
        let lib = TypeLibrary::new();
        let ty = parse_parameterized("HashRef[Int|Str]", &lib).unwrap();
        assert!(ty.check(&Value::hash([("a", Value::Int(1)), ("b", Value::str("x"))])));
        assert!(!ty.check(&Value::hash([("a", Value::Num(1.5))])));
        assert!(!ty.check(&Value::array([])));
    }

    #[test]
    fn test_unknown_base_or_member() {
        let lib = TypeLibrary::new();
        assert!(parse_parameterized("Set[Int]", &lib).is_none());
        assert!(parse_parameterized("Int|Widget", &lib).is_none());
    }

    #[test]
    fn test_element_wise_coercion() {
        let lib = TypeLibrary::new();
        lib.add_coercion("Int", "Str", |v| {
            v.as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .map_or(Value::Undef, Value::Int)
        })
        .unwrap();

        let ints = parse_parameterized("ArrayRef[Int]", &lib).unwrap();
        assert!(ints.has_coercion());
        let coerced = ints
            .coerce(&Value::array([Value::Int(1), Value::str("2")]))
            .unwrap();
        assert_eq!(coerced, Value::array([Value::Int(1), Value::Int(2)]));
        assert!(ints.coerce(&Value::array([Value::array([])])).is_none());
    }
}
