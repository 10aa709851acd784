//! Reference class table
//!
//! An in-memory object system good enough to host declared methods:
//! classes with parents and roles, per-class method tables, an optional
//! default-attributes hook per class, instantiation and dispatch.
//!
//! The inheritance graph lives in [`ClassHierarchy`], separate from the
//! method tables. Parameters hold on to the hierarchy for role and class
//! checks, and methods hold parameters, so keeping methods out of the
//! hierarchy avoids a reference cycle.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use methodsig_sdk::{
    CallError, CallResult, ConstraintRef, DeclareError, DeclareResult, ObjectRef, RoleChecker,
    TypeConstraint, Value, ValueMap,
};

use crate::declare::{AttributesHook, ClassHost};
use crate::method::MethodRef;

// ============================================================================
// ClassHierarchy
// ============================================================================

#[derive(Debug)]
struct ClassNode {
    name: String,
    parents: Vec<usize>,
    roles: Vec<String>,
}

#[derive(Debug, Default)]
struct HierarchyTable {
    classes: Vec<ClassNode>,
    name_to_id: FxHashMap<String, usize>,
}

impl HierarchyTable {
    fn id(&self, name: &str) -> Option<usize> {
        self.name_to_id.get(name).copied()
    }

    fn ensure(&mut self, name: &str) -> usize {
        if let Some(id) = self.id(name) {
            return id;
        }
        let id = self.classes.len();
        self.classes.push(ClassNode {
            name: name.to_string(),
            parents: Vec::new(),
            roles: Vec::new(),
        });
        self.name_to_id.insert(name.to_string(), id);
        id
    }

    /// Depth-first, parents in declaration order, each class once
    fn linearize(&self, id: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if order.contains(&current) {
                continue;
            }
            order.push(current);
            stack.extend(self.classes[current].parents.iter().rev());
        }
        order
    }
}

/// Shared handle to the inheritance and role graph.
#[derive(Debug, Clone, Default)]
pub struct ClassHierarchy {
    table: Arc<RwLock<HierarchyTable>>,
}

impl ClassHierarchy {
    /// Create an empty hierarchy
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a class; returns `false` if it already existed
    pub fn define(&self, name: &str) -> bool {
        let mut table = self.table.write();
        let before = table.classes.len();
        table.ensure(name);
        table.classes.len() > before
    }

    /// Check if a class is defined
    pub fn contains(&self, name: &str) -> bool {
        self.table.read().id(name).is_some()
    }

    /// All class names in definition order
    pub fn names(&self) -> Vec<String> {
        self.table.read().classes.iter().map(|c| c.name.clone()).collect()
    }

    /// Make `class` inherit from `parent`.
    ///
    /// The parent must exist, and the edge must not create a cycle.
    pub fn add_parent(&self, class: &str, parent: &str) -> DeclareResult<()> {
        let mut table = self.table.write();
        let parent_id = table.id(parent).ok_or_else(|| DeclareError::InvalidDeclarationArgument {
            reason: format!("cannot extend unknown class '{}'", parent),
        })?;
        let class_id = table.ensure(class);
        if table.linearize(parent_id).contains(&class_id) {
            return Err(DeclareError::InvalidDeclarationArgument {
                reason: format!("'{}' cannot extend its own descendant '{}'", class, parent),
            });
        }
        if !table.classes[class_id].parents.contains(&parent_id) {
            table.classes[class_id].parents.push(parent_id);
        }
        Ok(())
    }

    /// Compose `role` into `class`
    pub fn add_role(&self, class: &str, role: &str) {
        let mut table = self.table.write();
        let id = table.ensure(class);
        let roles = &mut table.classes[id].roles;
        if !roles.iter().any(|r| r == role) {
            roles.push(role.to_string());
        }
    }

    /// `class` followed by its ancestors, depth-first
    pub fn linearize(&self, class: &str) -> Vec<String> {
        let table = self.table.read();
        match table.id(class) {
            Some(id) => table
                .linearize(id)
                .into_iter()
                .map(|i| table.classes[i].name.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Whether `class` is `ancestor` or inherits from it
    pub fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        let table = self.table.read();
        match (table.id(class), table.id(ancestor)) {
            (Some(c), Some(a)) => table.linearize(c).contains(&a),
            _ => false,
        }
    }

    /// Whether `class` or any ancestor composes `role`
    pub fn does_role(&self, class: &str, role: &str) -> bool {
        let table = self.table.read();
        let Some(id) = table.id(class) else {
            return false;
        };
        table
            .linearize(id)
            .into_iter()
            .any(|i| table.classes[i].roles.iter().any(|r| r == role))
    }

    /// Constraint accepting instances of `class` or a subclass
    pub fn class_constraint(&self, class: &str) -> Option<ConstraintRef> {
        self.contains(class).then(|| {
            Arc::new(ClassConstraint {
                class: class.to_string(),
                hierarchy: self.clone(),
            }) as ConstraintRef
        })
    }
}

/// Objects do a role when their class does; class names (strings) are
/// checked the same way.
impl RoleChecker for ClassHierarchy {
    fn satisfies(&self, value: &Value, role: &str) -> bool {
        match value {
            Value::Object(obj) => self.does_role(obj.class(), role),
            Value::Str(class) => self.does_role(class, role),
            _ => false,
        }
    }
}

/// `isa` naming a class.
#[derive(Debug)]
pub struct ClassConstraint {
    class: String,
    hierarchy: ClassHierarchy,
}

impl TypeConstraint for ClassConstraint {
    fn name(&self) -> &str {
        &self.class
    }

    fn check(&self, value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|obj| self.hierarchy.is_subclass_of(obj.class(), &self.class))
    }
}

// ============================================================================
// ClassTable
// ============================================================================

#[derive(Default)]
struct ClassEntry {
    methods: IndexMap<String, MethodRef>,
    attributes_hook: Option<AttributesHook>,
}

/// In-memory class registry implementing [`ClassHost`].
#[derive(Default)]
pub struct ClassTable {
    hierarchy: ClassHierarchy,
    entries: RwLock<FxHashMap<String, ClassEntry>>,
}

impl ClassTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Inheritance and role graph
    pub fn hierarchy(&self) -> &ClassHierarchy {
        &self.hierarchy
    }

    /// Define a class (no-op if it exists)
    pub fn define_class(&self, name: &str) {
        if self.hierarchy.define(name) {
            debug!(class = name, "defined class");
        }
        self.entries.write().entry(name.to_string()).or_default();
    }

    /// Make `class` inherit from `parent`
    pub fn extends(&self, class: &str, parent: &str) -> DeclareResult<()> {
        self.define_class(class);
        self.hierarchy.add_parent(class, parent)
    }

    /// Compose `role` into `class`
    pub fn add_role(&self, class: &str, role: &str) {
        self.define_class(class);
        self.hierarchy.add_role(class, role);
    }

    /// Install the `default_method_attributes` hook for `class`
    pub fn set_method_attributes_hook(
        &self,
        class: &str,
        hook: impl Fn(&str) -> Value + Send + Sync + 'static,
    ) {
        self.define_class(class);
        if let Some(entry) = self.entries.write().get_mut(class) {
            entry.attributes_hook = Some(Arc::new(hook));
        }
    }

    /// Methods defined directly on `class`, in declaration order
    pub fn methods(&self, class: &str) -> Vec<MethodRef> {
        self.entries
            .read()
            .get(class)
            .map(|entry| entry.methods.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Find `name` on `class` or its ancestors
    pub fn find_method(&self, class: &str, name: &str) -> Option<MethodRef> {
        let entries = self.entries.read();
        self.hierarchy
            .linearize(class)
            .iter()
            .find_map(|c| entries.get(c)?.methods.get(name).cloned())
    }

    /// Call `name` on `receiver`.
    ///
    /// Objects dispatch on their class; a string receiver is a class
    /// name (class-method call).
    pub fn call(&self, receiver: &Value, name: &str, args: &[Value]) -> CallResult<Value> {
        let class = match receiver {
            Value::Object(obj) => obj.class().to_string(),
            Value::Str(class) => class.to_string(),
            other => other.type_name().to_string(),
        };
        let method = self
            .find_method(&class, name)
            .ok_or_else(|| CallError::NoSuchMethod {
                class,
                method: name.to_string(),
            })?;
        method.call(receiver, args)
    }

    /// Create an instance of `class`
    pub fn instantiate(&self, class: &str, fields: ValueMap) -> CallResult<Value> {
        if !self.hierarchy.contains(class) {
            return Err(CallError::NoSuchMethod {
                class: class.to_string(),
                method: "new".to_string(),
            });
        }
        Ok(Value::Object(ObjectRef::new(class, fields)))
    }

    /// Constraint for `isa` naming a defined class
    pub fn class_constraint(&self, class: &str) -> Option<ConstraintRef> {
        self.hierarchy.class_constraint(class)
    }
}

impl ClassHost for ClassTable {
    fn add_method(&self, class: &str, name: &str, method: MethodRef) {
        self.define_class(class);
        if let Some(entry) = self.entries.write().get_mut(class) {
            entry.methods.insert(name.to_string(), method);
        }
    }

    /// Nearest hook on `class` or its ancestors
    fn method_attributes_hook(&self, class: &str) -> Option<AttributesHook> {
        let entries = self.entries.read();
        self.hierarchy
            .linearize(class)
            .iter()
            .find_map(|c| entries.get(c)?.attributes_hook.clone())
    }
}

impl RoleChecker for ClassTable {
    fn satisfies(&self, value: &Value, role: &str) -> bool {
        self.hierarchy.satisfies(value, role)
    }
}

impl std::fmt::Debug for ClassTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassTable")
            .field("classes", &self.hierarchy.names())
            .finish()
    }
}
