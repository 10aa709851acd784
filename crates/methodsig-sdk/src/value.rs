//! Value - dynamic value representation of the host object system
//!
//! Every argument, default and return value that crosses a method boundary
//! is a `Value`. Payloads that are not plain scalars live behind `Arc`, so
//! cloning a value is always cheap and never deep-copies.
//!
//! # Equality
//!
//! Scalars, strings, arrays and hashes compare structurally. Code refs and
//! objects compare by identity (same underlying allocation).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

/// Ordered string-keyed map used for hash values.
pub type ValueMap = IndexMap<String, Value>;

/// Dynamic value.
#[derive(Clone, Default)]
pub enum Value {
    /// Undefined value
    #[default]
    Undef,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating-point number
    Num(f64),
    /// Immutable string
    Str(Arc<str>),
    /// Array of values
    Array(Arc<Vec<Value>>),
    /// Insertion-ordered hash
    Hash(Arc<ValueMap>),
    /// Native callable
    Code(CodeRef),
    /// Class instance
    Object(ObjectRef),
}

impl Value {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a string value
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(s.as_ref()))
    }

    /// Create an array value
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Arc::new(items.into_iter().collect()))
    }

    /// Create a hash value from key/value pairs (later keys overwrite earlier ones)
    pub fn hash<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Hash(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Create a code value
    pub fn code(
        name: impl AsRef<str>,
        func: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        Value::Code(CodeRef::new(name, func))
    }

    // ========================================================================
    // Type checks
    // ========================================================================

    /// Check if value is undef
    pub fn is_undef(&self) -> bool {
        matches!(self, Value::Undef)
    }

    /// Check if value is defined
    pub fn is_defined(&self) -> bool {
        !self.is_undef()
    }

    /// Check if value is a reference (array, hash, code or object)
    pub fn is_ref(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::Hash(_) | Value::Code(_) | Value::Object(_)
        )
    }

    /// Perl-style truthiness: undef, false, 0, 0.0, "" and "0" are false
    pub fn truthy(&self) -> bool {
        match self {
            Value::Undef => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Num(n) => *n != 0.0,
            Value::Str(s) => !(s.is_empty() || &**s == "0"),
            _ => true,
        }
    }

    // ========================================================================
    // Extractors
    // ========================================================================

    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract a number (integers widen to f64)
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Extract array elements
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Extract hash entries
    pub fn as_hash(&self) -> Option<&ValueMap> {
        match self {
            Value::Hash(map) => Some(map),
            _ => None,
        }
    }

    /// Extract code ref
    pub fn as_code(&self) -> Option<&CodeRef> {
        match self {
            Value::Code(code) => Some(code),
            _ => None,
        }
    }

    /// Extract object ref
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Get type name for diagnostics
    pub fn type_name(&self) -> &str {
        match self {
            Value::Undef => "Undef",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Num(_) => "Num",
            Value::Str(_) => "Str",
            Value::Array(_) => "ArrayRef",
            Value::Hash(_) => "HashRef",
            Value::Code(_) => "CodeRef",
            Value::Object(obj) => obj.class(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undef, Value::Undef) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Hash(a), Value::Hash(b)) => a == b,
            (Value::Code(a), Value::Code(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undef => write!(f, "undef"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Num(n) => write!(f, "{:?}", n),
            Value::Str(s) => write!(f, "{:?}", &**s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Hash(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Code(code) => write!(f, "CODE({})", code.name()),
            Value::Object(obj) => write!(f, "{}=OBJECT(#{})", obj.class(), obj.id()),
        }
    }
}

// ============================================================================
// Code refs
// ============================================================================

type NativeCode = dyn Fn(&[Value]) -> Value + Send + Sync;

/// Shared handle to a native callable value.
#[derive(Clone)]
pub struct CodeRef {
    name: Arc<str>,
    func: Arc<NativeCode>,
}

impl CodeRef {
    /// Wrap a closure as a code value
    pub fn new(
        name: impl AsRef<str>,
        func: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            func: Arc::new(func),
        }
    }

    /// Name given at construction (for diagnostics)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the callable
    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &CodeRef) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for CodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CodeRef({})", self.name)
    }
}

// ============================================================================
// Objects
// ============================================================================

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

struct Instance {
    id: u64,
    class: String,
    fields: RwLock<ValueMap>,
}

/// Shared handle to a class instance.
///
/// The class name is fixed at construction; fields are mutable through the
/// handle.
#[derive(Clone)]
pub struct ObjectRef(Arc<Instance>);

impl ObjectRef {
    /// Create a new instance of `class` with the given fields
    pub fn new(class: impl Into<String>, fields: ValueMap) -> Self {
        ObjectRef(Arc::new(Instance {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            class: class.into(),
            fields: RwLock::new(fields),
        }))
    }

    /// Unique instance ID
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Name of the instance's class
    pub fn class(&self) -> &str {
        &self.0.class
    }

    /// Read a field
    pub fn get(&self, field: &str) -> Option<Value> {
        self.0.fields.read().get(field).cloned()
    }

    /// Write a field, returning the previous value
    pub fn set(&self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.fields.write().insert(field.into(), value)
    }

    /// Snapshot of all fields
    pub fn fields(&self) -> ValueMap {
        self.0.fields.read().clone()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("id", &self.0.id)
            .field("class", &self.0.class)
            .finish()
    }
}
