//! Builtin type hierarchy
//!
//! ```text
//! Any
//! └── Item
//!     ├── Bool
//!     ├── Undef
//!     └── Defined
//!         ├── Value
//!         │   ├── Str
//!         │   └── Num
//!         │       └── Int
//!         └── Ref
//!             ├── ArrayRef
//!             ├── HashRef
//!             ├── CodeRef
//!             └── Object
//! ```

use std::sync::Arc;

use once_cell::sync::Lazy;

use methodsig_sdk::{ConstraintRef, Value};

use super::{NamedType, Predicate};

/// The builtin types, parents before children
pub static BUILTIN_TYPES: Lazy<Vec<Arc<NamedType>>> = Lazy::new(standard_types);

fn is_bool(value: &Value) -> bool {
    match value {
        Value::Undef | Value::Bool(_) => true,
        Value::Int(i) => *i == 0 || *i == 1,
        Value::Str(s) => matches!(&**s, "" | "0" | "1"),
        _ => false,
    }
}

fn standard_types() -> Vec<Arc<NamedType>> {
    let table: [(&str, Option<&str>, Option<fn(&Value) -> bool>); 14] = [
        ("Any", None, None),
        ("Item", Some("Any"), None),
        ("Bool", Some("Item"), Some(is_bool)),
        ("Undef", Some("Item"), Some(Value::is_undef)),
        ("Defined", Some("Item"), Some(Value::is_defined)),
        ("Value", Some("Defined"), Some(|v| !v.is_ref())),
        ("Str", Some("Value"), Some(|v| matches!(v, Value::Str(_)))),
        ("Num", Some("Value"), Some(|v| matches!(v, Value::Int(_) | Value::Num(_)))),
        ("Int", Some("Num"), Some(|v| matches!(v, Value::Int(_)))),
        ("Ref", Some("Defined"), Some(Value::is_ref)),
        ("ArrayRef", Some("Ref"), Some(|v| matches!(v, Value::Array(_)))),
        ("HashRef", Some("Ref"), Some(|v| matches!(v, Value::Hash(_)))),
        ("CodeRef", Some("Ref"), Some(|v| matches!(v, Value::Code(_)))),
        ("Object", Some("Ref"), Some(|v| matches!(v, Value::Object(_)))),
    ];

    let mut types: Vec<Arc<NamedType>> = Vec::with_capacity(table.len());
    for (name, parent, predicate) in table {
        let parent = parent.and_then(|p| {
            types
                .iter()
                .find(|ty| ty.name == p)
                .map(|ty| Arc::clone(ty) as ConstraintRef)
        });
        let predicate = predicate.map(|f| Arc::new(f) as Predicate);
        types.push(Arc::new(NamedType::new(name, parent, predicate)));
    }
    types
}
