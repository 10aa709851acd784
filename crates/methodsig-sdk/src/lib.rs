//! Methodsig SDK - value model and host capabilities
//!
//! This crate holds what hosts and type libraries need in order to plug
//! into the methodsig signature engine without depending on the engine
//! itself:
//!
//! - [`Value`]: the dynamic value passed to and from methods
//! - [`TypeConstraint`] / [`ConstraintLookup`]: named type checks with
//!   optional coercion
//! - [`RoleChecker`]: duck-typing role checks
//! - [`DeclareError`] / [`CallError`]: the shared error taxonomy
//!
//! # Example
//!
//! ```ignore
//! use methodsig_sdk::{PredicateConstraint, TypeConstraint, Value};
//!
//! let positive = PredicateConstraint::new("PositiveInt", |v| {
//!     v.as_int().is_some_and(|i| i > 0)
//! });
//! assert!(positive.check(&Value::Int(3)));
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod convert;
pub mod error;
pub mod value;

pub use context::{
    ConstraintLookup, ConstraintRef, NoRoles, PredicateConstraint, RoleChecker, TypeConstraint,
};
pub use error::{CallError, CallResult, DeclareError, DeclareResult, ParamLabel};
pub use value::{CodeRef, ObjectRef, Value, ValueMap};
