//! Methodsig Engine
//!
//! Method declaration with validated signatures:
//! - **Parameters**: per-argument type, role, default and coercion rules (`param` module)
//! - **Signatures**: named, positional and semi verification (`signature` module)
//! - **Methods**: the verify-then-dispatch wrapper and metaclasses (`method`, `metaclass`)
//! - **Declaration**: `method` / `named` / `positional` / `semi` / `attr` (`declare` module)
//! - **Reference host**: type library, class table and manifests (`types`, `class`, `manifest`)
//!
//! # Example
//!
//! ```rust,ignore
//! use methodsig_engine::{MethodDeclaration, ParamSpec, Runtime};
//! use methodsig_sdk::Value;
//!
//! let rt = Runtime::new();
//! let decl = rt.declarer("Greeter");
//! let sig = decl.named([
//!     ("who", ParamSpec::new().isa("Str").required()),
//!     ("age", ParamSpec::new().isa("Int").default_value(18)),
//! ])?;
//! decl.method(
//!     MethodDeclaration::new("hello")
//!         .signature(sig)
//!         .body(|_, args| Ok(args.get("who").cloned().unwrap_or_default())),
//! )?;
//!
//! let out = rt.call(&Value::str("Greeter"), "hello", &[Value::str("who"), Value::str("world")])?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Signature engine
// ============================================================================

/// Parameter specs and the per-argument validation primitive
pub mod param;

/// Signature trait and the named / positional / semi variants
pub mod signature;

/// Method wrapper
pub mod method;

/// Method metaclasses
pub mod metaclass;

/// Declaration API
pub mod declare;

// ============================================================================
// Reference host
// ============================================================================

/// Reference type library
pub mod types;

/// Reference class table
pub mod class;

/// Runtime bundle
pub mod runtime;

/// Signature manifests
pub mod manifest;

pub use class::{ClassConstraint, ClassHierarchy, ClassTable};
pub use declare::{AttributesHook, ClassHost, Declarer, MethodDeclaration};
pub use manifest::{ManifestError, MethodEntry, SignatureManifest, SignatureSpec};
pub use metaclass::{
    MetaclassFactory, MetaclassRegistry, TracedMethod, STANDARD_METACLASS, TRACED_METACLASS,
};
pub use method::{
    body, wrap_with_signature, Attributes, Body, Method, MethodParts, MethodRef, MethodWrapper,
};
pub use param::{DefaultValue, ParamContext, ParamSpec, Parameter};
pub use runtime::Runtime;
pub use signature::{
    AnySignature, Arguments, NamedArgs, NamedSignature, PositionalSignature, SemiSignature,
    Signature, SignatureStyle,
};
pub use types::{TypeDef, TypeLibrary};
