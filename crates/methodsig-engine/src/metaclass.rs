//! Method metaclasses
//!
//! A metaclass is the wrapper implementation a declaration selects through
//! its `metaclass` attribute. The registry maps names to factories; every
//! registry starts with [`STANDARD_METACLASS`] and [`TRACED_METACLASS`].

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, debug_span};

use methodsig_sdk::{CallResult, Value};

use crate::method::{Attributes, Method, MethodParts, MethodRef, MethodWrapper};
use crate::signature::{AnySignature, Signature};

/// Builds a method from declaration parts
pub type MetaclassFactory = Arc<dyn Fn(MethodParts) -> MethodRef + Send + Sync>;

/// Plain verify-then-dispatch wrapper
pub const STANDARD_METACLASS: &str = "standard";

/// Wrapper that runs each call inside a tracing span
pub const TRACED_METACLASS: &str = "traced";

/// Name → factory table for method metaclasses.
#[derive(Clone)]
pub struct MetaclassRegistry {
    factories: FxHashMap<String, MetaclassFactory>,
}

impl MetaclassRegistry {
    /// Create a registry holding the builtin metaclasses
    pub fn new() -> Self {
        let mut registry = Self {
            factories: FxHashMap::default(),
        };
        registry.register(STANDARD_METACLASS, |parts| MethodWrapper::new(parts).into_ref());
        registry.register(TRACED_METACLASS, |parts| {
            Arc::new(TracedMethod::new(parts)) as MethodRef
        });
        registry
    }

    /// Register a factory, replacing any previous one of the same name
    pub fn register(
        &mut self,
        name: &str,
        factory: impl Fn(MethodParts) -> MethodRef + Send + Sync + 'static,
    ) {
        self.factories.insert(name.to_string(), Arc::new(factory));
    }

    /// Get a factory by name
    pub fn get(&self, name: &str) -> Option<MetaclassFactory> {
        self.factories.get(name).cloned()
    }

    /// Check if a metaclass is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for MetaclassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MetaclassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaclassRegistry")
            .field("names", &self.names())
            .finish()
    }
}

// ============================================================================
// Traced metaclass
// ============================================================================

/// Standard wrapper that enters a `method.call` span per call and logs
/// verification failures.
#[derive(Debug)]
pub struct TracedMethod {
    inner: MethodWrapper,
}

impl TracedMethod {
    /// Build from declaration parts
    pub fn new(parts: MethodParts) -> Self {
        Self {
            inner: MethodWrapper::new(parts),
        }
    }
}

impl Method for TracedMethod {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn class(&self) -> &str {
        self.inner.class()
    }

    fn signature(&self) -> &AnySignature {
        self.inner.signature()
    }

    fn attributes(&self) -> &Attributes {
        self.inner.attributes()
    }

    fn call(&self, receiver: &Value, args: &[Value]) -> CallResult<Value> {
        let span = debug_span!("method.call", method = self.name(), class = self.class());
        let _enter = span.enter();

        let verified = match self.signature().verify_arguments(args) {
            Ok(verified) => verified,
            Err(err) => {
                debug!(error = %err, argc = args.len(), "argument verification failed");
                return Err(err);
            }
        };
        self.inner.dispatch(receiver, verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::body;
    use crate::param::{ParamContext, ParamSpec};
    use crate::signature::NamedSignature;
    use methodsig_sdk::{CallError, ConstraintRef, NoRoles, RoleChecker};

    fn parts(name: &str) -> MethodParts {
        let lookup = |_: &str| -> Option<ConstraintRef> { None };
        let roles: Arc<dyn RoleChecker> = Arc::new(NoRoles);
        let ctx = ParamContext {
            types: &lookup,
            roles: &roles,
        };
        let signature =
            NamedSignature::new([("who", ParamSpec::new().required())], ctx).unwrap();
        MethodParts {
            class: "Greeter".to_string(),
            name: name.to_string(),
            signature: signature.into(),
            body: body(|_, args| Ok(args.get("who").cloned().unwrap_or_default())),
            attributes: Attributes::new(),
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = MetaclassRegistry::new();
        assert!(registry.contains(STANDARD_METACLASS));
        assert!(registry.contains(TRACED_METACLASS));
        assert_eq!(registry.names(), ["standard", "traced"]);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_traced_behaves_like_standard() {
        let registry = MetaclassRegistry::new();
        let factory = registry.get(TRACED_METACLASS).unwrap();
        let method = factory(parts("hello"));

        assert_eq!(method.name(), "hello");
        assert_eq!(method.class(), "Greeter");
        let out = method
            .call(&Value::Undef, &[Value::str("who"), Value::str("world")])
            .unwrap();
        assert_eq!(out, Value::str("world"));

        let err = method.call(&Value::Undef, &[]).unwrap_err();
        assert!(matches!(err, CallError::MissingRequiredParameter { .. }));
    }

    #[test]
    fn test_custom_metaclass() {
        #[derive(Debug)]
        struct Shouting(MethodWrapper);

        impl Method for Shouting {
            fn name(&self) -> &str {
                self.0.name()
            }
            fn class(&self) -> &str {
                self.0.class()
            }
            fn signature(&self) -> &AnySignature {
                self.0.signature()
            }
            fn attributes(&self) -> &Attributes {
                self.0.attributes()
            }
            fn call(&self, receiver: &Value, args: &[Value]) -> CallResult<Value> {
                let out = self.0.call(receiver, args)?;
                Ok(Value::str(out.as_str().unwrap_or_default().to_uppercase()))
            }
        }

        let mut registry = MetaclassRegistry::new();
        registry.register("shouting", |parts| {
            Arc::new(Shouting(MethodWrapper::new(parts))) as MethodRef
        });
        let method = registry.get("shouting").unwrap()(parts("hello"));
        let out = method
            .call(&Value::Undef, &[Value::str("who"), Value::str("world")])
            .unwrap();
        assert_eq!(out, Value::str("WORLD"));
    }
}
