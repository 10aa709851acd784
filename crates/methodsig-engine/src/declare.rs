//! Declaration API
//!
//! A [`Declarer`] is bound to one class and one host. It builds signatures
//! (`named`, `positional`, `semi`), passes attribute maps through (`attr`)
//! and installs methods (`method`):
//!
//! ```ignore
//! let decl = runtime.declarer("Greeter");
//! let sig = decl.named([
//!     ("who", ParamSpec::new().isa("Str").required()),
//!     ("age", ParamSpec::new().isa("Int").default_value(18)),
//! ])?;
//! decl.method(
//!     MethodDeclaration::new("hello")
//!         .signature(sig)
//!         .body(|_, args| Ok(args.get("who").cloned().unwrap_or_default())),
//! )?;
//! ```

use std::sync::Arc;

use tracing::debug;

use methodsig_sdk::{
    CallResult, ConstraintLookup, DeclareError, DeclareResult, RoleChecker, Value,
};

use crate::metaclass::{MetaclassRegistry, STANDARD_METACLASS};
use crate::method::{Attributes, Body, MethodParts, MethodRef};
use crate::param::{ParamContext, ParamSpec};
use crate::signature::{AnySignature, Arguments, NamedSignature, PositionalSignature, SemiSignature};

/// Per-class `default_method_attributes(name)` hook
pub type AttributesHook = Arc<dyn Fn(&str) -> Value + Send + Sync>;

/// What the declaration API needs from the host object system.
pub trait ClassHost {
    /// Register `method` under `name` on `class`
    fn add_method(&self, class: &str, name: &str, method: MethodRef);

    /// The class's default-attributes hook, if it has one
    fn method_attributes_hook(&self, _class: &str) -> Option<AttributesHook> {
        None
    }
}

// ============================================================================
// MethodDeclaration
// ============================================================================

/// Structured method declaration: name, optional attributes, signature
/// and body.
#[derive(Clone)]
pub struct MethodDeclaration {
    name: String,
    attributes: Option<Value>,
    signature: Option<AnySignature>,
    body: Option<Body>,
}

impl MethodDeclaration {
    /// Start a declaration for `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: None,
            signature: None,
            body: None,
        }
    }

    /// Set explicit attributes (must be a hash)
    pub fn attributes(mut self, attributes: impl Into<Value>) -> Self {
        self.attributes = Some(attributes.into());
        self
    }

    /// Set the signature
    pub fn signature(mut self, signature: impl Into<AnySignature>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Set the body from a closure
    pub fn body(
        self,
        body: impl Fn(&Value, Arguments) -> CallResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.body_ref(Arc::new(body))
    }

    /// Set the body from a shared handle
    pub fn body_ref(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Declarer
// ============================================================================

/// Declaration entry points bound to one class.
pub struct Declarer<'a> {
    class: String,
    host: &'a dyn ClassHost,
    types: &'a dyn ConstraintLookup,
    roles: Arc<dyn RoleChecker>,
    metaclasses: &'a MetaclassRegistry,
}

impl<'a> Declarer<'a> {
    /// Bind the declaration API to `class` on `host`
    pub fn new(
        class: impl Into<String>,
        host: &'a dyn ClassHost,
        types: &'a dyn ConstraintLookup,
        roles: Arc<dyn RoleChecker>,
        metaclasses: &'a MetaclassRegistry,
    ) -> Self {
        Self {
            class: class.into(),
            host,
            types,
            roles,
            metaclasses,
        }
    }

    /// Class methods are declared on
    pub fn class(&self) -> &str {
        &self.class
    }

    fn context(&self) -> ParamContext<'_> {
        ParamContext {
            types: self.types,
            roles: &self.roles,
        }
    }

    /// Build a named signature
    pub fn named<N: Into<String>>(
        &self,
        specs: impl IntoIterator<Item = (N, ParamSpec)>,
    ) -> DeclareResult<NamedSignature> {
        NamedSignature::new(specs, self.context())
    }

    /// Build a positional signature
    pub fn positional(
        &self,
        specs: impl IntoIterator<Item = ParamSpec>,
    ) -> DeclareResult<PositionalSignature> {
        PositionalSignature::new(specs, self.context())
    }

    /// Build a semi signature
    pub fn semi<N: Into<String>>(
        &self,
        positional: impl IntoIterator<Item = ParamSpec>,
        named: impl IntoIterator<Item = (N, ParamSpec)>,
    ) -> DeclareResult<SemiSignature> {
        SemiSignature::new(positional, named, self.context())
    }

    /// Attribute passthrough
    pub fn attr(&self, attributes: Attributes) -> Attributes {
        attributes
    }

    /// Build the method, register it on the class and return it.
    pub fn method(&self, decl: MethodDeclaration) -> DeclareResult<MethodRef> {
        let MethodDeclaration {
            name,
            attributes,
            signature,
            body,
        } = decl;

        if name.is_empty() {
            return Err(DeclareError::InvalidDeclarationArgument {
                reason: "method name must not be empty".to_string(),
            });
        }
        let signature = signature.ok_or_else(|| DeclareError::MissingSignature {
            method: name.clone(),
        })?;
        let body = body.ok_or_else(|| DeclareError::MissingBody {
            method: name.clone(),
        })?;

        let explicit = match attributes {
            None => Attributes::new(),
            Some(Value::Hash(map)) => (*map).clone(),
            Some(other) => {
                return Err(DeclareError::InvalidDeclarationArgument {
                    reason: format!("attributes must be a hash, got {}", other.type_name()),
                })
            }
        };
        let mut attributes = self.default_attributes(&name)?;
        attributes.extend(explicit);

        let metaclass = match attributes.get("metaclass") {
            None => STANDARD_METACLASS.to_string(),
            Some(Value::Str(s)) => s.to_string(),
            Some(other) => {
                return Err(DeclareError::InvalidDeclarationArgument {
                    reason: format!("metaclass must be a string, got {}", other.type_name()),
                })
            }
        };
        let factory = self
            .metaclasses
            .get(&metaclass)
            .ok_or_else(|| DeclareError::UnknownMetaclass {
                name: metaclass.clone(),
            })?;

        let style = signature.style();
        let method = factory(MethodParts {
            class: self.class.clone(),
            name: name.clone(),
            signature,
            body,
            attributes,
        });
        self.host.add_method(&self.class, &name, Arc::clone(&method));

        debug!(class = %self.class, method = %name, %metaclass, %style, "declared method");
        Ok(method)
    }

    fn default_attributes(&self, method: &str) -> DeclareResult<Attributes> {
        let hook = match self.host.method_attributes_hook(&self.class) {
            Some(hook) => hook,
            None => return Ok(Attributes::new()),
        };
        match hook(method) {
            Value::Undef => Ok(Attributes::new()),
            Value::Hash(map) => Ok((*map).clone()),
            other => Err(DeclareError::InvalidDefaultAttributesShape {
                class: self.class.clone(),
                method: method.to_string(),
                got: other.type_name().to_string(),
            }),
        }
    }
}
