//! Method wrapper - verify, then dispatch
//!
//! A [`MethodWrapper`] binds a signature to a body. Calling it verifies
//! the raw arguments first; the body only ever sees normalized
//! [`Arguments`]. Wrappers are immutable and `Send + Sync`, so one wrapper
//! can serve any number of concurrent calls.

use std::fmt;
use std::sync::Arc;

use methodsig_sdk::{CallResult, Value, ValueMap};

use crate::signature::{AnySignature, Arguments, Signature};

/// Method body: receives the receiver and the verified arguments
pub type Body = Arc<dyn Fn(&Value, Arguments) -> CallResult<Value> + Send + Sync>;

/// Declaration attributes (`metaclass` and anything the host cares about)
pub type Attributes = ValueMap;

/// Shared handle to a registered method
pub type MethodRef = Arc<dyn Method>;

/// Name given to wrappers built outside a declaration
pub const ANON_METHOD: &str = "__ANON__";

/// Class given to wrappers built outside a declaration
pub const ANON_CLASS: &str = "main";

/// Wrap a closure as a [`Body`]
pub fn body(f: impl Fn(&Value, Arguments) -> CallResult<Value> + Send + Sync + 'static) -> Body {
    Arc::new(f)
}

/// A callable method installed on a class.
///
/// Implemented by every metaclass's wrapper type.
pub trait Method: Send + Sync + fmt::Debug {
    /// Method name
    fn name(&self) -> &str;

    /// Declaring class
    fn class(&self) -> &str;

    /// Argument signature
    fn signature(&self) -> &AnySignature;

    /// Merged declaration attributes
    fn attributes(&self) -> &Attributes;

    /// Verify `args` and run the body on `receiver`
    fn call(&self, receiver: &Value, args: &[Value]) -> CallResult<Value>;
}

/// Everything a metaclass needs to build a method.
#[derive(Clone)]
pub struct MethodParts {
    /// Declaring class
    pub class: String,
    /// Method name
    pub name: String,
    /// Argument signature
    pub signature: AnySignature,
    /// Body
    pub body: Body,
    /// Merged attributes
    pub attributes: Attributes,
}

impl fmt::Debug for MethodParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodParts")
            .field("class", &self.class)
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// The standard verify-then-dispatch wrapper.
#[derive(Debug, Clone)]
pub struct MethodWrapper {
    parts: MethodParts,
}

impl MethodWrapper {
    /// Build a wrapper from declaration parts
    pub fn new(parts: MethodParts) -> Self {
        Self { parts }
    }

    /// Run the body with already-verified arguments
    pub fn dispatch(&self, receiver: &Value, args: Arguments) -> CallResult<Value> {
        (self.parts.body)(receiver, args)
    }

    /// Share as a [`MethodRef`]
    pub fn into_ref(self) -> MethodRef {
        Arc::new(self)
    }
}

impl Method for MethodWrapper {
    fn name(&self) -> &str {
        &self.parts.name
    }

    fn class(&self) -> &str {
        &self.parts.class
    }

    fn signature(&self) -> &AnySignature {
        &self.parts.signature
    }

    fn attributes(&self) -> &Attributes {
        &self.parts.attributes
    }

    fn call(&self, receiver: &Value, args: &[Value]) -> CallResult<Value> {
        let verified = self.parts.signature.verify_arguments(args)?;
        self.dispatch(receiver, verified)
    }
}

/// Bind `signature` to `body` as an anonymous method.
pub fn wrap_with_signature(signature: impl Into<AnySignature>, body: Body) -> MethodWrapper {
    MethodWrapper::new(MethodParts {
        class: ANON_CLASS.to_string(),
        name: ANON_METHOD.to_string(),
        signature: signature.into(),
        body,
        attributes: Attributes::new(),
    })
}
