use std::fmt;

use indexmap::IndexMap;

use methodsig_sdk::{CallResult, DeclareError, DeclareResult, ParamLabel, Value};

use super::{verify_named, write_params, Arguments, Signature};
use crate::param::{ParamContext, ParamSpec, Parameter};

/// Parameters addressed by name, kept in declaration order.
#[derive(Debug, Clone, Default)]
pub struct NamedSignature {
    slots: IndexMap<String, Parameter>,
}

impl NamedSignature {
    /// Build from `(name, spec)` pairs.
    ///
    /// Declaring the same name twice is an error.
    pub fn new<N: Into<String>>(
        specs: impl IntoIterator<Item = (N, ParamSpec)>,
        ctx: ParamContext<'_>,
    ) -> DeclareResult<Self> {
        resolve_named(specs, ctx).map(|slots| Self { slots })
    }

    /// Declared parameters by name
    pub fn slots(&self) -> &IndexMap<String, Parameter> {
        &self.slots
    }

    /// Look up a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.slots.get(name)
    }
}

pub(super) fn resolve_named<N: Into<String>>(
    specs: impl IntoIterator<Item = (N, ParamSpec)>,
    ctx: ParamContext<'_>,
) -> DeclareResult<IndexMap<String, Parameter>> {
    let mut slots = IndexMap::new();
    for (name, spec) in specs {
        let name = name.into();
        if slots.contains_key(&name) {
            return Err(DeclareError::DuplicateParameter { name });
        }
        let param = Parameter::resolve(ParamLabel::name(name.as_str()), spec, ctx)?;
        slots.insert(name, param);
    }
    Ok(slots)
}

impl Signature for NamedSignature {
    fn verify_arguments(&self, args: &[Value]) -> CallResult<Arguments> {
        verify_named(&self.slots, args).map(Arguments::Named)
    }
}

impl fmt::Display for NamedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        write_params(f, self.slots.values())?;
        write!(f, ")")
    }
}
