use std::fmt;

use indexmap::IndexMap;

use methodsig_sdk::{CallResult, DeclareError, DeclareResult, ParamLabel, Value};

use super::named::resolve_named;
use super::positional::PositionalSignature;
use super::{verify_named, write_params, Arguments, Signature};
use crate::param::{ParamContext, ParamSpec, Parameter};

/// Leading required positional slots followed by named parameters.
#[derive(Debug, Clone, Default)]
pub struct SemiSignature {
    positional: PositionalSignature,
    named: IndexMap<String, Parameter>,
}

impl SemiSignature {
    /// Build from positional specs and `(name, spec)` pairs.
    ///
    /// Positional slots are always required; a `default` on one is
    /// rejected.
    pub fn new<N: Into<String>>(
        positional: impl IntoIterator<Item = ParamSpec>,
        named: impl IntoIterator<Item = (N, ParamSpec)>,
        ctx: ParamContext<'_>,
    ) -> DeclareResult<Self> {
        let mut slots = Vec::new();
        for (index, spec) in positional.into_iter().enumerate() {
            let label = ParamLabel::Position(index);
            if spec.default.is_some() {
                return Err(DeclareError::InvalidDeclarationArgument {
                    reason: format!("{}: positional slots of a semi signature cannot have a default", label),
                });
            }
            let mut param = Parameter::resolve(label, spec, ctx)?;
            param.force_required();
            slots.push(param);
        }

        Ok(Self {
            positional: PositionalSignature::from_parameters(slots),
            named: resolve_named(named, ctx)?,
        })
    }

    /// Leading positional slots
    pub fn positional_slots(&self) -> &[Parameter] {
        self.positional.slots()
    }

    /// Trailing named parameters
    pub fn named_slots(&self) -> &IndexMap<String, Parameter> {
        &self.named
    }
}

impl Signature for SemiSignature {
    fn verify_arguments(&self, args: &[Value]) -> CallResult<Arguments> {
        let split = self.positional.len().min(args.len());
        let (leading, rest) = args.split_at(split);

        let positional = self.positional.verify_slots(leading)?;
        let named = verify_named(&self.named, rest)?;
        Ok(Arguments::Semi { positional, named })
    }
}

impl fmt::Display for SemiSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        write_params(f, self.positional.slots().iter())?;
        if !self.named.is_empty() {
            if !self.positional.is_empty() {
                write!(f, "; ")?;
            }
            write_params(f, self.named.values())?;
        }
        write!(f, ")")
    }
}
