use std::fmt;

use methodsig_sdk::{CallError, CallResult, DeclareResult, ParamLabel, Value};

use super::{write_params, Arguments, Signature};
use crate::param::{ParamContext, ParamSpec, Parameter};

/// Ordered slots, one parameter per argument position.
#[derive(Debug, Clone, Default)]
pub struct PositionalSignature {
    slots: Vec<Parameter>,
}

impl PositionalSignature {
    /// Build from specs in slot order
    pub fn new(
        specs: impl IntoIterator<Item = ParamSpec>,
        ctx: ParamContext<'_>,
    ) -> DeclareResult<Self> {
        let slots = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| Parameter::resolve(ParamLabel::Position(index), spec, ctx))
            .collect::<DeclareResult<Vec<_>>>()?;
        Ok(Self { slots })
    }

    pub(crate) fn from_parameters(slots: Vec<Parameter>) -> Self {
        Self { slots }
    }

    /// Declared slots
    pub fn slots(&self) -> &[Parameter] {
        &self.slots
    }

    /// Number of declared slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the signature takes no arguments
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Validate each slot against the argument at its position.
    ///
    /// Absent slots before the last present one become undef so later
    /// values keep their positions; trailing absent slots are dropped.
    pub(crate) fn verify_slots(&self, args: &[Value]) -> CallResult<Vec<Value>> {
        if args.len() > self.slots.len() {
            return Err(CallError::TooManyArguments {
                expected: self.slots.len(),
                got: args.len(),
            });
        }

        let mut values: Vec<Option<Value>> = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.iter().enumerate() {
            values.push(slot.validate(args.get(index))?);
        }

        let present = values.iter().rposition(Option::is_some).map_or(0, |i| i + 1);
        values.truncate(present);
        Ok(values.into_iter().map(Option::unwrap_or_default).collect())
    }
}

impl Signature for PositionalSignature {
    fn verify_arguments(&self, args: &[Value]) -> CallResult<Arguments> {
        self.verify_slots(args).map(Arguments::Positional)
    }
}

impl fmt::Display for PositionalSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        write_params(f, self.slots.iter())?;
        write!(f, ")")
    }
}
