//! Signatures - argument verification for one method
//!
//! A signature turns the raw argument list of a call into normalized
//! [`Arguments`], or fails with the first [`CallError`] it meets. There are
//! three styles:
//!
//! | Style        | Raw arguments                          | Normalized form                 |
//! |--------------|----------------------------------------|---------------------------------|
//! | `Positional` | `v1, v2, ...`                          | `Arguments::Positional(vec)`    |
//! | `Named`      | `name1, v1, name2, v2, ...`            | `Arguments::Named(map)`         |
//! | `Semi`       | `p1, ..., pk, name1, v1, ...`          | `Arguments::Semi { .. }`        |
//!
//! [`AnySignature`] is the tagged union the method wrapper stores, so a
//! call dispatches on the variant without a vtable.

mod named;
mod positional;
mod semi;

use std::fmt;

use indexmap::IndexMap;

use methodsig_sdk::{CallError, CallResult, Value, ValueMap};

use crate::param::Parameter;

pub use named::NamedSignature;
pub use positional::PositionalSignature;
pub use semi::SemiSignature;

/// Normalized named arguments, in declaration order
pub type NamedArgs = ValueMap;

/// Argument verification contract.
pub trait Signature: Send + Sync + fmt::Debug {
    /// Verify raw call arguments and normalize them
    fn verify_arguments(&self, args: &[Value]) -> CallResult<Arguments>;
}

/// Signature style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureStyle {
    /// Name/value pairs
    Named,
    /// Ordered values
    Positional,
    /// Leading positional values, then name/value pairs
    Semi,
}

impl fmt::Display for SignatureStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureStyle::Named => write!(f, "named"),
            SignatureStyle::Positional => write!(f, "positional"),
            SignatureStyle::Semi => write!(f, "semi"),
        }
    }
}

// ============================================================================
// Arguments
// ============================================================================

/// Verified, normalized arguments handed to a method body.
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    /// One value per slot, trailing absent slots dropped
    Positional(Vec<Value>),
    /// Named values, absent optional parameters omitted
    Named(NamedArgs),
    /// Positional prefix plus named remainder
    Semi {
        /// Leading positional values
        positional: Vec<Value>,
        /// Trailing named values
        named: NamedArgs,
    },
}

impl Arguments {
    /// Positional values (empty for named signatures)
    pub fn positional(&self) -> &[Value] {
        match self {
            Arguments::Positional(values) | Arguments::Semi { positional: values, .. } => values,
            Arguments::Named(_) => &[],
        }
    }

    /// Named values (`None` for positional signatures)
    pub fn named(&self) -> Option<&NamedArgs> {
        match self {
            Arguments::Named(named) | Arguments::Semi { named, .. } => Some(named),
            Arguments::Positional(_) => None,
        }
    }

    /// Positional value by index
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.positional().get(index)
    }

    /// Named value by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.named().and_then(|named| named.get(name))
    }

    /// Flatten to the "positional values, then a trailing options hash"
    /// call convention. Positional signatures yield just their values.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Arguments::Positional(values) => values,
            Arguments::Named(named) => vec![Value::from(named)],
            Arguments::Semi {
                mut positional,
                named,
            } => {
                positional.push(Value::from(named));
                positional
            }
        }
    }

    /// JSON form: array, object, or `{"positional": [...], "named": {...}}`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Arguments::Positional(values) => Value::array(values.iter().cloned()).to_json(),
            Arguments::Named(named) => Value::from(named.clone()).to_json(),
            Arguments::Semi { positional, named } => serde_json::json!({
                "positional": Value::array(positional.iter().cloned()).to_json(),
                "named": Value::from(named.clone()).to_json(),
            }),
        }
    }
}

// ============================================================================
// AnySignature
// ============================================================================

/// Any of the three signature styles.
#[derive(Debug, Clone)]
pub enum AnySignature {
    /// Named signature
    Named(NamedSignature),
    /// Positional signature
    Positional(PositionalSignature),
    /// Semi signature
    Semi(SemiSignature),
}

impl AnySignature {
    /// Style of the wrapped signature
    pub fn style(&self) -> SignatureStyle {
        match self {
            AnySignature::Named(_) => SignatureStyle::Named,
            AnySignature::Positional(_) => SignatureStyle::Positional,
            AnySignature::Semi(_) => SignatureStyle::Semi,
        }
    }

    /// All parameters, positional ones first
    pub fn parameters(&self) -> Vec<&Parameter> {
        match self {
            AnySignature::Named(sig) => sig.slots().values().collect(),
            AnySignature::Positional(sig) => sig.slots().iter().collect(),
            AnySignature::Semi(sig) => sig
                .positional_slots()
                .iter()
                .chain(sig.named_slots().values())
                .collect(),
        }
    }
}

impl Signature for AnySignature {
    fn verify_arguments(&self, args: &[Value]) -> CallResult<Arguments> {
        match self {
            AnySignature::Named(sig) => sig.verify_arguments(args),
            AnySignature::Positional(sig) => sig.verify_arguments(args),
            AnySignature::Semi(sig) => sig.verify_arguments(args),
        }
    }
}

impl fmt::Display for AnySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnySignature::Named(sig) => sig.fmt(f),
            AnySignature::Positional(sig) => sig.fmt(f),
            AnySignature::Semi(sig) => sig.fmt(f),
        }
    }
}

impl From<NamedSignature> for AnySignature {
    fn from(sig: NamedSignature) -> Self {
        AnySignature::Named(sig)
    }
}

impl From<PositionalSignature> for AnySignature {
    fn from(sig: PositionalSignature) -> Self {
        AnySignature::Positional(sig)
    }
}

impl From<SemiSignature> for AnySignature {
    fn from(sig: SemiSignature) -> Self {
        AnySignature::Semi(sig)
    }
}

// ============================================================================
// Shared named-argument handling
// ============================================================================

/// Pair up alternating name/value arguments. Later duplicates win.
fn collect_pairs(raw: &[Value]) -> CallResult<IndexMap<&str, &Value>> {
    if raw.len() % 2 != 0 {
        return Err(CallError::MalformedNamedArguments {
            reason: format!("expected name/value pairs, got {} values", raw.len()),
        });
    }

    let mut pairs = IndexMap::with_capacity(raw.len() / 2);
    for chunk in raw.chunks_exact(2) {
        let name = chunk[0]
            .as_str()
            .ok_or_else(|| CallError::MalformedNamedArguments {
                reason: format!("parameter name must be a string, got {}", chunk[0]),
            })?;
        pairs.insert(name, &chunk[1]);
    }
    Ok(pairs)
}

/// Verify name/value pairs against named slots.
///
/// Unknown names are rejected before any slot is validated.
fn verify_named(slots: &IndexMap<String, Parameter>, raw: &[Value]) -> CallResult<NamedArgs> {
    let pairs = collect_pairs(raw)?;

    if let Some(unknown) = pairs.keys().find(|name| !slots.contains_key(**name)) {
        return Err(CallError::UnknownParameter {
            name: unknown.to_string(),
        });
    }

    let mut named = NamedArgs::with_capacity(slots.len());
    for (name, param) in slots {
        if let Some(value) = param.validate(pairs.get(name.as_str()).copied())? {
            named.insert(name.clone(), value);
        }
    }
    Ok(named)
}

fn write_params<'a>(
    f: &mut fmt::Formatter<'_>,
    params: impl Iterator<Item = &'a Parameter>,
) -> fmt::Result {
    for (i, param) in params.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", param)?;
    }
    Ok(())
}
