//! Signature manifests
//!
//! A manifest declares the signatures of many methods at once, in TOML or
//! JSON. Bodies are not serializable, so they are bound by method name
//! when the manifest is declared.
//!
//! ```toml
//! class = "Greeter"
//!
//! [methods.hello]
//! style = "named"
//! attributes = { metaclass = "traced" }
//! params.who = { isa = "Str", required = true }
//! params.age = { isa = "Int", default = 18 }
//!
//! [methods.greet]
//! style = "semi"
//! positional = [{ isa = "Str" }]
//! named.excited = { isa = "Bool", default = false }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use methodsig_sdk::{DeclareError, ValueMap};

use crate::declare::{Declarer, MethodDeclaration};
use crate::method::{Body, MethodRef};
use crate::param::ParamSpec;
use crate::runtime::Runtime;
use crate::signature::AnySignature;

/// Errors that can occur while loading or declaring a manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("Failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse manifest: {0}")]
    Toml(#[from] toml::de::Error),

    /// Failed to parse JSON
    #[error("Failed to parse manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// A method could not be declared
    #[error("Cannot declare '{method}': {source}")]
    Declare {
        /// Method name
        method: String,
        /// Underlying declaration error
        source: DeclareError,
    },
}

/// Signature manifest for one class
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignatureManifest {
    /// Class the methods belong to (callers may override)
    #[serde(default)]
    pub class: Option<String>,

    /// Methods by name, in file order
    #[serde(default)]
    pub methods: IndexMap<String, MethodEntry>,
}

/// One method in a manifest.
///
/// Only `style`, `attributes` and the keys of that style are accepted; a
/// misspelled key is a parse error rather than a silently empty signature.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawEntry")]
pub struct MethodEntry {
    /// Explicit declaration attributes
    pub attributes: ValueMap,

    /// Signature, tagged by `style`
    pub signature: SignatureSpec,
}

#[derive(Deserialize)]
#[serde(tag = "style", rename_all = "lowercase", deny_unknown_fields)]
enum RawEntry {
    Named {
        #[serde(default)]
        attributes: ValueMap,
        #[serde(default)]
        params: IndexMap<String, ParamSpec>,
    },
    Positional {
        #[serde(default)]
        attributes: ValueMap,
        #[serde(default)]
        params: Vec<ParamSpec>,
    },
    Semi {
        #[serde(default)]
        attributes: ValueMap,
        #[serde(default)]
        positional: Vec<ParamSpec>,
        #[serde(default)]
        named: IndexMap<String, ParamSpec>,
    },
}

impl From<RawEntry> for MethodEntry {
    fn from(raw: RawEntry) -> Self {
        let (attributes, signature) = match raw {
            RawEntry::Named { attributes, params } => (attributes, SignatureSpec::Named { params }),
            RawEntry::Positional { attributes, params } => {
                (attributes, SignatureSpec::Positional { params })
            }
            RawEntry::Semi {
                attributes,
                positional,
                named,
            } => (attributes, SignatureSpec::Semi { positional, named }),
        };
        Self {
            attributes,
            signature,
        }
    }
}

/// Serialized signature, tagged by `style`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "style", rename_all = "lowercase", deny_unknown_fields)]
pub enum SignatureSpec {
    /// `style = "named"`
    Named {
        /// Parameters by name
        #[serde(default)]
        params: IndexMap<String, ParamSpec>,
    },
    /// `style = "positional"`
    Positional {
        /// Parameters in slot order
        #[serde(default)]
        params: Vec<ParamSpec>,
    },
    /// `style = "semi"`
    Semi {
        /// Leading positional parameters
        #[serde(default)]
        positional: Vec<ParamSpec>,
        /// Trailing named parameters
        #[serde(default)]
        named: IndexMap<String, ParamSpec>,
    },
}

impl SignatureSpec {
    /// Build the signature through `declarer`
    pub fn build(&self, declarer: &Declarer<'_>) -> Result<AnySignature, DeclareError> {
        Ok(match self {
            SignatureSpec::Named { params } => declarer.named(params.clone())?.into(),
            SignatureSpec::Positional { params } => declarer.positional(params.clone())?.into(),
            SignatureSpec::Semi { positional, named } => {
                declarer.semi(positional.clone(), named.clone())?.into()
            }
        })
    }
}

impl SignatureManifest {
    /// Parse a TOML manifest
    pub fn from_toml_str(content: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a JSON manifest
    pub fn from_json_str(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a manifest file; `.json` files are JSON, anything else TOML
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        let manifest = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            _ => Self::from_toml_str(&content)?,
        };
        debug!(
            path = %path.display(),
            methods = manifest.methods.len(),
            "loaded signature manifest"
        );
        Ok(manifest)
    }
}

impl Runtime {
    /// Declare every method of `manifest` on `class`.
    ///
    /// `bodies` supplies the body for each method name; a method without a
    /// body fails with `MissingBody`. Stops at the first error; methods
    /// declared before it stay registered.
    pub fn declare_manifest(
        &self,
        class: &str,
        manifest: &SignatureManifest,
        bodies: impl Fn(&str) -> Option<Body>,
    ) -> Result<Vec<MethodRef>, ManifestError> {
        let declarer = self.declarer(class);
        let mut declared = Vec::with_capacity(manifest.methods.len());

        for (name, entry) in &manifest.methods {
            let wrap = |source| ManifestError::Declare {
                method: name.clone(),
                source,
            };
            let signature = entry.signature.build(&declarer).map_err(wrap)?;
            let mut decl = MethodDeclaration::new(name.as_str())
                .attributes(entry.attributes.clone())
                .signature(signature);
            if let Some(body) = bodies(name) {
                decl = decl.body_ref(body);
            }
            declared.push(declarer.method(decl).map_err(wrap)?);
        }

        debug!(class, methods = declared.len(), "declared manifest");
        Ok(declared)
    }
}
