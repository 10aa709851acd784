//! Subcommand implementations.

pub mod check;
pub mod describe;
pub mod verify;

use std::path::Path;

use anyhow::Context;
use methodsig_engine::{body, MethodRef, Runtime, SignatureManifest};
use methodsig_sdk::Value;
use tracing::debug;

/// Class used when neither the manifest nor `--class` names one
pub const DEFAULT_CLASS: &str = "main";

/// A manifest declared on a fresh runtime
pub struct Loaded {
    pub runtime: Runtime,
    pub class: String,
    pub methods: Vec<MethodRef>,
}

/// Load `path` and declare every method with a body that echoes its
/// normalized arguments as JSON.
pub fn load(path: &Path, class: Option<&str>) -> anyhow::Result<Loaded> {
    let manifest = SignatureManifest::from_path(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let class = class
        .map(str::to_string)
        .or_else(|| manifest.class.clone())
        .unwrap_or_else(|| DEFAULT_CLASS.to_string());

    let runtime = Runtime::new();
    let methods = runtime
        .declare_manifest(&class, &manifest, |_| {
            Some(body(|_, args| Ok(Value::from(args.to_json()))))
        })
        .with_context(|| format!("{} is not a valid signature manifest", path.display()))?;
    debug!(class = %class, methods = methods.len(), "manifest loaded");

    Ok(Loaded {
        runtime,
        class,
        methods,
    })
}

#[cfg(test)]
pub(crate) fn fixture(name: &str) -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}
