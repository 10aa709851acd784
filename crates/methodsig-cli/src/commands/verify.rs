//! `methodsig verify`: Run one method's argument verification.

use std::path::Path;

use anyhow::{bail, Context};
use methodsig_sdk::Value;

use super::load;

pub fn execute(
    manifest: &Path,
    class: Option<&str>,
    method: &str,
    args: Option<&str>,
) -> anyhow::Result<()> {
    let normalized = verify(manifest, class, method, args.unwrap_or("[]"))?;
    println!("{}", serde_json::to_string_pretty(&normalized)?);
    Ok(())
}

/// Verify `args` (a JSON array of raw arguments) against `method` and
/// return the normalized arguments as JSON.
fn verify(
    manifest: &Path,
    class: Option<&str>,
    method: &str,
    args: &str,
) -> anyhow::Result<serde_json::Value> {
    let raw = match serde_json::from_str::<serde_json::Value>(args).context("Arguments must be JSON")? {
        serde_json::Value::Array(items) => items.into_iter().map(Value::from).collect::<Vec<_>>(),
        other => bail!("Arguments must be a JSON array, got {}", other),
    };

    let loaded = load(manifest, class)?;
    let receiver = Value::str(&loaded.class);
    let normalized = loaded
        .runtime
        .call(&receiver, method, &raw)
        .with_context(|| format!("{}::{} rejected its arguments", loaded.class, method))?;
    Ok(normalized.to_json())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixture;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn greeter(method: &str, args: &str) -> anyhow::Result<serde_json::Value> {
        verify(&fixture("greeter.toml"), None, method, args)
    }

    #[test]
    fn test_named_defaults_filled() {
        let out = greeter("hello", r#"["who", "world"]"#).unwrap();
        assert_eq!(out, json!({"who": "world", "age": 18}));
    }

    #[test]
    fn test_semi_split() {
        let out = greeter("greet", r#"["Jens", "excited", true]"#).unwrap();
        assert_eq!(out, json!({"positional": ["Jens"], "named": {"excited": true}}));
    }

    #[test]
    fn test_positional_default() {
        assert_eq!(greeter("add", "[1]").unwrap(), json!([1, 0]));
    }

    #[test]
    fn test_rejected_arguments() {
        let err = greeter("add", r#"[1, 2, 3]"#).unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "Greeter::add rejected its arguments: Too many arguments: expected at most 2, got 3"
        );

        let err = greeter("hello", "[]").unwrap_err();
        assert!(format!("{:#}", err).ends_with("Parameter (who): Must be specified"));
    }

    #[test]
    fn test_bad_argument_json() {
        assert!(greeter("add", "{").is_err());
        let err = greeter("add", r#"{"who": 1}"#).unwrap_err();
        assert!(err.to_string().starts_with("Arguments must be a JSON array"));
    }

    #[test]
    fn test_unknown_method() {
        let err = greeter("wave", "[]").unwrap_err();
        assert!(format!("{:#}", err).contains("Can't locate method 'wave' via class 'Greeter'"));
    }
}
