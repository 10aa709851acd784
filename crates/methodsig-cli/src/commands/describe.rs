//! `methodsig describe`: Print each method's signature.

use std::path::Path;

use super::load;

pub fn execute(manifest: &Path, class: Option<&str>) -> anyhow::Result<()> {
    print!("{}", render(manifest, class)?);
    Ok(())
}

/// One line per method: `Class::name(signature) [style]`, followed by its
/// attributes when it has any.
fn render(manifest: &Path, class: Option<&str>) -> anyhow::Result<String> {
    let loaded = load(manifest, class)?;
    let mut out = String::new();
    for method in &loaded.methods {
        let signature = method.signature();
        out.push_str(&format!(
            "{}::{}{} [{}]\n",
            method.class(),
            method.name(),
            signature,
            signature.style()
        ));
        if !method.attributes().is_empty() {
            let attributes = serde_json::to_string(method.attributes())?;
            out.push_str(&format!("    attributes: {}\n", attributes));
        }
    }
    Ok(out)
}
