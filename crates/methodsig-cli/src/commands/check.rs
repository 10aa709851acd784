//! `methodsig check`: Validate a manifest by declaring every method.

use std::path::Path;

use super::load;

pub fn execute(manifest: &Path, class: Option<&str>) -> anyhow::Result<()> {
    print!("{}", report(manifest, class)?);
    Ok(())
}

fn report(manifest: &Path, class: Option<&str>) -> anyhow::Result<String> {
    let loaded = load(manifest, class)?;
    let mut out = String::new();
    for method in &loaded.methods {
        out.push_str(&format!("  ok  {}::{}\n", method.class(), method.name()));
    }
    out.push_str(&format!(
        "{} method(s) declared on {}\n",
        loaded.methods.len(),
        loaded.class
    ));
    Ok(out)
}
