// src/cli/handlers/commons.rs

// Shared helpers for the manifest-based handlers.

use crate::core::manifest::ToolManifest;
use crate::core::render::FormatVariant;
use crate::core::store::OptionStore;
use anyhow::{Context, Result};
use std::path::Path;

/// Loads a manifest and applies the `-s` assignments in order.
pub fn load_with_assignments(
    path: &Path,
    assignments: &[String],
) -> Result<(ToolManifest, OptionStore)> {
    let manifest = ToolManifest::load(path)
        .with_context(|| format!("Failed to load manifest '{}'", path.display()))?;
    let store = manifest
        .apply_assignments(&OptionStore::new(), assignments.iter().map(String::as_str))
        .context("Failed to apply option assignments")?;
    Ok((manifest, store))
}

/// Maps the `--alt` switch to a format variant.
pub fn variant(alternative: bool) -> FormatVariant {
    if alternative {
        FormatVariant::Alternative
    } else {
        FormatVariant::Primary
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Write;
    use tempfile::NamedTempFile;

    pub(crate) const PACK_MANIFEST: &str = r#"
[command]
id = "pack"
executable = "dotnet"
arguments = ["pack"]
description = "Creates a NuGet package."

[[options]]
name = "Project"
kind = "scalar"
format = "{value}"
required = true
description = "The project file to pack."

[[options]]
name = "NoBuild"
kind = "bool"
format = "--no-build"

[[options]]
name = "Properties"
kind = "dictionary"
format = "/p:{key}={value}"
altFormat = "/property:{key}={value}"

[[options]]
name = "ApiKey"
kind = "scalar"
format = "--api-key {value}"
secret = true
"#;

    pub(crate) fn manifest_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }
}
