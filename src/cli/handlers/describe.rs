// src/cli/handlers/describe.rs

use crate::{
    CancellationToken,
    cli::args::DescribeArgs,
    core::manifest::{OptionDescriptor, ToolManifest},
};
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::fmt::Write;

/// The main handler for the `describe` command.
pub fn handle(args: Vec<String>, _cancellation_token: &CancellationToken) -> Result<()> {
    let describe_args = DescribeArgs::try_parse_from(&args)?;
    let manifest = ToolManifest::load(&describe_args.manifest).with_context(|| {
        format!(
            "Failed to load manifest '{}'",
            describe_args.manifest.display()
        )
    })?;

    if describe_args.json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
    } else {
        print!("{}", describe(&manifest)?);
    }
    Ok(())
}

fn describe(manifest: &ToolManifest) -> Result<String> {
    let mut out = String::new();
    let command = &manifest.command;
    writeln!(
        out,
        "\n--- {} '{}' ---",
        "Command".bold(),
        command.id.yellow()
    )?;
    let mut invocation = vec![command.executable.as_str()];
    invocation.extend(command.arguments.iter().map(String::as_str));
    writeln!(out, "  {:<12} {}", "Invocation".blue(), invocation.join(" ").cyan())?;
    if let Some(description) = &command.description {
        writeln!(out, "  {:<12} {}", "About".blue(), description)?;
    }

    if manifest.options.is_empty() {
        writeln!(out, "\n  {}", "No options declared.".dimmed())?;
        return Ok(out);
    }

    writeln!(out, "\n{}", "Options:".bold())?;
    for option in &manifest.options {
        writeln!(out, "  {}", option_line(option))?;
        if let Some(description) = &option.description {
            writeln!(out, "      {}", description.dimmed())?;
        }
    }
    Ok(out)
}

fn option_line(option: &OptionDescriptor) -> String {
    let kind = match option.value_type {
        Some(value_type) => format!("{:?}<{}>", option.kind, value_type.name()),
        None => format!("{:?}", option.kind),
    };
    let format = match (&option.format, &option.alt_format) {
        (Some(format), Some(alt)) => format!("{} | {}", format, alt),
        (Some(format), None) => format.clone(),
        (None, _) => "(not rendered)".to_string(),
    };
    let mut flags = Vec::new();
    if option.required {
        flags.push("required".red().to_string());
    }
    if option.secret {
        flags.push("secret".magenta().to_string());
    }
    if let Some(separator) = &option.separator {
        flags.push(format!("separator '{}'", separator));
    }

    let mut line = format!("{:<20} {:<18} {}", option.name.green(), kind, format.cyan());
    if !flags.is_empty() {
        line.push_str(&format!(" [{}]", flags.join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::handlers::commons::fixtures::*;

    #[test]
    fn test_describe_lists_every_option() {
        let file = manifest_file(PACK_MANIFEST);
        let manifest = ToolManifest::load(file.path()).unwrap();
        let text = describe(&manifest).unwrap();
        for name in ["Project", "NoBuild", "Properties", "ApiKey"] {
            assert!(text.contains(name), "missing {} in:\n{}", name, text);
        }
        assert!(text.contains("The project file to pack."));
        assert!(text.contains("/property:{key}={value}"));
    }

    #[test]
    fn test_json_round_trips_manifest() {
        let file = manifest_file(PACK_MANIFEST);
        let manifest = ToolManifest::load(file.path()).unwrap();
        let json = serde_json::to_string(&manifest).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["command"]["executable"], "dotnet");
        assert_eq!(value["options"][2]["altFormat"], "/property:{key}={value}");
        assert_eq!(value["options"][3]["secret"], true);
    }
}
