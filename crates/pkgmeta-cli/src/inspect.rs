use std::path::Path;

use nu_ansi_term::Color::{Blue, Cyan, Green, Red};
use pkgmeta_core::Metadata;
use serde::Serialize;
use tracing::{error, info};

use crate::{error::CliResult, utils::Colored};

/// Prints the metadata declared by a package description document.
pub fn inspect(file: &Path, json: bool) -> CliResult<()> {
    let meta = Metadata::from_path(file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&meta)?);
        return Ok(());
    }

    println!(
        "{} {}",
        Colored(Blue, meta.name()),
        Colored(Cyan, meta.version())
    );
    println!("{}", meta.description());

    println!("\n{}", Colored(Green, "Maintainers"));
    for contact in meta.maintainers() {
        println!("  {contact}");
    }

    println!("\n{}", Colored(Green, "Licenses"));
    for license in meta.licenses() {
        println!("  {license}");
    }

    if !meta.urls().is_empty() {
        println!("\n{}", Colored(Green, "Urls"));
        for url in meta.urls() {
            println!("  {url}");
        }
    }

    if !meta.authors().is_empty() {
        println!("\n{}", Colored(Green, "Authors"));
        for contact in meta.authors() {
            println!("  {contact}");
        }
    }

    for (label, entries) in [
        ("Depends", meta.depends()),
        ("Conflicts", meta.conflicts()),
        ("Replaces", meta.replaces()),
    ] {
        if !entries.is_empty() {
            println!("\n{}", Colored(Green, label));
            for dependency in entries {
                println!("  {dependency}");
            }
        }
    }

    if !meta.generics().is_empty() {
        println!("\n{}", Colored(Green, "Other metadata"));
        for generic in meta.generics() {
            println!("  {}: {}", generic.tag, generic.contents);
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct Validation {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Parses the document and reports whether it satisfies the schema.
/// Returns the process exit code.
pub fn validate(file: &Path, json: bool) -> CliResult<i32> {
    let outcome = match Metadata::from_path(file) {
        Ok(_) => Validation {
            valid: true,
            error: None,
        },
        Err(err) => Validation {
            valid: false,
            error: Some(err.message()),
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if outcome.valid {
        info!(
            "{} {} is a valid package description",
            Colored(Green, "✓"),
            file.display()
        );
    } else {
        error!(
            "{} {}: {}",
            Colored(Red, "✗"),
            file.display(),
            outcome.error.as_deref().unwrap_or_default()
        );
    }

    Ok(if outcome.valid { 0 } else { 1 })
}
