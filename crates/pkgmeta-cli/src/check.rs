use std::{collections::HashMap, path::Path};

use nu_ansi_term::Color::{Green, Red, Yellow};
use pkgmeta_core::{Dependency, MetaResult, Metadata};
use serde::Serialize;
use tracing::{info, warn};

use crate::{error::CliResult, utils::Colored};

/// One dependency or conflict entry, resolved against the installed set.
#[derive(Debug, Serialize)]
pub struct Entry {
    pub package: String,
    pub requirement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed: Option<String>,
}

impl Entry {
    fn new(dependency: &Dependency, installed: Option<&str>) -> Self {
        Entry {
            package: dependency.package.clone(),
            requirement: dependency.to_string(),
            installed: installed.map(str::to_string),
        }
    }
}

/// Outcome of resolving a package's declared relationships against a set
/// of installed packages.
#[derive(Debug, Default, Serialize)]
pub struct CheckReport {
    pub satisfied: Vec<Entry>,
    pub missing: Vec<Entry>,
    pub violated: Vec<Entry>,
    pub conflicts: Vec<Entry>,
    pub replaced: Vec<Entry>,
}

impl CheckReport {
    /// True when every dependency is satisfied and no conflict triggers.
    pub fn ok(&self) -> bool {
        self.missing.is_empty() && self.violated.is_empty() && self.conflicts.is_empty()
    }
}

/// Resolves the metadata's depend/conflict/replace entries against the
/// installed set. Pure; printing is the caller's job.
pub fn evaluate(
    meta: &Metadata,
    installed: &HashMap<String, String>,
) -> MetaResult<CheckReport> {
    let mut report = CheckReport::default();

    for dependency in meta.depends() {
        match installed.get(&dependency.package) {
            None => report.missing.push(Entry::new(dependency, None)),
            Some(version) => {
                let entry = Entry::new(dependency, Some(version.as_str()));
                if dependency.matches(version)? {
                    report.satisfied.push(entry);
                } else {
                    report.violated.push(entry);
                }
            }
        }
    }

    for conflict in meta.conflicts() {
        if let Some(version) = installed.get(&conflict.package) {
            if conflict.matches(version)? {
                report
                    .conflicts
                    .push(Entry::new(conflict, Some(version.as_str())));
            }
        }
    }

    for replace in meta.replaces() {
        if let Some(version) = installed.get(&replace.package) {
            report
                .replaced
                .push(Entry::new(replace, Some(version.as_str())));
        }
    }

    Ok(report)
}

/// Checks installability of the described package. Returns the process
/// exit code.
pub fn check(file: &Path, installed: &[(String, String)], json: bool) -> CliResult<i32> {
    let meta = Metadata::from_path(file)?;
    let installed: HashMap<String, String> = installed.iter().cloned().collect();
    let report = evaluate(&meta, &installed)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(if report.ok() { 0 } else { 1 });
    }

    for entry in &report.satisfied {
        info!(
            "{} {} (installed {})",
            Colored(Green, "✓"),
            entry.requirement,
            entry.installed.as_deref().unwrap_or_default()
        );
    }
    for entry in &report.missing {
        warn!("{} {} is not installed", Colored(Red, "✗"), entry.requirement);
    }
    for entry in &report.violated {
        warn!(
            "{} {} (installed {})",
            Colored(Red, "✗"),
            entry.requirement,
            entry.installed.as_deref().unwrap_or_default()
        );
    }
    for entry in &report.conflicts {
        warn!(
            "{} conflicts with {} (installed {})",
            Colored(Red, "✗"),
            entry.package,
            entry.installed.as_deref().unwrap_or_default()
        );
    }
    for entry in &report.replaced {
        info!(
            "{} replaces installed {}",
            Colored(Yellow, "•"),
            entry.package
        );
    }

    if report.ok() {
        info!("{} is installable", meta.name());
        Ok(0)
    } else {
        warn!("{} is not installable", meta.name());
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> Metadata {
        Metadata::parse(
            r#"
            <package format="3">
              <name>sketcher</name>
              <version>1.2.3</version>
              <description>d</description>
              <maintainer>m</maintainer>
              <license>MIT</license>
              <depend version_gte="1.0">base</depend>
              <depend>draw</depend>
              <conflict version_lt="2.0">legacy</conflict>
              <replace>old-sketcher</replace>
            </package>"#,
        )
        .unwrap()
    }

    fn installed(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, version)| (name.to_string(), version.to_string()))
            .collect()
    }

    #[test]
    fn all_satisfied_when_versions_fit() {
        let report = evaluate(
            &meta(),
            &installed(&[("base", "1.4"), ("draw", "0.1"), ("legacy", "2.1")]),
        )
        .unwrap();
        assert!(report.ok());
        assert_eq!(report.satisfied.len(), 2);
        assert!(report.conflicts.is_empty());
    }

    #[test]
    fn missing_dependency_fails_the_check() {
        let report = evaluate(&meta(), &installed(&[("base", "1.4")])).unwrap();
        assert!(!report.ok());
        assert_eq!(report.missing.len(), 1);
        assert_eq!(report.missing[0].package, "draw");
    }

    #[test]
    fn out_of_range_dependency_is_violated() {
        let report = evaluate(
            &meta(),
            &installed(&[("base", "0.9"), ("draw", "0.1")]),
        )
        .unwrap();
        assert!(!report.ok());
        assert_eq!(report.violated.len(), 1);
        assert_eq!(report.violated[0].package, "base");
    }

    #[test]
    fn installed_conflict_triggers() {
        let report = evaluate(
            &meta(),
            &installed(&[("base", "1.4"), ("draw", "0.1"), ("legacy", "1.5")]),
        )
        .unwrap();
        assert!(!report.ok());
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].package, "legacy");
    }

    #[test]
    fn replaced_packages_are_reported_without_failing() {
        let report = evaluate(
            &meta(),
            &installed(&[("base", "1.4"), ("draw", "0.1"), ("old-sketcher", "0.9")]),
        )
        .unwrap();
        assert!(report.ok());
        assert_eq!(report.replaced.len(), 1);
    }
}
