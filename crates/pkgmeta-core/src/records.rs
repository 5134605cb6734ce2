//! Typed records extracted from individual metadata elements.
//!
//! Each record is built from one element by a pure mapping that never
//! fails: missing optional attributes default to empty/absent, and no
//! cross-field consistency is checked. A [`Dependency`] declaring
//! contradictory bounds is stored as-is; resolving bounds is
//! [`Dependency::matches`]' job, not the extractor's.

use std::{collections::HashMap, fmt, path::PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::{condition, error::MatchError, version::Triplet, xml::Element};

/// A person or company representing a point of contact for the package,
/// either author or maintainer.
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub name: String,
    /// Empty when the element carries no `email` attribute.
    pub email: String,
}

impl From<&Element> for Contact {
    fn from(element: &Element) -> Self {
        Contact {
            name: element.text(),
            email: element.attribute("email").unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.email.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} <{}>", self.name, self.email)
        }
    }
}

/// A license that covers some or all of the package.
#[derive(Debug, Clone, Serialize)]
pub struct License {
    /// Short license name, e.g. "MIT" or "LGPL-2.1-or-later".
    pub name: String,
    /// Path to the full license text, relative to the metadata document's
    /// own location. Resolving and reading it is the caller's job.
    pub file: Option<PathBuf>,
}

impl From<&Element> for License {
    fn from(element: &Element) -> Self {
        License {
            name: element.text(),
            file: element
                .attribute("file")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
        }
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(file) = &self.file {
            write!(f, " ({})", file.display())?;
        }
        Ok(())
    }
}

/// What kind of URL a [`Url`] record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlKind {
    Website,
    Repository,
    Bugtracker,
}

impl fmt::Display for UrlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlKind::Website => write!(f, "website"),
            UrlKind::Repository => write!(f, "repository"),
            UrlKind::Bugtracker => write!(f, "bugtracker"),
        }
    }
}

/// A URL attached to the package, with type information.
#[derive(Debug, Clone, Serialize)]
pub struct Url {
    /// The actual URL, including protocol.
    pub location: String,
    pub kind: UrlKind,
}

impl From<&Element> for Url {
    fn from(element: &Element) -> Self {
        let kind = match element.attribute("type").unwrap_or_default() {
            "" | "website" => UrlKind::Website,
            "repository" => UrlKind::Repository,
            "bugtracker" => UrlKind::Bugtracker,
            other => {
                debug!("unrecognized url type '{other}', falling back to website");
                UrlKind::Website
            }
        };
        Url {
            location: element.text(),
            kind,
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.location, self.kind)
    }
}

/// Another package that this package depends on, conflicts with, or
/// replaces.
///
/// The version fields are declarative constraints only; nothing is
/// evaluated at construction time.
#[derive(Debug, Clone, Serialize)]
pub struct Dependency {
    /// Must exactly match the `name` element of the referenced package's
    /// own metadata document.
    pub package: String,
    pub version_lt: Option<String>,
    pub version_lte: Option<String>,
    pub version_eq: Option<String>,
    pub version_gte: Option<String>,
    pub version_gt: Option<String>,
    /// Conditional expression over `$VERSION`; takes precedence over all
    /// version bounds when present.
    pub condition: Option<String>,
}

impl From<&Element> for Dependency {
    fn from(element: &Element) -> Self {
        let attr = |name| {
            element
                .attribute(name)
                .filter(|value: &&str| !value.is_empty())
                .map(str::to_string)
        };
        Dependency {
            package: element.text(),
            version_lt: attr("version_lt"),
            version_lte: attr("version_lte"),
            version_eq: attr("version_eq"),
            version_gte: attr("version_gte"),
            version_gt: attr("version_gt"),
            condition: attr("condition"),
        }
    }
}

impl Dependency {
    /// Checks a candidate version string against this dependency.
    ///
    /// When `condition` is present it alone decides the outcome; any
    /// version bounds on the same dependency are ignored. Otherwise every
    /// present bound must hold: `version_eq` is an exact string match, the
    /// relational bounds compare as version triplets. A bound or candidate
    /// that is not triplet-shaped restricts nothing. With no bounds and no
    /// condition, any candidate satisfies the dependency.
    pub fn matches(&self, candidate: &str) -> Result<bool, MatchError> {
        if let Some(condition) = &self.condition {
            return condition::evaluate(condition, candidate);
        }

        if let Some(expected) = &self.version_eq {
            if expected != candidate {
                return Ok(false);
            }
        }

        let candidate = Triplet::parse(candidate);
        let holds = |bound: &Option<String>, accepts: fn(std::cmp::Ordering) -> bool| {
            match (candidate, bound.as_deref().and_then(Triplet::parse)) {
                (Some(candidate), Some(bound)) => accepts(candidate.cmp(&bound)),
                // a malformed side makes the bound non-restrictive
                _ => true,
            }
        };

        Ok(holds(&self.version_lt, std::cmp::Ordering::is_lt)
            && holds(&self.version_lte, std::cmp::Ordering::is_le)
            && holds(&self.version_gte, std::cmp::Ordering::is_ge)
            && holds(&self.version_gt, std::cmp::Ordering::is_gt))
    }

    /// True when the dependency carries no version bounds and no
    /// condition.
    pub fn is_unconstrained(&self) -> bool {
        self.version_lt.is_none()
            && self.version_lte.is_none()
            && self.version_eq.is_none()
            && self.version_gte.is_none()
            && self.version_gt.is_none()
            && self.condition.is_none()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.package)?;
        if let Some(condition) = &self.condition {
            return write!(f, " (if {condition})");
        }
        let mut bounds = Vec::new();
        if let Some(v) = &self.version_lt {
            bounds.push(format!("< {v}"));
        }
        if let Some(v) = &self.version_lte {
            bounds.push(format!("<= {v}"));
        }
        if let Some(v) = &self.version_eq {
            bounds.push(format!("== {v}"));
        }
        if let Some(v) = &self.version_gte {
            bounds.push(format!(">= {v}"));
        }
        if let Some(v) = &self.version_gt {
            bounds.push(format!("> {v}"));
        }
        if !bounds.is_empty() {
            write!(f, " ({})", bounds.join(", "))?;
        }
        Ok(())
    }
}

/// An unrecognized, childless top-level tag, preserved as a
/// tag/attributes/contents triple for forward compatibility.
#[derive(Debug, Clone, Serialize)]
pub struct GenericMetadata {
    /// The tag this record was extracted from.
    pub tag: String,
    /// The text contents of the tag.
    pub contents: String,
    /// The tag's attributes; keys are unique, order is irrelevant.
    pub attributes: HashMap<String, String>,
}

impl From<&Element> for GenericMetadata {
    fn from(element: &Element) -> Self {
        GenericMetadata {
            tag: element.tag().to_string(),
            contents: element.text(),
            attributes: element
                .attributes()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Document;

    fn first_child(source: &str) -> Element {
        Document::parse(source).unwrap().root().children()[0].clone()
    }

    #[test]
    fn contact_reads_name_and_email() {
        let element =
            first_child(r#"<m><maintainer email="jo@example.org">Jo Doe</maintainer></m>"#);
        let contact = Contact::from(&element);
        assert_eq!(contact.name, "Jo Doe");
        assert_eq!(contact.email, "jo@example.org");
    }

    #[test]
    fn contact_email_defaults_to_empty() {
        let element = first_child("<m><author>Jo Doe</author></m>");
        let contact = Contact::from(&element);
        assert_eq!(contact.email, "");
    }

    #[test]
    fn license_file_is_optional() {
        let with_file = first_child(r#"<m><license file="LICENSE">MIT</license></m>"#);
        let license = License::from(&with_file);
        assert_eq!(license.name, "MIT");
        assert_eq!(license.file, Some(PathBuf::from("LICENSE")));

        let without = first_child("<m><license>MIT</license></m>");
        assert_eq!(License::from(&without).file, None);
    }

    #[test]
    fn url_kind_defaults_and_falls_back_to_website() {
        let bare = first_child("<m><url>https://example.org</url></m>");
        assert_eq!(Url::from(&bare).kind, UrlKind::Website);

        let bugtracker =
            first_child(r#"<m><url type="bugtracker">https://example.org/issues</url></m>"#);
        assert_eq!(Url::from(&bugtracker).kind, UrlKind::Bugtracker);

        let repository =
            first_child(r#"<m><url type="repository">https://example.org/src</url></m>"#);
        assert_eq!(Url::from(&repository).kind, UrlKind::Repository);

        let unknown = first_child(r#"<m><url type="mirror">https://example.org</url></m>"#);
        assert_eq!(Url::from(&unknown).kind, UrlKind::Website);
    }

    #[test]
    fn dependency_reads_all_constraint_attributes() {
        let element = first_child(
            r#"<m><depend version_gte="1.0" version_lt="2.0" condition="$VERSION != 1.3">other</depend></m>"#,
        );
        let dep = Dependency::from(&element);
        assert_eq!(dep.package, "other");
        assert_eq!(dep.version_gte.as_deref(), Some("1.0"));
        assert_eq!(dep.version_lt.as_deref(), Some("2.0"));
        assert_eq!(dep.condition.as_deref(), Some("$VERSION != 1.3"));
        assert_eq!(dep.version_eq, None);
    }

    #[test]
    fn empty_constraint_attributes_are_absent() {
        let element = first_child(r#"<m><depend version_eq="">other</depend></m>"#);
        assert!(Dependency::from(&element).is_unconstrained());
    }

    fn dep(source: &str) -> Dependency {
        Dependency::from(&first_child(&format!("<m>{source}</m>")))
    }

    #[test]
    fn unconstrained_dependency_matches_anything() {
        let dependency = dep("<depend>other</depend>");
        assert!(dependency.matches("0.0.1").unwrap());
        assert!(dependency.matches("whatever").unwrap());
    }

    #[test]
    fn gte_bound_matches_at_and_above() {
        let dependency = dep(r#"<depend version_gte="1.2.0">other</depend>"#);
        assert!(dependency.matches("1.2.0").unwrap());
        assert!(dependency.matches("1.3.0").unwrap());
        assert!(!dependency.matches("1.1.9").unwrap());
    }

    #[test]
    fn eq_bound_is_exact_string_match() {
        let dependency = dep(r#"<depend version_eq="2.0.0">other</depend>"#);
        assert!(dependency.matches("2.0.0").unwrap());
        assert!(!dependency.matches("2.0").unwrap());
        assert!(!dependency.matches("2.0.0.1").unwrap());
    }

    #[test]
    fn bounds_combine_with_logical_and() {
        let dependency = dep(r#"<depend version_gte="1.0" version_lt="2.0">other</depend>"#);
        assert!(dependency.matches("1.5").unwrap());
        assert!(!dependency.matches("2.0").unwrap());
        assert!(!dependency.matches("0.9").unwrap());
    }

    #[test]
    fn malformed_bound_restricts_nothing() {
        let dependency = dep(r#"<depend version_gte="next">other</depend>"#);
        assert!(dependency.matches("0.0.1").unwrap());

        let dependency = dep(r#"<depend version_gte="1.0">other</depend>"#);
        assert!(dependency.matches("nightly").unwrap());
    }

    #[test]
    fn condition_takes_precedence_over_bounds() {
        let dependency =
            dep(r#"<depend condition="$VERSION &gt;= 1.0" version_eq="9.9.9">other</depend>"#);
        assert!(dependency.matches("1.5").unwrap());
        assert!(!dependency.matches("0.5").unwrap());
    }

    #[test]
    fn malformed_condition_is_an_error() {
        let dependency = dep(r#"<depend condition="$VERSION &gt;=">other</depend>"#);
        assert!(dependency.matches("1.0").is_err());
    }

    #[test]
    fn matching_is_repeatable() {
        let dependency = dep(r#"<depend version_gte="1.2.0">other</depend>"#);
        for _ in 0..3 {
            assert!(dependency.matches("1.2.0").unwrap());
        }
    }

    #[test]
    fn generic_metadata_captures_tag_text_and_attributes() {
        let element = first_child(r#"<m><custom attr="x">hello</custom></m>"#);
        let generic = GenericMetadata::from(&element);
        assert_eq!(generic.tag, "custom");
        assert_eq!(generic.contents, "hello");
        assert_eq!(generic.attributes.get("attr").map(String::as_str), Some("x"));
        assert_eq!(generic.attributes.len(), 1);
    }

    #[test]
    fn dependency_display_shows_bounds() {
        let dependency = dep(r#"<depend version_gte="1.0" version_lt="2.0">other</depend>"#);
        assert_eq!(dependency.to_string(), "other (< 2.0, >= 1.0)");

        let unconstrained = dep("<depend>other</depend>");
        assert_eq!(unconstrained.to_string(), "other");
    }
}
