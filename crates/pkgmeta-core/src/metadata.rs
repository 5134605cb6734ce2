//! Package metadata document parsing.
//!
//! [`Metadata`] is the validated, strongly-typed view of one package
//! description document. Construction either yields a fully populated
//! aggregate or fails; there is no partially-valid state. Once built the
//! value is immutable and can be shared freely across threads.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::{
    error::SchemaError,
    records::{Contact, Dependency, GenericMetadata, License, Url},
    xml::{Document, Element},
    MetaResult,
};

/// The one root tag a metadata document may carry.
pub const ROOT_TAG: &str = "package";

/// The only schema revision this release understands.
pub const SUPPORTED_FORMAT: u32 = 3;

/// Validated metadata for one package.
///
/// The required elements — `name`, `version`, `description`, at least one
/// `maintainer` and at least one `license` — are guaranteed present and
/// non-empty on every constructed value. Everything else is optional.
/// When `name`, `version` or `description` repeats, the last occurrence
/// wins.
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    name: String,
    version: String,
    description: String,
    maintainers: Vec<Contact>,
    licenses: Vec<License>,
    urls: Vec<Url>,
    authors: Vec<Contact>,
    depends: Vec<Dependency>,
    conflicts: Vec<Dependency>,
    replaces: Vec<Dependency>,
    generic: Vec<GenericMetadata>,
    #[serde(skip)]
    document: Document,
}

impl Metadata {
    /// Reads and validates a metadata document from a file on disk.
    pub fn from_path(path: &Path) -> MetaResult<Self> {
        Self::from_document(Document::from_path(path)?)
    }

    /// Parses and validates a metadata document held in memory.
    pub fn parse(source: &str) -> MetaResult<Self> {
        Self::from_document(Document::parse(source)?)
    }

    /// Validates an already-loaded document.
    pub fn from_document(document: Document) -> MetaResult<Self> {
        let root = document.root();
        if root.tag() != ROOT_TAG {
            return Err(SchemaError::WrongRoot {
                found: root.tag().to_string(),
            }
            .into());
        }

        let format = root.attribute("format").ok_or(SchemaError::MissingFormat)?;
        let format: u32 = format.trim().parse().map_err(|_| {
            SchemaError::InvalidFormat {
                value: format.to_string(),
            }
        })?;

        match format {
            SUPPORTED_FORMAT => Self::parse_format3(document),
            version => Err(SchemaError::UnsupportedFormat { version }.into()),
        }
    }

    fn parse_format3(document: Document) -> MetaResult<Self> {
        let mut name = String::new();
        let mut version = String::new();
        let mut description = String::new();
        let mut maintainers = Vec::new();
        let mut licenses = Vec::new();
        let mut urls = Vec::new();
        let mut authors = Vec::new();
        let mut depends = Vec::new();
        let mut conflicts = Vec::new();
        let mut replaces = Vec::new();
        let mut generic = Vec::new();

        for element in document.root().children() {
            match element.tag() {
                "name" => name = element.text(),
                "version" => version = element.text(),
                "description" => description = element.text(),
                "maintainer" => maintainers.push(Contact::from(element)),
                "license" => licenses.push(License::from(element)),
                "url" => urls.push(Url::from(element)),
                "author" => authors.push(Contact::from(element)),
                "depend" => depends.push(Dependency::from(element)),
                "conflict" => conflicts.push(Dependency::from(element)),
                "replace" => replaces.push(Dependency::from(element)),
                tag if !element.has_children() => {
                    debug!("retaining unrecognized metadata tag <{tag}>");
                    generic.push(GenericMetadata::from(element));
                }
                // unrecognized with children: stays reachable through raw()
                tag => debug!("ignoring unrecognized element <{tag}>"),
            }
        }

        for (field, empty) in [
            ("name", name.is_empty()),
            ("version", version.is_empty()),
            ("description", description.is_empty()),
            ("maintainer", maintainers.is_empty()),
            ("license", licenses.is_empty()),
        ] {
            if empty {
                return Err(SchemaError::MissingField { field }.into());
            }
        }

        Ok(Metadata {
            name,
            version,
            description,
            maintainers,
            licenses,
            urls,
            authors,
            depends,
            conflicts,
            replaces,
            generic,
            document,
        })
    }

    /// Short package name, often used as a menu entry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable version string, typically in triplet format.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Text-only description of the package. No markup.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// At least one maintainer is always present.
    pub fn maintainers(&self) -> &[Contact] {
        &self.maintainers
    }

    /// At least one license is always present.
    pub fn licenses(&self) -> &[License] {
        &self.licenses
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    pub fn authors(&self) -> &[Contact] {
        &self.authors
    }

    /// Packages this package requires prior to use.
    pub fn depends(&self) -> &[Dependency] {
        &self.depends
    }

    /// Packages this package conflicts with.
    pub fn conflicts(&self) -> &[Dependency] {
        &self.conflicts
    }

    /// Packages this package is intended to replace.
    pub fn replaces(&self) -> &[Dependency] {
        &self.replaces
    }

    /// All unrecognized childless tags, in document order.
    pub fn generics(&self) -> &[GenericMetadata] {
        &self.generic
    }

    /// Unrecognized childless tags with the given tag name, in document
    /// order.
    pub fn generic(&self, tag: &str) -> Vec<&GenericMetadata> {
        self.generic
            .iter()
            .filter(|record| record.tag == tag)
            .collect()
    }

    /// The underlying element tree, for unrecognized multi-level metadata.
    pub fn raw(&self) -> &Element {
        self.document.root()
    }
}
