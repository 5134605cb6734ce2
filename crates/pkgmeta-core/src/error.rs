//! Error types for pkgmeta-core.
//!
//! The error taxonomy mirrors the parse pipeline: [`DocumentError`] for
//! sources that cannot be loaded or are not well-formed markup,
//! [`SchemaError`] for well-formed documents that violate the package
//! schema, and [`MatchError`] for condition expressions that cannot be
//! evaluated. [`MetadataError`] wraps all three for callers that do not
//! care which stage failed.

use miette::Diagnostic;
use thiserror::Error;

/// The source could not be loaded or is not well-formed XML.
///
/// These errors are always fatal to the parse call; no partial metadata
/// object is ever produced.
#[derive(Error, Diagnostic, Debug)]
pub enum DocumentError {
    #[error("Error while {action}")]
    #[diagnostic(
        code(pkgmeta::document::io),
        help("Check that the file exists and is readable")
    )]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Document is not well-formed XML")]
    #[diagnostic(
        code(pkgmeta::document::malformed),
        help("Fix the markup before retrying")
    )]
    Xml(#[from] quick_xml::Error),

    #[error("Document contains no root element")]
    #[diagnostic(code(pkgmeta::document::empty))]
    NoRoot,

    #[error("Document contains more than one top-level element")]
    #[diagnostic(
        code(pkgmeta::document::multiple_roots),
        help("A metadata document must have exactly one root element")
    )]
    MultipleRoots,

    #[error("Document ended before all elements were closed")]
    #[diagnostic(code(pkgmeta::document::truncated))]
    UnexpectedEof,
}

/// The document is well-formed markup but violates the package schema.
#[derive(Error, Diagnostic, Debug)]
pub enum SchemaError {
    #[error("Expected a single <package> root element, found <{found}>")]
    #[diagnostic(code(pkgmeta::schema::wrong_root))]
    WrongRoot { found: String },

    #[error("<package> must carry the 'format' attribute")]
    #[diagnostic(code(pkgmeta::schema::missing_format))]
    MissingFormat,

    #[error("'format' attribute is not an integer: '{value}'")]
    #[diagnostic(code(pkgmeta::schema::invalid_format))]
    InvalidFormat { value: String },

    #[error("Metadata format version {version} is not supported")]
    #[diagnostic(
        code(pkgmeta::schema::unsupported_format),
        help("Only format version 3 is understood by this release")
    )]
    UnsupportedFormat { version: u32 },

    #[error("Required metadata element <{field}> is missing or empty")]
    #[diagnostic(code(pkgmeta::schema::missing_field))]
    MissingField { field: &'static str },
}

/// A dependency condition expression could not be evaluated.
///
/// Malformed conditions are reported rather than silently treated as
/// non-matching; failing open or closed on a dependency constraint is a
/// correctness hazard.
#[derive(Error, Diagnostic, Debug)]
pub enum MatchError {
    #[error("Invalid condition expression: {reason}")]
    #[diagnostic(code(pkgmeta::matcher::parse))]
    Parse { reason: String },

    #[error("Unknown variable '${name}' in condition expression")]
    #[diagnostic(
        code(pkgmeta::matcher::unknown_variable),
        help("Only $VERSION may be referenced in a condition")
    )]
    UnknownVariable { name: String },

    #[error("Condition term '{term}' is not a comparison")]
    #[diagnostic(
        code(pkgmeta::matcher::not_boolean),
        help("Every operand must appear on one side of a comparison operator")
    )]
    NotBoolean { term: String },

    #[error("Condition expression is nested too deeply")]
    #[diagnostic(code(pkgmeta::matcher::too_deep))]
    TooDeep,
}

/// Top-level error type covering every stage of metadata handling.
#[derive(Error, Diagnostic, Debug)]
pub enum MetadataError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Match(#[from] MatchError),
}

impl MetadataError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, DocumentError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, DocumentError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            DocumentError::Io {
                action: context(),
                source: err,
            }
        })
    }
}
