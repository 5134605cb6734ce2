use miette::Diagnostic;
use pkgmeta_core::error::MetadataError;
use thiserror::Error;

/// Errors surfaced by the command-line frontend.
#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    #[diagnostic(code(pkgmeta::cli::json))]
    Json(#[from] serde_json::Error),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
