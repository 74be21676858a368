//! Paginated project report export.

pub mod layout;
pub mod pdf;
pub mod text;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::io::atomic_write;
use crate::model::project::Project;

pub use layout::{Document, layout};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Pdf,
    Text,
}

impl ReportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Text => "text",
        }
    }

    /// Guess the format from an output path's extension
    pub fn from_path(path: &Path) -> Option<ReportFormat> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "pdf" => Some(ReportFormat::Pdf),
            "txt" | "text" => Some(ReportFormat::Text),
            _ => None,
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "text" | "txt" => Ok(ReportFormat::Text),
            other => Err(format!("unknown report format '{}' (expected: pdf, text)", other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("could not write report to {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Render `projects` (already filtered and sorted) to bytes in `format`.
pub fn render(projects: &[&Project], title: &str, format: ReportFormat) -> (Vec<u8>, usize) {
    let doc = layout(projects, title);
    let pages = doc.pages.len();
    let bytes = match format {
        ReportFormat::Pdf => pdf::render(&doc),
        ReportFormat::Text => text::render(&doc).into_bytes(),
    };
    (bytes, pages)
}

/// Render and write the report to `path`. Returns the page count.
pub fn export(
    projects: &[&Project],
    title: &str,
    format: ReportFormat,
    path: &Path,
) -> Result<usize, ReportError> {
    let (bytes, pages) = render(projects, title, format);
    atomic_write(path, &bytes).map_err(|e| ReportError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), pages, format = format.as_str(), "report written");
    Ok(pages)
}
