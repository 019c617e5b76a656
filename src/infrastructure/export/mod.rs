//! Textbook export
//!
//! Renders the refined chapters, their practice questions and visual notes
//! into a downloadable document. Three formats are available:
//! - Markdown (`textbook.md`)
//! - HTML (`textbook.html`)
//! - Plain text (`textbook.txt`)

mod textbook_exporter;

pub use textbook_exporter::{ExportError, ExportFormat, TextbookExporter};
