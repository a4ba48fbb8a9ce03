use crate::progress::Monitor;
use shared::{FileError, FileHeader};
use std::path::Path;

/// A fully parsed result file: the standard header plus the derived
/// building-totals header.
#[derive(Debug, Clone)]
pub struct ParsedEso {
    pub name: String,
    pub standard: FileHeader,
    pub totals: FileHeader,
}

/// The external parser seam.
///
/// Implementations are expected to drive the monitor through its stages
/// (`started`, `set_result_lines`, `tick_line` per result line,
/// `header_finished`/`body_finished`/`totals_finished`) while reading; the
/// loader itself adds the terminal `finished`/`failed` report and never
/// looks inside the produced headers.
pub trait EsoReader: Send + Sync + 'static {
    fn read(&self, path: &Path, monitor: &mut Monitor) -> Result<ParsedEso, FileError>;
}
