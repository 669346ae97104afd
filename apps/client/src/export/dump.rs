//! Structured dump: pretty JSON using the service's own field names, so the
//! artifact can be fed back through `parse_dump` or the `render` command.

use crate::export::ExportError;
use crate::models::{AnalysisResult, RawAnalysis};

pub const DUMP_EXTENSION: &str = "json";

pub fn dump_json(result: &AnalysisResult) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Parses a dump into its wire form without judging completeness.
pub fn parse_raw_dump(text: &str) -> Result<RawAnalysis, ExportError> {
    serde_json::from_str(text).map_err(|e| ExportError::Parse(e.to_string()))
}

pub fn parse_dump(text: &str) -> Result<AnalysisResult, ExportError> {
    parse_raw_dump(text)?
        .into_result()
        .map_err(|e| ExportError::Parse(e.to_string()))
}
