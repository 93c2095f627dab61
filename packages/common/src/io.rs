use crate::result::CommonResult;
use richdoc_model::Node;
use serde_json::Value;
use std::path::Path;

/// Read a document file as raw JSON.
///
/// The value is deliberately untyped: documents from the outside world may
/// be malformed and must go through repair before use.
pub fn read_document(path: &Path) -> CommonResult<Value> {
    let source = std::fs::read_to_string(path)?;
    parse_document(&source)
}

pub fn parse_document(source: &str) -> CommonResult<Value> {
    if source.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(source)?)
}

pub fn write_document(path: &Path, nodes: &[Node]) -> CommonResult<()> {
    let json = serde_json::to_string_pretty(nodes)?;
    std::fs::write(path, json)?;
    Ok(())
}
