//! Decoding of the model's JSON answer

use serde::Deserialize;

use super::error::RepairParseError;
use crate::document::ImportDecl;

const FENCE: &str = "```";

/// A validated fix suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairResponse {
    pub imports: Vec<String>,
    pub variable_content: String,
}

#[derive(Deserialize)]
struct WireResponse {
    imports: Option<Vec<String>>,
    #[serde(rename = "variableContent")]
    variable_content: Option<String>,
}

/// Remove a surrounding Markdown code fence, with or without a language tag.
/// Text outside a single fenced block is dropped; unfenced text is only trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find(FENCE) else {
        return trimmed;
    };

    let mut body = &trimmed[open + FENCE.len()..];
    if let Some(newline) = body.find('\n') {
        let tag = body[..newline].trim();
        if tag.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            body = &body[newline + 1..];
        }
    }

    match body.find(FENCE) {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Strictly decode `{"imports": [...], "variableContent": "..."}`
pub fn parse_response(text: &str) -> Result<RepairResponse, RepairParseError> {
    let wire: WireResponse = serde_json::from_str(strip_code_fences(text))?;

    let imports = wire.imports.ok_or(RepairParseError::MissingKey("imports"))?;
    let variable_content = wire
        .variable_content
        .ok_or(RepairParseError::MissingKey("variableContent"))?;

    let variable_content = variable_content.trim();
    if variable_content.is_empty() {
        return Err(RepairParseError::EmptyReplacement);
    }

    let imports = imports
        .iter()
        .map(|spec| {
            ImportDecl::from_specifier(spec)
                .map(|_| spec.trim().to_string())
                .map_err(|_| RepairParseError::InvalidImport(spec.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RepairResponse {
        imports,
        variable_content: variable_content.to_string(),
    })
}
