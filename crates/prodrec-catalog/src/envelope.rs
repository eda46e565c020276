//! The RPC envelope contract.
//!
//! Every `tools/call` response wraps its payload twice: the JSON-RPC body
//! carries `result.content`, a list of typed content items, and the first
//! `"text"` item holds a JSON-encoded string that must itself be parsed.
//! This exact unwrap shape is a hard compatibility contract with the
//! catalog service.

use serde::Deserialize;
use serde_json::Value;

use crate::error::CatalogError;

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<ToolResult>,
}

#[derive(Debug, Default, Deserialize)]
struct ToolResult {
    #[serde(default)]
    content: Vec<ContentItem>,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Unwraps the nested text payload out of a `tools/call` response body.
///
/// # Errors
///
/// Returns [`CatalogError::ResponseShape`] naming `operation` when the
/// envelope does not match, no non-empty text item exists, or the text is
/// not valid JSON.
pub(crate) fn unwrap_text_payload(body: Value, operation: &str) -> Result<Value, CatalogError> {
    let envelope: RpcEnvelope =
        serde_json::from_value(body).map_err(|e| CatalogError::ResponseShape {
            operation: operation.to_owned(),
            reason: format!("unexpected envelope shape: {e}"),
        })?;

    let result = envelope.result.unwrap_or_default();
    let text = result
        .content
        .iter()
        .find(|item| item.kind == "text")
        .and_then(|item| item.text.as_deref())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| CatalogError::ResponseShape {
            operation: operation.to_owned(),
            reason: "no text content item in result".to_owned(),
        })?;

    serde_json::from_str(text).map_err(|e| CatalogError::ResponseShape {
        operation: operation.to_owned(),
        reason: format!("text payload is not valid JSON: {e}"),
    })
}
