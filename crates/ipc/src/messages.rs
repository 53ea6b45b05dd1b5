//! Request and response bodies of the HTTP surface.

use serde::{Deserialize, Serialize};

use crate::types::GridPosition;

/// Page size used when `limit` is absent or unusable.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Message returned with every successful create.
pub const CREATED_MESSAGE: &str = "Signature saved successfully";

/// Error body for requests missing `data`, `color` or `gridPosition`.
pub const MISSING_FIELDS_ERROR: &str = "Missing required fields";

/// Error body when every cell already holds a signature.
pub const NO_SPACE_ERROR: &str = "No space available for signatures";

/// Error body for storage failures.
pub const INTERNAL_ERROR: &str = "Internal server error";

/// `POST /signatures` body. Every field is optional on the wire so that
/// missing fields can be reported as a validation failure instead of a
/// decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSignatureRequest {
    pub data: Option<String>,
    pub color: Option<String>,
    pub grid_position: Option<GridPosition>,
    pub location: Option<String>,
    pub device_id: Option<String>,
}

/// `POST /board/signatures` body: the board picks the cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub data: Option<String>,
    pub color: Option<String>,
    pub location: Option<String>,
    pub device_id: Option<String>,
}

/// `GET /signatures` query string, kept as raw text and parsed leniently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListQuery {
    /// Requested page size; zero, negative or unparsable values mean the default
    pub fn limit(&self) -> usize {
        match self.limit.as_deref().and_then(parse_int_prefix) {
            Some(limit) if limit > 0 => limit as usize,
            _ => DEFAULT_LIST_LIMIT,
        }
    }

    /// Requested offset; negative or unparsable values mean zero
    pub fn offset(&self) -> usize {
        match self.offset.as_deref().and_then(parse_int_prefix) {
            Some(offset) if offset > 0 => offset as usize,
            _ => 0,
        }
    }
}

/// Parse the leading integer of a string the way a lenient query parser
/// does: optional whitespace and sign, then digits, ignoring any suffix.
fn parse_int_prefix(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// `201` body for a stored signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: String,
}

/// `201` body for a signature placed by the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedResponse {
    pub message: String,
    pub id: String,
    pub grid_position: GridPosition,
}

/// Error body used by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// `POST /board/click` body: a point in board pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickRequest {
    pub x: f64,
    pub y: f64,
}

/// Result of a flip toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipResponse {
    /// Signature that was toggled, if the point hit one
    pub id: Option<String>,
    /// Whether that signature now shows its back face
    pub flipped: bool,
}

/// Result of rebuilding the board from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<&str>, offset: Option<&str>) -> ListQuery {
        ListQuery {
            limit: limit.map(str::to_string),
            offset: offset.map(str::to_string),
        }
    }

    #[test]
    fn test_list_query_defaults() {
        let q = query(None, None);
        assert_eq!(q.limit(), DEFAULT_LIST_LIMIT);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_list_query_lenient_parsing() {
        assert_eq!(query(Some("25"), Some("50")).limit(), 25);
        assert_eq!(query(Some("25"), Some("50")).offset(), 50);
        assert_eq!(query(Some("10abc"), None).limit(), 10);
        assert_eq!(query(Some("0"), None).limit(), DEFAULT_LIST_LIMIT);
        assert_eq!(query(Some("abc"), None).limit(), DEFAULT_LIST_LIMIT);
        assert_eq!(query(None, Some("-5")).offset(), 0);
    }

    #[test]
    fn test_submit_request_tolerates_missing_fields() {
        let request: SubmitSignatureRequest =
            serde_json::from_str(r#"{"data": "x", "gridPosition": {"col": 1, "row": 2}}"#).unwrap();
        assert_eq!(request.data.as_deref(), Some("x"));
        assert!(request.color.is_none());
        assert_eq!(request.grid_position, Some(GridPosition::new(1, 2)));
    }
}
