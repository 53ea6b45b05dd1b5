use signboard_config::SignatureStyle;
use signboard_ipc::{GridPosition, NewSignature, SignRequest, SignatureColor, SubmitSignatureRequest};

use crate::error::ValidationError;
use crate::payload;

/// A checked signature that still needs a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureDraft {
    pub color: SignatureColor,
    pub data: String,
    pub width: u32,
    pub height: u32,
    pub location: Option<String>,
    pub device_id: Option<String>,
}

impl SignatureDraft {
    pub fn place(self, grid_position: GridPosition) -> NewSignature {
        NewSignature {
            grid_position,
            width: self.width,
            height: self.height,
            color: self.color,
            data: self.data,
            location: self.location,
            device_id: self.device_id,
        }
    }
}

/// Present and non-blank
fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}

fn parse_color(color: &str) -> Result<SignatureColor, ValidationError> {
    color
        .trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| ValidationError::InvalidColor(color.to_string()))
}

/// Blank optional text is treated as absent
fn optional(value: &Option<String>) -> Option<String> {
    provided(value).map(str::to_string)
}

/// Check a `POST /signatures` body, which names its own cell
///
/// Cell validity and occupancy are left to the caller.
pub fn validate_submission(
    request: &SubmitSignatureRequest,
    style: &SignatureStyle,
) -> Result<NewSignature, ValidationError> {
    let data = provided(&request.data);
    let color = provided(&request.color);

    let mut missing = Vec::new();
    if data.is_none() {
        missing.push("data");
    }
    if color.is_none() {
        missing.push("color");
    }
    if request.grid_position.is_none() {
        missing.push("gridPosition");
    }
    let (Some(data), Some(color), Some(grid_position)) = (data, color, request.grid_position) else {
        return Err(ValidationError::MissingFields(missing));
    };

    Ok(NewSignature {
        grid_position,
        width: style.width,
        height: style.height,
        color: parse_color(color)?,
        data: data.to_string(),
        location: optional(&request.location),
        device_id: optional(&request.device_id),
    })
}

/// Check a `POST /board/signatures` body before asking for a cell
pub fn validate_draft(request: &SignRequest, style: &SignatureStyle) -> Result<SignatureDraft, ValidationError> {
    let data = provided(&request.data);
    let color = provided(&request.color);

    let mut missing = Vec::new();
    if data.is_none() {
        missing.push("data");
    }
    if color.is_none() {
        missing.push("color");
    }
    let (Some(data), Some(color)) = (data, color) else {
        return Err(ValidationError::MissingFields(missing));
    };

    if payload::is_empty_drawing(data) {
        return Err(ValidationError::EmptyDrawing);
    }

    Ok(SignatureDraft {
        color: parse_color(color)?,
        data: data.to_string(),
        width: style.width,
        height: style.height,
        location: optional(&request.location),
        device_id: optional(&request.device_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(data: Option<&str>, color: Option<&str>, position: Option<GridPosition>) -> SubmitSignatureRequest {
        SubmitSignatureRequest {
            data: data.map(str::to_string),
            color: color.map(str::to_string),
            grid_position: position,
            location: None,
            device_id: None,
        }
    }

    #[test]
    fn test_submission_missing_color() {
        let request = submission(Some("data:image/png;base64,AAAA"), None, Some(GridPosition::new(0, 0)));
        assert_eq!(
            validate_submission(&request, &SignatureStyle::default()),
            Err(ValidationError::MissingFields(vec!["color"]))
        );
    }

    #[test]
    fn test_submission_reports_every_missing_field() {
        let request = submission(Some(""), None, None);
        assert_eq!(
            validate_submission(&request, &SignatureStyle::default()),
            Err(ValidationError::MissingFields(vec!["data", "color", "gridPosition"]))
        );
    }

    #[test]
    fn test_submission_accepts_complete_body() {
        let mut request = submission(Some("data:image/png;base64,AAAA"), Some("Green"), Some(GridPosition::new(3, 4)));
        request.location = Some("  ".to_string());
        request.device_id = Some("tablet-1".to_string());

        let new = validate_submission(&request, &SignatureStyle::default()).unwrap();
        assert_eq!(new.color, SignatureColor::Green);
        assert_eq!(new.grid_position, GridPosition::new(3, 4));
        assert_eq!((new.width, new.height), (75, 50));
        assert_eq!(new.location, None);
        assert_eq!(new.device_id.as_deref(), Some("tablet-1"));
    }

    #[test]
    fn test_submission_rejects_unknown_color() {
        let request = submission(Some("x"), Some("orange"), Some(GridPosition::new(0, 0)));
        assert_eq!(
            validate_submission(&request, &SignatureStyle::default()),
            Err(ValidationError::InvalidColor("orange".to_string()))
        );
    }

    #[test]
    fn test_draft_rejects_empty_drawing() {
        let request = SignRequest {
            data: Some("data:image/png;base64,".to_string()),
            color: Some("red".to_string()),
            ..Default::default()
        };
        assert_eq!(
            validate_draft(&request, &SignatureStyle::default()),
            Err(ValidationError::EmptyDrawing)
        );
    }

    #[test]
    fn test_draft_place() {
        let request = SignRequest {
            data: Some("data:image/png;base64,AAAA".to_string()),
            color: Some("purple".to_string()),
            location: Some("Porto".to_string()),
            device_id: None,
        };
        let draft = validate_draft(&request, &SignatureStyle::default()).unwrap();
        let new = draft.place(GridPosition::new(1, 1));
        assert_eq!(new.grid_position, GridPosition::new(1, 1));
        assert_eq!(new.color, SignatureColor::Purple);
        assert_eq!(new.location.as_deref(), Some("Porto"));
    }
}
