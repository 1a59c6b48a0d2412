use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::violationmodel::*;

//Violation DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EvidenceItemDto {
    #[validate(url(message = "Invalid evidence URL"))]
    pub media_url: String,

    #[validate(length(max = 50, message = "Media kind must be at most 50 characters"))]
    pub media_kind: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct FileViolationDto {
    pub order_item_id: Uuid,

    pub kind: ViolationKind,

    #[validate(length(min = 10, max = 2000, message = "Description must be between 10 and 2000 characters"))]
    pub description: String,

    #[validate(range(min = 0, max = 100, message = "Damage percentage must be between 0 and 100"))]
    pub damage_percentage: Option<i32>,

    #[validate(range(min = 0, max = 100, message = "Penalty percentage must be between 0 and 100"))]
    pub penalty_percentage: i32,

    #[validate]
    pub evidence: Vec<EvidenceItemDto>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CustomerResponseDto {
    pub accept: bool,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,

    // Customer-side exhibits, typically backing a rejection
    #[serde(default)]
    #[validate]
    pub evidence: Vec<EvidenceItemDto>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ReviseClaimDto {
    #[validate(range(min = 0, max = 100, message = "Penalty percentage must be between 0 and 100"))]
    pub penalty_percentage: i32,

    #[validate(length(min = 10, max = 2000, message = "Description must be between 10 and 2000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RejectionResponseDto {
    #[validate(length(min = 1, max = 2000, message = "Response must be between 1 and 2000 characters"))]
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EscalateDto {
    #[validate(length(min = 1, max = 2000, message = "Reason must be between 1 and 2000 characters"))]
    pub reason: String,
}

//Resolution DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct DecideResolutionDto {
    pub kind: ResolutionKind,

    #[validate(range(min = 0.0, message = "Customer fine must not be negative"))]
    pub customer_fine: f64, // in Naira

    #[validate(range(min = 0.0, message = "Provider compensation must not be negative"))]
    pub provider_compensation: f64, // in Naira

    #[validate(length(min = 1, max = 2000, message = "Reason must be between 1 and 2000 characters"))]
    pub reason: String,
}

//Responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ViolationDetailDto {
    pub violation: Violation,
    pub evidence: Vec<Evidence>,
    pub resolution: Option<Resolution>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filing_dto(damage: Option<i32>, penalty: i32) -> FileViolationDto {
        FileViolationDto {
            order_item_id: Uuid::new_v4(),
            kind: ViolationKind::Damaged,
            description: "Deep scratches across the lens housing".to_string(),
            damage_percentage: damage,
            penalty_percentage: penalty,
            evidence: vec![EvidenceItemDto {
                media_url: "https://cdn.example.com/evidence/1.jpg".to_string(),
                media_kind: Some("image".to_string()),
            }],
        }
    }

    #[test]
    fn test_filing_dto_valid() {
        assert!(filing_dto(Some(40), 30).validate().is_ok());
    }

    #[test]
    fn test_filing_dto_rejects_out_of_range_percentages() {
        assert!(filing_dto(Some(101), 30).validate().is_err());
        assert!(filing_dto(Some(40), 101).validate().is_err());
        assert!(filing_dto(Some(-1), 30).validate().is_err());
    }

    #[test]
    fn test_filing_dto_rejects_bad_evidence_url() {
        let mut dto = filing_dto(Some(40), 30);
        dto.evidence[0].media_url = "not-a-url".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_customer_response_rejects_bad_evidence_url() {
        let dto = CustomerResponseDto {
            accept: false,
            notes: Some("The scratches were present at handover".to_string()),
            evidence: vec![EvidenceItemDto {
                media_url: "not-a-url".to_string(),
                media_kind: Some("image".to_string()),
            }],
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_decide_dto_rejects_negative_amounts() {
        let dto = DecideResolutionDto {
            kind: ResolutionKind::Compromise,
            customer_fine: -1.0,
            provider_compensation: 0.0,
            reason: "split the difference".to_string(),
        };
        assert!(dto.validate().is_err());
    }
}
