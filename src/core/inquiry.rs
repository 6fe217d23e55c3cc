#![forbid(unsafe_code)]

use serde::Deserialize;
use thiserror::Error;

use crate::core::model::Inquiry;

pub const SUBMIT_FAILED_NOTICE: &str = "Failed to submit inquiry. Please try again.";

#[derive(Debug, Error)]
pub enum InquiryError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("inquiry session not found: {0}")]
    SessionNotFound(String),
    #[error("listing is not displayed: {0}")]
    ListingNotDisplayed(String),
    #[error("submission already in flight")]
    InFlight,
    #[error("inquiry already submitted")]
    AlreadySubmitted,
    #[error("Failed to submit inquiry. Please try again.")]
    SubmitFailed { cause: String },
}

/// Field edits applied to an open draft. Absent fields are left as they are.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DraftUpdate {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl DraftUpdate {
    pub fn apply(self, draft: &mut Inquiry) {
        if let Some(name) = self.customer_name {
            draft.customer_name = name;
        }
        if let Some(email) = self.customer_email {
            draft.customer_email = email;
        }
        if let Some(phone) = self.customer_phone {
            draft.customer_phone = phone;
        }
        if let Some(message) = self.message {
            draft.message = message;
        }
    }
}

/// Required contact fields must carry something other than whitespace.
/// The message is optional and never checked.
pub fn validate_draft(draft: &Inquiry) -> Result<(), InquiryError> {
    let required = [
        ("customer_name", &draft.customer_name),
        ("customer_email", &draft.customer_email),
        ("customer_phone", &draft.customer_phone),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(InquiryError::MissingField(field));
        }
    }
    Ok(())
}
