use jsonrpsee::types::{ErrorObject, ErrorObjectOwned};
use thiserror::Error;

use crate::core::inquiry::InquiryError;

pub const INVALID_PARAMS_CODE: i32 = -32602;
pub const SERVER_ERROR_CODE: i32 = -32000;
pub const NOT_FOUND_CODE: i32 = -32004;
pub const CONFLICT_CODE: i32 = -32009;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{notice}")]
    SubmitFailed { notice: String },
}

impl From<InquiryError> for RpcError {
    fn from(err: InquiryError) -> Self {
        match err {
            InquiryError::MissingField(_) => RpcError::InvalidParams(err.to_string()),
            InquiryError::SessionNotFound(_) | InquiryError::ListingNotDisplayed(_) => {
                RpcError::NotFound(err.to_string())
            }
            InquiryError::InFlight | InquiryError::AlreadySubmitted => {
                RpcError::Conflict(err.to_string())
            }
            InquiryError::SubmitFailed { .. } => RpcError::SubmitFailed {
                notice: err.to_string(),
            },
        }
    }
}

impl From<RpcError> for ErrorObjectOwned {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::InvalidParams(msg) => ErrorObject::owned(INVALID_PARAMS_CODE, msg, None::<()>),
            RpcError::NotFound(_) => ErrorObject::owned(NOT_FOUND_CODE, err.to_string(), None::<()>),
            RpcError::Conflict(msg) => ErrorObject::owned(CONFLICT_CODE, msg, None::<()>),
            RpcError::SubmitFailed { notice } => ErrorObject::owned(SERVER_ERROR_CODE, notice, None::<()>),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::inquiry::SUBMIT_FAILED_NOTICE;

    #[test]
    fn inquiry_errors_map_to_codes() {
        let obj: ErrorObjectOwned = RpcError::from(InquiryError::MissingField("customer_email")).into();
        assert_eq!(obj.code(), INVALID_PARAMS_CODE);
        assert!(obj.message().contains("customer_email"));

        let obj: ErrorObjectOwned = RpcError::from(InquiryError::SessionNotFound("s".into())).into();
        assert_eq!(obj.code(), NOT_FOUND_CODE);

        let obj: ErrorObjectOwned = RpcError::from(InquiryError::InFlight).into();
        assert_eq!(obj.code(), CONFLICT_CODE);
    }

    #[test]
    fn submit_failure_carries_retry_notice() {
        let obj: ErrorObjectOwned = RpcError::from(InquiryError::SubmitFailed {
            cause: "store returned 500".into(),
        })
        .into();
        assert_eq!(obj.code(), SERVER_ERROR_CODE);
        assert_eq!(obj.message(), SUBMIT_FAILED_NOTICE);
    }
}
