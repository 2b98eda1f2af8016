use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use campus_market_engine::{AccountApiError, DisputeError, OrderFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Authentication required. {0}")]
    Unauthenticated(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("{0}")]
    OrderFlow(#[from] OrderFlowError),
    #[error("{0}")]
    Dispute(#[from] DisputeError),
    #[error("{0}")]
    Account(#[from] AccountApiError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::OrderFlow(e) => order_flow_status(e),
            Self::Dispute(e) => dispute_status(e),
            Self::Account(e) => account_status(e),
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

/// Validation errors are 400s, authorization failures 403s, missing records 404s, and
/// state conflicts (already assigned, already released, frozen by a dispute) 409s.
fn order_flow_status(e: &OrderFlowError) -> StatusCode {
    use OrderFlowError::*;
    match e {
        ProductNotFound(_) | OrderNotFound(_) | AccountNotFound(_) => StatusCode::NOT_FOUND,
        OutOfStock { .. } | SelfPurchase | InvalidQuantity(_) | ProductUnavailable(_) => StatusCode::BAD_REQUEST,
        VerificationFailed(_) => StatusCode::BAD_GATEWAY,
        PaymentAlreadyProcessed(_)
        | AlreadyAssigned(_)
        | NotPending(_)
        | InvalidStatusProgression { .. }
        | NotDelivered(_)
        | AlreadyReleased(_)
        | DisputeInProgress(_) => StatusCode::CONFLICT,
        NotYourOrder(_) | NotYourDelivery(_) | AccountSuspended(_) | RoleRequired { .. } => StatusCode::FORBIDDEN,
        Ledger(_) | Account(_) | DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn dispute_status(e: &DisputeError) -> StatusCode {
    use DisputeError::*;
    match e {
        OrderNotFound(_) | DisputeNotFound(_) | AccountNotFound(_) => StatusCode::NOT_FOUND,
        NotYourOrder(_) | NotAuthorized => StatusCode::FORBIDDEN,
        AlreadyDisputed(_) | NotEligibleStatus(_) | AlreadyResolved(_) | RefundAfterSettlement(_) => {
            StatusCode::CONFLICT
        },
        NotResolutionStatus(_) => StatusCode::BAD_REQUEST,
        Ledger(_) | DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn account_status(e: &AccountApiError) -> StatusCode {
    use AccountApiError::*;
    match e {
        AccountNotFound(_) => StatusCode::NOT_FOUND,
        AccountSuspended(_) => StatusCode::FORBIDDEN,
        BelowMinimum { .. } | InsufficientBalance { .. } | QueryError(_) => StatusCode::BAD_REQUEST,
        TransferFailed(_) => StatusCode::BAD_GATEWAY,
        Ledger(_) | DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
