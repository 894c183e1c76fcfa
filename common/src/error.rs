use actix_web::HttpResponse;
use thiserror::Error;

pub type Res<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // === CONVERSION ERRORS ===
    #[error("JWT error: {0}")]
    JWT(#[from] jsonwebtoken::errors::Error),

    #[error("Stripe error: {0}")]
    Stripe(#[from] stripe::StripeError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // === POLICY ERRORS ===
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Upgrade required: {0}")]
    UpgradeRequired(String),

    #[error("Payment not verified: {0}")]
    PaymentUnverified(String),

    // === APPLICATION ERRORS ===
    #[error("Authorization error: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn to_http_response(&self) -> HttpResponse {
        let is_dev = cfg!(debug_assertions);

        let to_internal_json = |err_msg: &str| {
            if is_dev {
                serde_json::json!({ "error": err_msg })
            } else {
                serde_json::json!({ "error": "Internal server error" })
            }
        };
        let to_json = || serde_json::json!({ "error": self.to_string() });

        match self {
            // === CONVERSION ERRORS ===
            AppError::JWT(error) => {
                log::warn!("JWT error: {}", error);
                HttpResponse::Unauthorized().json(to_json())
            }
            AppError::Stripe(error) => {
                log::error!("Stripe error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }
            AppError::Json(error) => {
                log::error!("Serialization error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }
            AppError::Io(error) => {
                log::error!("IO error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }

            // === POLICY ERRORS ===
            // plan and feature ids come from closed catalogs, so an unknown one is a caller bug
            AppError::InvalidPlan(id) => {
                log::error!("Invalid plan id requested: {}", id);
                HttpResponse::BadRequest().json(to_json())
            }
            AppError::UnknownFeature(id) => {
                log::error!("Unknown feature id requested: {}", id);
                HttpResponse::BadRequest().json(to_json())
            }
            AppError::UpgradeRequired(_) | AppError::PaymentUnverified(_) => {
                HttpResponse::PaymentRequired().json(to_json())
            }

            // === APPLICATION ERRORS ===
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(to_json()),
            AppError::NotFound(_) => HttpResponse::NotFound().json(to_json()),
            AppError::Conflict(_) => HttpResponse::Conflict().json(to_json()),
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(to_json()),

            AppError::Internal(error) => {
                log::error!("Internal error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(error))
            }
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        self.to_http_response()
    }
}
