use thiserror::Error;

use crate::domain::product::ProductId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("quantity must be a positive integer, got {qty}")]
    InvalidQuantity { qty: i64 },
    #[error("no product with id {0}")]
    ProductNotFound(ProductId),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "Quantity must be a positive whole number.",
            Self::NotFound { .. } => "Product not found.",
            Self::ServiceUnavailable { .. } => {
                "The store is temporarily unavailable. Please retry shortly."
            }
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error @ DomainError::InvalidQuantity { .. }) => {
                Self::BadRequest {
                    message: error.to_string(),
                    correlation_id: "unassigned".to_owned(),
                }
            }
            ApplicationError::Domain(error @ DomainError::ProductNotFound(_)) => Self::NotFound {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::StoreUnavailable(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
