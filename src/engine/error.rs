use std::fmt;

use crate::model::{OrderId, ProductId};

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Failure of the booking store adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or read.
    Unavailable(String),
    /// The store answered with data that cannot be decoded.
    Malformed {
        order_id: Option<OrderId>,
        reason: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(e) => write!(f, "booking store unavailable: {e}"),
            StoreError::Malformed {
                order_id: Some(id),
                reason,
            } => write!(f, "malformed order {id}: {reason}"),
            StoreError::Malformed {
                order_id: None,
                reason,
            } => write!(f, "malformed booking data: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Failure of a product metadata lookup. Never escapes the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogError {
    pub product_id: ProductId,
    pub reason: String,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "product {} lookup failed: {}", self.product_id, self.reason)
    }
}

impl std::error::Error for CatalogError {}

#[derive(Debug)]
pub enum EngineError {
    /// Bad input; lists every violated constraint.
    Validation(Vec<Violation>),
    Store(StoreError),
}

impl EngineError {
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Store(StoreError::Unavailable(_)))
    }

    /// Short label for metrics.
    pub fn kind_label(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "invalid",
            EngineError::Store(_) => "store_error",
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Validation(violations) => {
                write!(f, "invalid booking request: ")?;
                for (i, v) in violations.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
            EngineError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Store(e) => Some(e),
            EngineError::Validation(_) => None,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::Store(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_violation() {
        let err = EngineError::Validation(vec![
            Violation::new("productIds", "must not be empty"),
            Violation::new("endDate", "is required"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid booking request: productIds: must not be empty; endDate: is required"
        );
        assert!(err.is_validation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn unavailable_store_is_retryable() {
        let err: EngineError = StoreError::Unavailable("connection refused".into()).into();
        assert!(err.is_retryable());
        assert_eq!(err.kind_label(), "store_error");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn malformed_store_is_not_retryable() {
        let err: EngineError = StoreError::Malformed {
            order_id: Some(7),
            reason: "unknown status \"shipped\"".into(),
        }
        .into();
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "malformed order 7: unknown status \"shipped\"");
    }
}
