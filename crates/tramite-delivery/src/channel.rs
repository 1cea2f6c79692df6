use async_trait::async_trait;
use serde::Serialize;
use tramite_utils::error::{DeliveryError, DeliveryErrorKind};

/// What the receiving side needs to label the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryMetadata {
    /// Registration code printed on the certificate.
    pub reference_code: String,
}

impl DeliveryMetadata {
    pub fn new(reference_code: impl Into<String>) -> Self {
        Self {
            reference_code: reference_code.into(),
        }
    }
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Ok { delivery_id: String },
    Failed { kind: DeliveryErrorKind, detail: String },
}

impl DeliveryOutcome {
    pub(crate) fn failed(kind: DeliveryErrorKind, detail: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// The delivery id, or the failure as a [`DeliveryError`].
    ///
    /// # Errors
    ///
    /// Returns the failure carried by a `Failed` outcome.
    pub fn into_result(self) -> Result<String, DeliveryError> {
        match self {
            Self::Ok { delivery_id } => Ok(delivery_id),
            Self::Failed { kind, detail } => Err(DeliveryError::new(kind, detail)),
        }
    }
}

/// Sends a rendered document to a destination.
///
/// Implementations perform at most one attempt; retrying is the caller's
/// decision.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send(&self, destination: &str, bytes: &[u8], metadata: &DeliveryMetadata) -> DeliveryOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_into_result() {
        let ok = DeliveryOutcome::Ok {
            delivery_id: "abc".into(),
        };
        assert!(ok.is_ok());
        assert_eq!(ok.into_result().unwrap(), "abc");

        let failed = DeliveryOutcome::failed(DeliveryErrorKind::EndpointNotFound, "404");
        assert!(!failed.is_ok());
        let err = failed.into_result().unwrap_err();
        assert_eq!(err.kind, DeliveryErrorKind::EndpointNotFound);
        assert_eq!(err.to_string(), "endpoint_not_found: 404");
    }

    #[test]
    fn test_outcome_serialization() {
        let failed = DeliveryOutcome::failed(DeliveryErrorKind::InvalidDestination, "x");
        let json = serde_json::to_string(&failed).unwrap();
        assert_eq!(
            json,
            r#"{"outcome":"failed","kind":"invalid_destination","detail":"x"}"#
        );
    }
}
