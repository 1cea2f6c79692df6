//! E-mail delivery through the portal's `send-certificate` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use tramite_utils::error::{DeliveryError, DeliveryErrorKind};

use crate::channel::{DeliveryChannel, DeliveryMetadata, DeliveryOutcome};
use crate::destination::{MAX_ENCODED_PAYLOAD_BYTES, is_valid_destination};

const PDF_DATA_URI_PREFIX: &str = "data:application/pdf;base64,";

/// JSON body accepted by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendCertificateRequest {
    pub email: String,
    /// `data:application/pdf;base64,...`
    #[serde(rename = "pdfData")]
    pub pdf_data: String,
    #[serde(rename = "certificateNumber")]
    pub certificate_number: String,
}

/// Fields the endpoint may answer with, on success or failure.
#[derive(Debug, Default, Deserialize)]
struct EndpointReply {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "emailId")]
    email_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl EndpointReply {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// `error: details`, either part alone, or `fallback`.
    fn message(&self, fallback: impl FnOnce() -> String) -> String {
        match (&self.error, &self.details) {
            (Some(error), Some(details)) => format!("{error}: {details}"),
            (Some(error), None) => error.clone(),
            (None, Some(details)) => details.clone(),
            (None, None) => fallback(),
        }
    }
}

/// Posts certificates to an HTTP endpoint that mails them.
///
/// One request per [`send`](DeliveryChannel::send); failures are mapped to
/// a [`DeliveryErrorKind`] and never retried.
#[derive(Debug, Clone)]
pub struct HttpDelivery {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpDelivery {
    /// # Errors
    ///
    /// Returns a `Network` [`DeliveryError`] if the HTTP client cannot be
    /// constructed.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| {
                DeliveryError::new(
                    DeliveryErrorKind::Network,
                    format!("Failed to build HTTP client: {e}"),
                )
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request body for `bytes`, or the reason it cannot be sent.
    ///
    /// # Errors
    ///
    /// `InvalidDestination` for a malformed address and `PayloadTooLarge`
    /// when the encoded document exceeds [`MAX_ENCODED_PAYLOAD_BYTES`].
    pub fn prepare(
        destination: &str,
        bytes: &[u8],
        metadata: &DeliveryMetadata,
    ) -> Result<SendCertificateRequest, DeliveryError> {
        let destination = destination.trim();
        if !is_valid_destination(destination) {
            return Err(DeliveryError::new(
                DeliveryErrorKind::InvalidDestination,
                destination,
            ));
        }

        let encoded = STANDARD.encode(bytes);
        if encoded.len() > MAX_ENCODED_PAYLOAD_BYTES {
            return Err(DeliveryError::new(
                DeliveryErrorKind::PayloadTooLarge,
                format!(
                    "encoded document is {} bytes, limit is {MAX_ENCODED_PAYLOAD_BYTES}",
                    encoded.len()
                ),
            ));
        }

        Ok(SendCertificateRequest {
            email: destination.to_string(),
            pdf_data: format!("{PDF_DATA_URI_PREFIX}{encoded}"),
            certificate_number: metadata.reference_code.clone(),
        })
    }

    async fn post(&self, request: &SendCertificateRequest) -> Result<String, DeliveryError> {
        debug!(
            endpoint = %self.endpoint,
            timeout_secs = self.timeout.as_secs(),
            payload_bytes = request.pdf_data.len(),
            "Posting certificate"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let detail = if e.is_timeout() {
                    format!("request to {} timed out after {:?}", self.endpoint, self.timeout)
                } else {
                    format!("request to {} failed: {e}", self.endpoint)
                };
                DeliveryError::new(DeliveryErrorKind::Network, detail)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            DeliveryError::new(
                DeliveryErrorKind::Network,
                format!("failed to read response from {}: {e}", self.endpoint),
            )
        })?;
        let reply = EndpointReply::parse(&body);

        map_status(status, &self.endpoint, reply)
    }
}

fn map_status(status: StatusCode, endpoint: &str, reply: EndpointReply) -> Result<String, DeliveryError> {
    match status {
        StatusCode::NOT_FOUND => Err(DeliveryError::new(
            DeliveryErrorKind::EndpointNotFound,
            format!("{endpoint} answered 404"),
        )),
        StatusCode::PAYLOAD_TOO_LARGE => Err(DeliveryError::new(
            DeliveryErrorKind::PayloadTooLarge,
            reply.message(|| format!("{endpoint} answered 413")),
        )),
        s if s.is_success() && reply.success => {
            Ok(reply.email_id.unwrap_or_else(|| "unknown".to_string()))
        }
        s => Err(DeliveryError::new(
            DeliveryErrorKind::RemoteValidation,
            reply.message(|| format!("{endpoint} answered {s}")),
        )),
    }
}

#[async_trait]
impl DeliveryChannel for HttpDelivery {
    async fn send(&self, destination: &str, bytes: &[u8], metadata: &DeliveryMetadata) -> DeliveryOutcome {
        let result = match Self::prepare(destination, bytes, metadata) {
            Ok(request) => self.post(&request).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(delivery_id) => {
                info!(
                    reference_code = %metadata.reference_code,
                    delivery_id = %delivery_id,
                    "Certificate delivered"
                );
                DeliveryOutcome::Ok { delivery_id }
            }
            Err(err) => {
                warn!(
                    reference_code = %metadata.reference_code,
                    kind = %err.kind,
                    detail = %err.detail,
                    "Certificate delivery failed"
                );
                DeliveryOutcome::failed(err.kind, err.detail)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> DeliveryMetadata {
        DeliveryMetadata::new("PF010-2025-001234")
    }

    #[test]
    fn test_prepare_builds_data_uri_payload() {
        let request = HttpDelivery::prepare(" ana@example.hn ", b"%PDF", &metadata()).unwrap();

        assert_eq!(request.email, "ana@example.hn");
        assert_eq!(request.pdf_data, "data:application/pdf;base64,JVBERg==");
        assert_eq!(request.certificate_number, "PF010-2025-001234");

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("pdfData").is_some());
        assert!(json.get("certificateNumber").is_some());
    }

    #[test]
    fn test_prepare_rejects_bad_destination() {
        let err = HttpDelivery::prepare("not-an-address", b"%PDF", &metadata()).unwrap_err();
        assert_eq!(err.kind, DeliveryErrorKind::InvalidDestination);
    }

    #[test]
    fn test_prepare_rejects_oversized_payload() {
        // 3 raw bytes encode to 4, so this lands just past the limit.
        let bytes = vec![0u8; MAX_ENCODED_PAYLOAD_BYTES / 4 * 3 + 3];
        let err = HttpDelivery::prepare("ana@example.hn", &bytes, &metadata()).unwrap_err();
        assert_eq!(err.kind, DeliveryErrorKind::PayloadTooLarge);
    }

    #[test]
    fn test_status_mapping() {
        let ok = map_status(
            StatusCode::OK,
            "http://x",
            EndpointReply::parse(r#"{"success":true,"emailId":"re_123"}"#),
        );
        assert_eq!(ok.unwrap(), "re_123");

        let not_found = map_status(StatusCode::NOT_FOUND, "http://x", EndpointReply::default());
        assert_eq!(not_found.unwrap_err().kind, DeliveryErrorKind::EndpointNotFound);

        let rejected = map_status(
            StatusCode::BAD_REQUEST,
            "http://x",
            EndpointReply::parse(r#"{"error":"El PDF es demasiado grande","details":"límite 25MB"}"#),
        )
        .unwrap_err();
        assert_eq!(rejected.kind, DeliveryErrorKind::RemoteValidation);
        assert_eq!(rejected.detail, "El PDF es demasiado grande: límite 25MB");

        let unsuccessful = map_status(
            StatusCode::OK,
            "http://x",
            EndpointReply::parse(r#"{"success":false,"error":"Email inválido"}"#),
        )
        .unwrap_err();
        assert_eq!(unsuccessful.kind, DeliveryErrorKind::RemoteValidation);
        assert_eq!(unsuccessful.detail, "Email inválido");
    }

    #[test]
    fn test_non_json_error_body_falls_back_to_status() {
        let err = map_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            "http://x",
            EndpointReply::parse("<html>oops</html>"),
        )
        .unwrap_err();
        assert_eq!(err.kind, DeliveryErrorKind::RemoteValidation);
        assert!(err.detail.contains("500"));
    }
}
