//! Delivery collaborators for rendered certificates.
//!
//! [`HttpDelivery`] posts the PDF to the portal's e-mail endpoint and
//! [`LocalSave`] writes it to disk. Both sit behind small contracts so the
//! host can swap them for fakes.

mod channel;
mod destination;
mod http;
mod local;

pub use channel::{DeliveryChannel, DeliveryMetadata, DeliveryOutcome};
pub use destination::{MAX_ENCODED_PAYLOAD_BYTES, is_valid_destination};
pub use http::{HttpDelivery, SendCertificateRequest};
pub use local::{DEFAULT_FILE_NAME, LocalSave};
pub use tramite_utils::error::{DeliveryError, DeliveryErrorKind};
