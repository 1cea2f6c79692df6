//! Certificate Document Builder.
//!
//! Turns a [`CertificateRecord`] into an immutable, paginated [`Document`]
//! with a fixed legal template: decoration band, corner logos, title,
//! wrapped introduction, highlighted registration-code and expiry boxes,
//! the registration data section, the two legal text blocks and the
//! signature line. Documents serialize to PDF with
//! [`Document::to_portable_bytes`]; the bytes depend only on the record and
//! the logo assets.

pub mod assets;
mod builder;
pub mod document;
pub mod layout;
pub mod metrics;
pub mod record;
mod render;
pub mod wrap;

pub use assets::{AssetSource, DirectoryAssets, MemoryAssets, RasterImage};
pub use builder::{CertificateBuilder, DEFAULT_AGENCY_LOGO, DEFAULT_COUNTRY_LOGO};
pub use document::{Document, DrawOp, Page, PreviewHandle, RectMm, Rgb, TextOp};
pub use metrics::FontFace;
pub use record::CertificateRecord;
pub use tramite_utils::error::AssetError;
