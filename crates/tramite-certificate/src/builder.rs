use std::sync::Arc;

use tracing::{debug, warn};
use tramite_utils::error::{AssetError, UserFriendlyError};

use crate::assets::{AssetSource, MemoryAssets, RasterImage, decode_raster};
use crate::document::{Document, DrawOp, RectMm, Rgb, TextOp};
use crate::layout::{
    BLUE, BOX_HEIGHT_MM, BOX_RADIUS_MM, CONTENT_WIDTH_MM, DARK_GRAY, Flow, LIGHT_GRAY,
    LOGO_HEIGHT_MM, MARGIN_LEFT_MM, MARGIN_RIGHT_MM, MARGIN_TOP_MM, PAGE_WIDTH_MM, RED,
    TITLE_BASELINE_MM, centered_text, text_op,
};
use crate::metrics::FontFace;
use crate::record::CertificateRecord;

pub const DEFAULT_AGENCY_LOGO: &str = "LogoArsa.png";
pub const DEFAULT_COUNTRY_LOGO: &str = "LogoHonduras.png";

const TITLE: &str = "CERTIFICADO DE REGISTRO SANITARIO";
const INTRO: &str = "LA AGENCIA DE REGULACIÓN SANITARIA, EN USO DE SUS FACULTADES QUE LA LEY LE CONFIERE, MEDIANTE";
const CODE_LABEL: &str = "Número de registro sanitario asignado:";
const AUTHORIZATION: &str = "Se ha autorizado el NUEVO REGISTRO SANITARIO DE PRODUCTOS COSMÉTICOS";
const EXPIRY_LABEL: &str = "Vigente hasta:";
const REGISTRATION_HEADING: &str = "Datos del Registro:";
const OBSERVATIONS_HEADING: &str = "Observaciones:";
const CLAUSE_HEADING: &str = "Cláusula de cancelación:";
const SIGNATURE: &str = "Firma Gerente de Arsa";

/// Lays out sanitary registration certificates.
///
/// The builder keeps no state between calls: `build` is a pure function of
/// the record and the bytes its [`AssetSource`] returns, and the builder can
/// be shared across threads.
///
/// # Example
///
/// ```rust
/// use tramite_certificate::{CertificateBuilder, CertificateRecord};
///
/// let builder = CertificateBuilder::without_assets();
/// let record = CertificateRecord::new("PF010-2025-001234", "15 de enero de 2027");
/// let document = builder.build(&record);
///
/// assert_eq!(document.page_count(), 1);
/// assert!(document.to_portable_bytes().starts_with(b"%PDF-"));
/// ```
pub struct CertificateBuilder {
    assets: Arc<dyn AssetSource>,
    agency_logo: String,
    country_logo: String,
}

impl std::fmt::Debug for CertificateBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateBuilder")
            .field("agency_logo", &self.agency_logo)
            .field("country_logo", &self.country_logo)
            .finish_non_exhaustive()
    }
}

impl CertificateBuilder {
    pub fn new(assets: impl AssetSource + 'static) -> Self {
        Self {
            assets: Arc::new(assets),
            agency_logo: DEFAULT_AGENCY_LOGO.to_string(),
            country_logo: DEFAULT_COUNTRY_LOGO.to_string(),
        }
    }

    /// Builder whose logos are always missing.
    #[must_use]
    pub fn without_assets() -> Self {
        Self::new(MemoryAssets::new())
    }

    /// Override the logo file names looked up in the asset source.
    #[must_use]
    pub fn with_logos(mut self, agency: impl Into<String>, country: impl Into<String>) -> Self {
        self.agency_logo = agency.into();
        self.country_logo = country.into();
        self
    }

    /// Lay out `record`.
    ///
    /// Never fails: absent optional fields drop their section, and a logo
    /// that cannot be loaded is logged and left out without moving
    /// anything else.
    #[must_use]
    pub fn build(&self, record: &CertificateRecord) -> Document {
        let mut flow = Flow::new();

        if let Some(logo) = self.load_logo(&self.agency_logo) {
            let rect = logo_rect(&logo, |_| MARGIN_LEFT_MM);
            flow.push(DrawOp::Image { rect, image: logo });
        }
        if let Some(logo) = self.load_logo(&self.country_logo) {
            let rect = logo_rect(&logo, |width| PAGE_WIDTH_MM - MARGIN_RIGHT_MM - width);
            flow.push(DrawOp::Image { rect, image: logo });
        }

        flow.push(centered_text(
            PAGE_WIDTH_MM / 2.0,
            TITLE_BASELINE_MM,
            TITLE,
            FontFace::Bold,
            20.0,
            DARK_GRAY,
        ));

        flow.paragraph(INTRO, FontFace::Regular, 10.0, 3.0);
        if let Some(line) = record.resolution_line() {
            flow.paragraph(&line, FontFace::Regular, 10.0, 3.0);
        }

        highlighted_box(&mut flow, CODE_LABEL, 7.0, &record.registration_code, 13.0, BLUE);
        flow.paragraph(AUTHORIZATION, FontFace::Regular, 11.0, 5.0);
        highlighted_box(&mut flow, EXPIRY_LABEL, 8.0, &record.expiry_date, 12.0, RED);

        let fields = record.registration_fields();
        if !fields.is_empty() {
            flow.heading(REGISTRATION_HEADING, 12.0, 8.0);
            for (label, value) in fields {
                flow.paragraph(&format!("{label}: {value}"), FontFace::Regular, 10.0, 2.0);
            }
            flow.advance(5.0);
        }

        if let Some(text) = record.observations() {
            flow.heading(OBSERVATIONS_HEADING, 11.0, 7.0);
            flow.paragraph(text, FontFace::Regular, 10.0, 8.0);
        }
        if let Some(text) = record.cancellation_clause() {
            flow.heading(CLAUSE_HEADING, 11.0, 7.0);
            flow.paragraph(text, FontFace::Regular, 10.0, 15.0);
        }

        flow.push_at_floor(TextOp {
            x: MARGIN_LEFT_MM,
            baseline: 0.0,
            text: SIGNATURE.to_string(),
            face: FontFace::Regular,
            size_pt: 10.0,
            color: DARK_GRAY,
        });

        let pages = flow.into_pages();
        debug!(
            registration_code = %record.registration_code,
            pages = pages.len(),
            "Certificate laid out"
        );
        Document::new(record.registration_code.clone(), pages)
    }

    fn load_logo(&self, name: &str) -> Option<Arc<RasterImage>> {
        let loaded = self
            .assets
            .load(name)
            .and_then(|bytes| decode_raster(name, &bytes));
        match loaded {
            Ok(image) => Some(Arc::new(image)),
            Err(err) => {
                report_missing_asset(&err);
                None
            }
        }
    }
}

fn report_missing_asset(err: &AssetError) {
    warn!(error = %err, "{}; omitting it", err.user_message());
}

fn logo_rect(logo: &RasterImage, x_for_width: impl Fn(f32) -> f32) -> RectMm {
    let width = LOGO_HEIGHT_MM * logo.aspect_ratio();
    RectMm::new(x_for_width(width), MARGIN_TOP_MM, width, LOGO_HEIGHT_MM)
}

/// Rounded box spanning the content width with a small label on the left
/// and `value` centred in bold. Offsets are baselines relative to the box top.
fn highlighted_box(
    flow: &mut Flow,
    label: &str,
    label_offset: f32,
    value: &str,
    value_offset: f32,
    value_color: Rgb,
) {
    flow.ensure_room(BOX_HEIGHT_MM);
    let top = flow.cursor();
    let rect = RectMm::new(MARGIN_LEFT_MM, top, CONTENT_WIDTH_MM, BOX_HEIGHT_MM);

    flow.push(DrawOp::FillRect {
        rect,
        color: LIGHT_GRAY,
        corner_radius: BOX_RADIUS_MM,
    });
    flow.push(text_op(
        MARGIN_LEFT_MM + 5.0,
        top + label_offset,
        label.to_string(),
        FontFace::Regular,
        12.0,
        DARK_GRAY,
    ));
    flow.push(centered_text(
        rect.center_x(),
        top + value_offset,
        value,
        FontFace::Bold,
        14.0,
        value_color,
    ));
    flow.advance(BOX_HEIGHT_MM + 5.0);
}
