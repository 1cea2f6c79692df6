//! Layout and serialization properties of the certificate builder
//!
//! ## Configuration
//!
//! - `PROPTEST_CASES`: Number of test cases per property (default: 64)

use std::env;
use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use proptest::prelude::*;

use tramite_certificate::layout::{CONTENT_FLOOR_MM, CONTENT_WIDTH_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use tramite_certificate::wrap::wrap_text;
use tramite_certificate::{
    CertificateBuilder, CertificateRecord, DEFAULT_AGENCY_LOGO, DEFAULT_COUNTRY_LOGO, Document,
    DrawOp, FontFace, MemoryAssets, Rgb, TextOp,
};

const DEFAULT_PROPTEST_CASES: u32 = 64;

fn proptest_config() -> ProptestConfig {
    let cases = env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PROPTEST_CASES);
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([12, 80, 160, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn logos() -> MemoryAssets {
    MemoryAssets::new()
        .with(DEFAULT_AGENCY_LOGO, png(300, 120))
        .with(DEFAULT_COUNTRY_LOGO, png(90, 90))
}

fn full_record() -> CertificateRecord {
    CertificateRecord {
        registration_code: "PF010-2025-001234".into(),
        expiry_date: "15 de enero de 2027".into(),
        product_name: Some("CREMA HIDRATANTE FACIAL".into()),
        cosmetic_form: Some("Crema".into()),
        commercial_presentation: Some("Frasco de 50ml".into()),
        holder_name: Some("COSMÉTICOS HONDURAS S.A. DE C.V.".into()),
        manufacturer_name: Some("LABORATORIOS INTERNACIONALES LTDA.".into()),
        distributor_name: Some("DISTRIBUIDORA CENTROAMERICANA S.A.".into()),
        responsible_professional: Some("Dr. Juan Carlos Pérez Martínez".into()),
        resolution_date: Some("15 de enero de 2025".into()),
        issuance_date: Some("15 de enero de 2025".into()),
        observations: Some(
            "La emisión del presente certificado y la impresión en soporte físico es una \
             reproducción del documento original que se encuentra en formato electrónico, cuya \
             representación digital goza de plena autenticidad, integridad y no repudio; lo \
             anterior con fundamento en el Decreto Ejecutivo PCM-016-2020 Articulo 02, Articulo 7 \
             de la Ley sobre Firmas Electrónicas reformado mediante Decreto Legislativo 33-2020 \
             Artículo 38 inciso \"A\"."
                .into(),
        ),
        cancellation_clause: Some(
            "El (La) NUEVO REGISTRO SANITARIO aquí autorizado podrá en cualquier momento ser \
             cancelado cuando por información actualizada el uso del producto resulte no seguro; \
             por falsificación o alteración de los documentos utilizados en el registro o \
             inscripción sanitaria; cuando no cumpla con las especificaciones del fabricante \
             consignados en la hoja de seguridad; cuando el producto se comercialice en \
             condiciones diferentes con las cuales fue aprobado."
                .into(),
        ),
    }
}

fn fill_rects(document: &Document, page: usize) -> Vec<(tramite_certificate::RectMm, Rgb)> {
    document.pages()[page]
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::FillRect { rect, color, .. } => Some((*rect, *color)),
            _ => None,
        })
        .collect()
}

fn all_text(document: &Document) -> Vec<TextOp> {
    document
        .pages()
        .iter()
        .flat_map(|page| page.text_ops().cloned())
        .collect()
}

#[test]
fn test_build_is_byte_identical_across_calls() {
    let builder = CertificateBuilder::new(logos());
    let record = full_record();

    let first = builder.build(&record).to_portable_bytes();
    let second = builder.build(&record).to_portable_bytes();

    assert_eq!(first, second);
    assert!(first.starts_with(b"%PDF-"));
}

#[test]
fn test_separate_builders_agree() {
    let a = CertificateBuilder::new(logos()).build(&full_record());
    let b = CertificateBuilder::new(logos()).build(&full_record());
    assert_eq!(a, b);
    assert_eq!(a.to_portable_bytes(), b.to_portable_bytes());
}

#[test]
fn test_empty_optional_fields_give_single_page() {
    let record = CertificateRecord {
        product_name: Some(String::new()),
        observations: Some("  ".into()),
        ..CertificateRecord::new("PF010-2025-000007", "2 de febrero de 2027")
    };
    let document = CertificateBuilder::without_assets().build(&record);

    assert_eq!(document.page_count(), 1);
    let preview = document.to_preview_handle();
    assert_eq!(preview.page_count, 1);
    assert_eq!(preview.page_width_mm, PAGE_WIDTH_MM);
    assert_eq!(preview.page_height_mm, PAGE_HEIGHT_MM);
    assert!(preview.bytes().starts_with(b"%PDF-"));
}

#[test]
fn test_registration_code_and_expiry_boxes() {
    let document = CertificateBuilder::new(logos()).build(&full_record());
    let page = &document.pages()[0];
    let boxes: Vec<_> = fill_rects(&document, 0)
        .into_iter()
        .filter(|(_, color)| *color == Rgb(240, 240, 240))
        .map(|(rect, _)| rect)
        .collect();
    assert_eq!(boxes.len(), 2);

    let texts = all_text(&document);
    let cases = [
        ("PF010-2025-001234", Rgb(0, 102, 204), boxes[0]),
        ("15 de enero de 2027", Rgb(220, 53, 69), boxes[1]),
    ];
    for (value, color, rect) in cases {
        let op = page.find_text(value).unwrap();
        let bounds = op.bounds();

        assert_eq!(op.color, color);
        assert_eq!(op.face, FontFace::Bold);
        assert!(rect.contains(&bounds), "{value} escapes its box");
        assert!((bounds.x + bounds.width / 2.0 - rect.center_x()).abs() < 1e-3);

        let overlapping: Vec<&str> = texts
            .iter()
            .filter(|other| other.text != value && other.bounds().intersects(&bounds))
            .map(|other| other.text.as_str())
            .collect();
        assert!(overlapping.is_empty(), "{value} overlapped by {overlapping:?}");
    }
}

#[test]
fn test_missing_logos_do_not_move_text() {
    let record = full_record();
    let with_logos = CertificateBuilder::new(logos()).build(&record);
    let without_logos = CertificateBuilder::without_assets().build(&record);
    let one_logo = CertificateBuilder::new(MemoryAssets::new().with(DEFAULT_COUNTRY_LOGO, png(10, 10)))
        .build(&record);

    assert_eq!(all_text(&with_logos), all_text(&without_logos));
    assert_eq!(all_text(&with_logos), all_text(&one_logo));
    assert_eq!(fill_rects(&with_logos, 0), fill_rects(&without_logos, 0));
}

#[test]
fn test_full_record_paginates_and_signs_last_page() {
    let document = CertificateBuilder::without_assets().build(&full_record());
    assert_eq!(document.page_count(), 2);

    let last = document.pages().last().unwrap();
    let signature = last.find_text("Firma Gerente de Arsa").unwrap();
    assert_eq!(signature.baseline, CONTENT_FLOOR_MM);
    assert!(document.pages()[0].find_text("Firma Gerente de Arsa").is_none());

    // Every page carries the decoration band.
    for index in 0..document.page_count() {
        assert_eq!(fill_rects(&document, index)[0].1, Rgb(208, 247, 248));
    }
}

#[test]
fn test_section_order_on_first_page() {
    let document = CertificateBuilder::without_assets().build(&full_record());
    let page = &document.pages()[0];
    let baseline = |text: &str| page.find_text(text).unwrap().baseline;

    let ordered = [
        baseline("CERTIFICADO DE REGISTRO SANITARIO"),
        baseline("RESOLUCIÓN: 15 de enero de 2025, DE FECHA: 15 de enero de 2025."),
        baseline("PF010-2025-001234"),
        baseline("15 de enero de 2027"),
        baseline("Datos del Registro:"),
        baseline("Titular: COSMÉTICOS HONDURAS S.A. DE C.V."),
        baseline("Observaciones:"),
        baseline("Cláusula de cancelación:"),
    ];
    assert!(ordered.windows(2).all(|w| w[0] < w[1]), "{ordered:?}");
}

#[test]
fn test_baselines_never_decrease_within_a_page() {
    let document = CertificateBuilder::without_assets().build(&full_record());
    for page in document.pages() {
        let baselines: Vec<f32> = page.text_ops().map(|op| op.baseline).collect();
        assert!(baselines.windows(2).all(|w| w[0] <= w[1]), "{baselines:?}");
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn prop_wrap_respects_width(
        text in "[A-Za-záéíóúñÑ0-9,.;:\"() ]{0,300}",
        size in 8.0f32..16.0,
        width in 20.0f32..180.0,
    ) {
        let lines = wrap_text(&text, FontFace::Regular, size, width);
        for line in &lines {
            let too_wide = FontFace::Regular.text_width_mm(line, size) > width + 1e-3;
            prop_assert!(!too_wide || line.chars().count() == 1, "{line:?} exceeds {width}");
        }
        let rejoined: String = lines.concat().chars().filter(|c| *c != ' ').collect();
        let original: String = text.chars().filter(|c| *c != ' ').collect();
        prop_assert_eq!(rejoined, original);
    }

    #[test]
    fn prop_build_is_total_and_stays_above_floor(
        code in "[A-Z0-9-]{0,24}",
        expiry in "[a-z0-9 ]{0,30}",
        product in proptest::option::of("[A-Za-z ]{0,120}"),
        holder in proptest::option::of("[A-Za-z .]{0,120}"),
        observations in proptest::option::of("[a-z ]{0,1500}"),
        clause in proptest::option::of("[a-z ]{0,1500}"),
    ) {
        let record = CertificateRecord {
            product_name: product,
            holder_name: holder,
            observations,
            cancellation_clause: clause,
            ..CertificateRecord::new(code, expiry)
        };
        let document = CertificateBuilder::without_assets().build(&record);

        prop_assert!(document.page_count() >= 1);
        for page in document.pages() {
            for op in page.text_ops() {
                prop_assert!(op.baseline <= CONTENT_FLOOR_MM + 1e-3);
                prop_assert!(op.baseline > 0.0);
            }
        }
        let signature = document.pages().last().and_then(|p| p.find_text("Firma Gerente de Arsa"));
        prop_assert!(signature.is_some());
    }
}

#[test]
fn test_wrapped_lines_fit_content_width() {
    let document = CertificateBuilder::without_assets().build(&full_record());
    for op in all_text(&document) {
        if op.x == 20.0 {
            assert!(op.width_mm() <= CONTENT_WIDTH_MM + 1e-3, "{:?}", op.text);
        }
    }
}
