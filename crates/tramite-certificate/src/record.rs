//! Certificate record: the builder's only input.
//!
//! All fields are opaque, pre-formatted text. The builder never validates
//! them; that is the form collector's job.

use serde::{Deserialize, Serialize};

/// Data rendered into one sanitary registration certificate.
///
/// `registration_code` and `expiry_date` are required because they own the
/// two highlighted boxes. Every other field is optional, and a blank value
/// is treated exactly like an absent one.
///
/// Deserialization also accepts the field names used by the portal's
/// original data files (`CODIGO`, `fecha_fin_legal`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    #[serde(alias = "CODIGO")]
    pub registration_code: String,
    #[serde(alias = "fecha_fin_legal")]
    pub expiry_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none", alias = "nombre_producto")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "forma_cosmetica_producto")]
    pub cosmetic_form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "presentacion_comercial")]
    pub commercial_presentation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "nombre_titular")]
    pub holder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "nombre_fabricante_producto")]
    pub manufacturer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "nombre_distribuidor")]
    pub distributor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "nombre_profesional")]
    pub responsible_professional: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "fecha_resolucion_legal")]
    pub resolution_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "FECHA_INICIO_C")]
    pub issuance_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "observaciones")]
    pub observations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "clausula_cancelacion")]
    pub cancellation_clause: Option<String>,
}

/// Labels of the "Datos del Registro" section, in print order.
pub const REGISTRATION_LABELS: [&str; 7] = [
    "Nombre comercial",
    "Forma cosmética",
    "Presentación del Producto",
    "Titular",
    "Fabricantes",
    "Nombre del distribuidor",
    "Nombre del profesional responsable",
];

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl CertificateRecord {
    /// Record carrying only the two required fields.
    pub fn new(registration_code: impl Into<String>, expiry_date: impl Into<String>) -> Self {
        Self {
            registration_code: registration_code.into(),
            expiry_date: expiry_date.into(),
            ..Self::default()
        }
    }

    /// Present `(label, value)` pairs of the registration section.
    #[must_use]
    pub fn registration_fields(&self) -> Vec<(&'static str, &str)> {
        let values = [
            &self.product_name,
            &self.cosmetic_form,
            &self.commercial_presentation,
            &self.holder_name,
            &self.manufacturer_name,
            &self.distributor_name,
            &self.responsible_professional,
        ];
        REGISTRATION_LABELS
            .iter()
            .zip(values)
            .filter_map(|(label, value)| present(value.as_ref()).map(|v| (*label, v)))
            .collect()
    }

    /// The resolution sentence, built from whichever dates are present.
    #[must_use]
    pub fn resolution_line(&self) -> Option<String> {
        match (
            present(self.resolution_date.as_ref()),
            present(self.issuance_date.as_ref()),
        ) {
            (Some(res), Some(issued)) => Some(format!("RESOLUCIÓN: {res}, DE FECHA: {issued}.")),
            (Some(res), None) => Some(format!("RESOLUCIÓN: {res}.")),
            (None, Some(issued)) => Some(format!("DE FECHA: {issued}.")),
            (None, None) => None,
        }
    }

    #[must_use]
    pub fn observations(&self) -> Option<&str> {
        present(self.observations.as_ref())
    }

    #[must_use]
    pub fn cancellation_clause(&self) -> Option<&str> {
        present(self.cancellation_clause.as_ref())
    }
}
