//! Citizen portal host: session, procedure lifecycle and the review flow.
//!
//! The portal owns what the library crates deliberately leave out: who is
//! logged in, which procedure is in progress, the demo certificate data and
//! the dates printed on it. [`Portal::run_review`] strings the pieces
//! together: simulated review, confirmation pause, certificate.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use tramite_certificate::{CertificateBuilder, CertificateRecord, DirectoryAssets, Document};
use tramite_config::Config;
use tramite_orchestrator::{OrchestratorHandle, ReviewTiming, TimedEvent};
use tramite_phases::{Phase, review_phases};
use tramite_utils::error::TramiteError;

/// Procedure code of the cosmetics sanitary registration.
pub const PROCEDURE_CODE: &str = "PF010";

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const OBSERVATIONS: &str = "La emisión del presente certificado y la impresión en soporte físico es una \
reproducción del documento original que se encuentra en formato electrónico, cuya representación \
digital goza de plena autenticidad, integridad y no repudio; lo anterior con fundamento en el Decreto \
Ejecutivo PCM-016-2020 Articulo 02, Articulo 7 de la Ley sobre Firmas Electrónicas reformado mediante \
Decreto Legislativo 33-2020 Artículo 38 inciso \"A\".";

const CANCELLATION_CLAUSE: &str = "El (La) NUEVO REGISTRO SANITARIO aquí autorizado podrá en cualquier \
momento ser cancelado cuando por información actualizada el uso del producto resulte no seguro; por \
falsificación o alteración de los documentos utilizados en el registro o inscripción sanitaria; cuando \
no cumpla con las especificaciones del fabricante consignados en la hoja de seguridad; cuando el \
producto se comercialice en condiciones diferentes con las cuales fue aprobado.";

fn session_error(reason: impl Into<String>) -> TramiteError {
    TramiteError::Session {
        reason: reason.into(),
    }
}

/// The logged-in citizen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub identity: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureStatus {
    InProgress,
    Completed,
}

/// One application moving through the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Procedure {
    pub code: String,
    pub status: ProcedureStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Procedure {
    fn start(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            status: ProcedureStatus::InProgress,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    fn complete(&mut self) {
        if self.status == ProcedureStatus::InProgress {
            self.status = ProcedureStatus::Completed;
            self.finished_at = Some(Utc::now());
        }
    }
}

/// Authentication state plus the current procedure.
#[derive(Debug, Default)]
pub struct Session {
    user: Option<User>,
    procedure: Option<Procedure>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log in as `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`TramiteError::Session`] for a blank identity.
    pub fn login(&mut self, identity: &str) -> Result<&User, TramiteError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(session_error("an identity is required to log in"));
        }
        debug!(identity, "Session opened");
        Ok(&*self.user.insert(User {
            identity: identity.to_string(),
        }))
    }

    /// Clear the user and any procedure in progress.
    pub fn logout(&mut self) {
        self.user = None;
        self.procedure = None;
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn procedure(&self) -> Option<&Procedure> {
        self.procedure.as_ref()
    }

    /// Start `code`, replacing any previous procedure.
    ///
    /// # Errors
    ///
    /// Returns [`TramiteError::Session`] when nobody is logged in.
    pub fn start_procedure(&mut self, code: &str) -> Result<&Procedure, TramiteError> {
        if !self.is_authenticated() {
            return Err(session_error("log in before starting a procedure"));
        }
        Ok(&*self.procedure.insert(Procedure::start(code)))
    }

    /// Mark the current procedure completed. Returns `false` if there is none.
    pub fn complete_procedure(&mut self) -> bool {
        match self.procedure.as_mut() {
            Some(procedure) => {
                procedure.complete();
                true
            }
            None => false,
        }
    }
}

/// Long Spanish date as printed on certificates, e.g. `15 de enero de 2027`.
#[must_use]
pub fn spanish_long_date(date: NaiveDate) -> String {
    let month = MONTHS_ES[date.month0() as usize];
    format!("{} de {month} de {}", date.day(), date.year())
}

/// Same calendar day two years later; 29 February rolls to 1 March.
#[must_use]
pub fn two_years_after(date: NaiveDate) -> NaiveDate {
    let year = date.year() + 2;
    date.with_year(year)
        .or_else(|| date.succ_opt().and_then(|next| next.with_year(year)))
        .unwrap_or(date)
}

/// Registration code `PF010-<year>-<serial>` with a six-digit serial.
#[must_use]
pub fn registration_code(issued_on: NaiveDate, serial: u32) -> String {
    format!("{PROCEDURE_CODE}-{}-{serial:06}", issued_on.year())
}

/// Demo record for a certificate issued on `issued_on`.
#[must_use]
pub fn sample_record(issued_on: NaiveDate, serial: u32) -> CertificateRecord {
    let issued = spanish_long_date(issued_on);
    CertificateRecord {
        product_name: Some("CREMA HIDRATANTE FACIAL".into()),
        cosmetic_form: Some("Crema".into()),
        commercial_presentation: Some("Frasco de 50ml".into()),
        holder_name: Some("COSMÉTICOS HONDURAS S.A. DE C.V.".into()),
        manufacturer_name: Some("LABORATORIOS INTERNACIONALES LTDA.".into()),
        distributor_name: Some("DISTRIBUIDORA CENTROAMERICANA S.A.".into()),
        responsible_professional: Some("Dr. Juan Carlos Pérez Martínez".into()),
        resolution_date: Some(issued.clone()),
        issuance_date: Some(issued),
        observations: Some(OBSERVATIONS.into()),
        cancellation_clause: Some(CANCELLATION_CLAUSE.into()),
        ..CertificateRecord::new(
            registration_code(issued_on, serial),
            spanish_long_date(two_years_after(issued_on)),
        )
    }
}

/// Review timing from the `[timing]` configuration.
#[must_use]
pub fn review_timing(config: &Config) -> ReviewTiming {
    ReviewTiming {
        phase_duration: config.timing.phase_duration(),
        item_interval: config.timing.item_interval(),
        settle_delay: config.timing.settle_delay(),
        confirmation_delay: config.timing.confirmation_delay(),
    }
}

/// Certificate builder from the `[certificate]` configuration.
///
/// Without an assets directory the certificate is drawn without logos.
#[must_use]
pub fn certificate_builder(config: &Config) -> CertificateBuilder {
    let certificate = &config.certificate;
    let builder = match &certificate.assets_dir {
        Some(dir) => CertificateBuilder::new(DirectoryAssets::new(dir.clone())),
        None => CertificateBuilder::without_assets(),
    };
    builder.with_logos(certificate.agency_logo(), certificate.country_logo())
}

/// Phases, timing and builder for one portal instance.
#[derive(Debug)]
pub struct Portal {
    phases: Vec<Phase>,
    timing: ReviewTiming,
    builder: CertificateBuilder,
}

impl Portal {
    #[must_use]
    pub fn new(phases: Vec<Phase>, timing: ReviewTiming, builder: CertificateBuilder) -> Self {
        Self {
            phases,
            timing,
            builder,
        }
    }

    /// The standard four-phase review with configured timing and assets.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(review_phases(), review_timing(config), certificate_builder(config))
    }

    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    #[must_use]
    pub fn timing(&self) -> &ReviewTiming {
        &self.timing
    }

    #[must_use]
    pub fn builder(&self) -> &CertificateBuilder {
        &self.builder
    }

    /// Start the procedure and its simulated review.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// `Session` when nobody is logged in; `Orchestrator` when the timing
    /// cannot fit a phase's checklist.
    pub fn begin_review(&self, session: &mut Session) -> Result<OrchestratorHandle, TramiteError> {
        let procedure = session.start_procedure(PROCEDURE_CODE)?;
        info!(code = %procedure.code, phases = self.phases.len(), "Procedure started");
        Ok(OrchestratorHandle::start(self.phases.clone(), self.timing)?)
    }

    /// Drain `handle`, then complete the procedure, wait out the
    /// confirmation delay and build the certificate for `record`.
    ///
    /// # Errors
    ///
    /// `Orchestrator(Cancelled)` when the run ends without completing.
    pub async fn finish_review<F>(
        &self,
        session: &mut Session,
        handle: &mut OrchestratorHandle,
        record: &CertificateRecord,
        observer: F,
    ) -> Result<Document, TramiteError>
    where
        F: FnMut(&TimedEvent),
    {
        let state = handle.wait_for_completion(observer).await?;
        session.complete_procedure();
        info!(
            run_id = state.run_id,
            progress_percent = state.progress_percent,
            "Review completed"
        );

        tokio::time::sleep(self.timing.confirmation_delay).await;
        Ok(self.builder.build(record))
    }

    /// [`begin_review`](Self::begin_review) then
    /// [`finish_review`](Self::finish_review).
    pub async fn run_review<F>(
        &self,
        session: &mut Session,
        record: &CertificateRecord,
        observer: F,
    ) -> Result<Document, TramiteError>
    where
        F: FnMut(&TimedEvent),
    {
        let mut handle = self.begin_review(session)?;
        self.finish_review(session, &mut handle, record, observer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_login_rejects_blank_identity() {
        let mut session = Session::new();
        assert!(session.login("   ").is_err());
        assert!(!session.is_authenticated());

        session.login(" 0801-1990-12345 ").unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.user().unwrap().identity, "0801-1990-12345");
    }

    #[test]
    fn test_logout_clears_procedure() {
        let mut session = Session::new();
        session.login("ana").unwrap();
        session.start_procedure(PROCEDURE_CODE).unwrap();
        assert!(session.procedure().is_some());

        session.logout();
        assert!(!session.is_authenticated());
        assert!(session.procedure().is_none());
    }

    #[test]
    fn test_procedure_requires_login() {
        let mut session = Session::new();
        let err = session.start_procedure(PROCEDURE_CODE).unwrap_err();
        assert!(matches!(err, TramiteError::Session { .. }));
        assert!(!session.complete_procedure());
    }

    #[test]
    fn test_complete_procedure_sets_timestamps() {
        let mut session = Session::new();
        session.login("ana").unwrap();
        session.start_procedure(PROCEDURE_CODE).unwrap();

        assert!(session.complete_procedure());
        let procedure = session.procedure().unwrap();
        assert_eq!(procedure.status, ProcedureStatus::Completed);
        let finished = procedure.finished_at.unwrap();
        assert!(finished >= procedure.started_at);

        // A second completion keeps the first timestamp.
        session.complete_procedure();
        assert_eq!(session.procedure().unwrap().finished_at, Some(finished));
    }

    #[test]
    fn test_spanish_long_date() {
        assert_eq!(spanish_long_date(date(2027, 1, 15)), "15 de enero de 2027");
        assert_eq!(spanish_long_date(date(2025, 9, 3)), "3 de septiembre de 2025");
        assert_eq!(spanish_long_date(date(2026, 12, 31)), "31 de diciembre de 2026");
    }

    #[test]
    fn test_two_years_after() {
        assert_eq!(two_years_after(date(2025, 1, 15)), date(2027, 1, 15));
        assert_eq!(two_years_after(date(2024, 2, 29)), date(2026, 3, 1));
    }

    #[test]
    fn test_registration_code_pads_serial() {
        assert_eq!(registration_code(date(2025, 1, 15), 1234), "PF010-2025-001234");
        assert_eq!(registration_code(date(2026, 6, 1), 0), "PF010-2026-000000");
    }

    #[test]
    fn test_sample_record_dates() {
        let record = sample_record(date(2025, 1, 15), 42);
        assert_eq!(record.registration_code, "PF010-2025-000042");
        assert_eq!(record.expiry_date, "15 de enero de 2027");
        assert_eq!(record.resolution_date.as_deref(), Some("15 de enero de 2025"));
        assert_eq!(record.issuance_date.as_deref(), Some("15 de enero de 2025"));
        assert_eq!(record.registration_fields().len(), 7);
    }
}
