//! Review phase definitions
//!
//! A [`Phase`] is one stage of the simulated government review: a short
//! name, a display title and a checklist revealed item by item while the
//! phase is active. Phases are plain immutable data; the orchestrator reads
//! them and never changes them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable ordering key of a phase within a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseId(pub u32);

impl PhaseId {
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PhaseId {
    fn from(id: u32) -> Self {
        PhaseId(id)
    }
}

/// One review stage with its checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: PhaseId,
    /// Short label, e.g. `SAC`.
    pub name: String,
    /// Display line shown while the phase is active.
    pub title: String,
    /// Checklist entries, revealed in this order.
    pub items: Vec<String>,
}

impl Phase {
    pub fn new<I, S>(id: u32, name: impl Into<String>, title: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: PhaseId(id),
            name: name.into(),
            title: title.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// The four-stage review used by the cosmetic-product registration procedure.
#[must_use]
pub fn review_phases() -> Vec<Phase> {
    vec![
        Phase::new(
            1,
            "SAC",
            "Revisión SAC - Verificación de documentación",
            [
                "Verificando que toda la información esté completa",
                "Validando documentos solicitados cargados",
                "Admitiendo solicitud para revisión técnica",
            ],
        ),
        Phase::new(
            2,
            "Verificación Técnica",
            "Revisión Técnica - Productos Farmacéuticos",
            [
                "Asignando a técnico de productos farmacéuticos",
                "Revisando minuciosamente la documentación",
                "Emitiendo informe técnico conforme",
            ],
        ),
        Phase::new(
            3,
            "Fase Legal",
            "Revisión Legal",
            [
                "Revisando cumplimiento normativo",
                "Evaluando aspectos legales del trámite",
                "Emitiendo informe legal conforme",
            ],
        ),
        Phase::new(
            4,
            "Emisión",
            "Emisión del Certificado",
            [
                "Generando certificado de registro sanitario",
                "Finalizando trámite",
                "Preparando envío por correo electrónico",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_phases_are_ordered_and_complete() {
        let phases = review_phases();
        assert_eq!(phases.len(), 4);

        let ids: Vec<u32> = phases.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        for phase in &phases {
            assert_eq!(phase.item_count(), 3, "phase {} checklist", phase.name);
            assert!(!phase.title.is_empty());
        }
    }

    #[test]
    fn test_first_and_last_phase_content() {
        let phases = review_phases();
        assert_eq!(phases[0].name, "SAC");
        assert_eq!(
            phases[0].items[0],
            "Verificando que toda la información esté completa"
        );
        assert_eq!(phases[3].title, "Emisión del Certificado");
        assert_eq!(
            phases[3].items[2],
            "Preparando envío por correo electrónico"
        );
    }

    #[test]
    fn test_phase_serializes_with_plain_id() {
        let phase = Phase::new(7, "X", "Title", ["a"]);
        let json = serde_json::to_value(&phase).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["items"][0], "a");
    }
}
