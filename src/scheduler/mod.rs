mod audit;
mod fill;
mod generate;
mod manual;
pub mod propagation;
mod query;
pub mod rank;
mod types;
mod util;

pub use generate::{ORDINARY_WEEKDAYS, PRIORITY_GROUP};
pub use rank::{compare, RankContext, WORKLOAD_THRESHOLD};
pub use types::{Finding, FindingKind, ScheduleError, SlotFilter};

use crate::calendar::Calendar;
use crate::model::{Medic, Round, ShiftSlot, Snapshot};
use chrono::NaiveDate;
use rand::Rng;

/// Scheduler : calendrier + équipe + créneaux générés
#[derive(Debug, Clone)]
pub struct Scheduler {
    calendar: Calendar,
    min_quorum: u32,
    medics: Vec<Medic>,
    slots: Vec<ShiftSlot>,
}

impl Scheduler {
    pub fn new(calendar: Calendar, min_quorum: u32) -> Self {
        Self {
            calendar,
            min_quorum,
            medics: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Reprend l'état d'une génération sauvegardée.
    pub fn from_snapshot(calendar: Calendar, min_quorum: u32, snapshot: Snapshot) -> Self {
        Self {
            calendar,
            min_quorum,
            medics: snapshot.medics,
            slots: snapshot.slots,
        }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }
    pub fn min_quorum(&self) -> u32 {
        self.min_quorum
    }
    pub fn medics(&self) -> &[Medic] {
        &self.medics
    }
    pub fn slots(&self) -> &[ShiftSlot] {
        &self.slots
    }

    pub fn medic(&self, name: &str) -> Option<&Medic> {
        self.medics.iter().find(|m| m.name() == name)
    }

    pub fn add_medics(&mut self, medics: Vec<Medic>) {
        self.medics.extend(medics);
    }

    /// Vide la collection de créneaux. Les compteurs des médecins sont conservés.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Génère le mois `month` (1–12). Renvoie `false` (sans rien faire) si le
    /// mois est hors du calendrier.
    ///
    /// Regénérer un mois sans remettre les médecins à zéro cumule les
    /// compteurs : ce n'est pas idempotent.
    pub fn generate<R: Rng>(&mut self, month: u32, rng: &mut R) -> bool {
        generate::generate(self, month, rng)
    }

    /// Génère tous les mois du calendrier, du dernier au premier, pour que les
    /// règles qui regardent en avant trouvent les mois suivants déjà créés.
    pub fn generate_calendar<R: Rng>(&mut self, rng: &mut R) -> Vec<u32> {
        (1..=12)
            .rev()
            .filter(|m| self.generate(*m, rng))
            .collect()
    }

    pub fn assign_manual(
        &mut self,
        date: NaiveDate,
        round: Round,
        name: &str,
    ) -> Result<(), ScheduleError> {
        manual::assign_manual(self, date, round, name)
    }

    pub fn audit(&self, month: Option<u32>) -> Vec<Finding> {
        audit::audit(self, month)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            medics: self.medics.clone(),
            slots: self.slots.clone(),
        }
    }
}
