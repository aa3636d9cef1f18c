use crate::model::{MedicId, Round};
use chrono::{NaiveDate, Weekday};
use thiserror::Error;

/// Filtre pour la recherche des créneaux d'un médecin.
#[derive(Debug, Clone, Default)]
pub struct SlotFilter {
    pub month: Option<u32>,
    pub round: Option<Round>,
    /// Vide = tous les jours.
    pub weekdays: Vec<Weekday>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
    UnderQuorum,      // places restées vides
    OverQuorum,       // plus d'assignés que le quorum
    BlockedAssigned,  // assigné malgré un blocage
    DayThenNight,     // jour puis nuit le même jour
    NightThenDay,     // nuit puis jour le lendemain
    OverQuota,        // quota mensuel (congés déduits) dépassé
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: FindingKind,
    pub date: NaiveDate,
    pub round: Round,
    pub medic: Option<MedicId>,
}

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("unknown medic: {0}")]
    UnknownMedic(String),
    #[error("no slot on {date} round {round}")]
    UnknownSlot { date: NaiveDate, round: Round },
    #[error("slot {date} {round} is full")]
    SlotFull { date: NaiveDate, round: Round },
    #[error("{medic} already assigned on {date} {round}")]
    AlreadyAssigned {
        medic: String,
        date: NaiveDate,
        round: Round,
    },
    #[error("{medic} is blocked on {date} {round}")]
    Blocked {
        medic: String,
        date: NaiveDate,
        round: Round,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
