#![forbid(unsafe_code)]
//! Medshift : génération d'escalas de plantão (jour `M` / nuit `N`) pour une
//! équipe de médecins, sans base de données.
//!
//! - Configuration JSON, exports CSV/JSON, état persistant.
//! - Remplissage glouton en quatre phases (week-ends et fériés, préférences,
//!   jours ordinaires), classement pondéré par priorité.
//! - Blocages de repos et d'alternance week-end propagés à chaque assignation.

pub mod calendar;
pub mod config;
pub mod io;
pub mod model;
pub mod report;
pub mod scheduler;
pub mod storage;

pub use calendar::{Calendar, IgnoreRule};
pub use config::{apply_manual, load_config, parse_config, ScheduleConfig};
pub use model::{
    DayType, Holiday, Medic, MedicId, MonthlyStats, Round, ShiftSlot, Snapshot, VacationInterval,
};
pub use report::{prepare_report, MonthSummary, ReportRenderer, TextReport};
pub use scheduler::{Finding, FindingKind, ScheduleError, Scheduler, SlotFilter};
pub use storage::{JsonStorage, Storage};
