//! Chargement de l'escala depuis un fichier JSON.

use crate::calendar::Calendar;
use crate::model::{DayType, Medic, Round, VacationInterval};
use crate::scheduler::Scheduler;
use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Fichier d'escala complet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default = "default_quorum")]
    pub quorum: u32,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub holidays: Vec<HolidayConfig>,
    pub medics: Vec<MedicConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manual: Vec<ManualAssignment>,
}

fn default_quorum() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolidayConfig {
    pub name: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicConfig {
    pub name: String,
    pub shift_per_month: u32,
    #[serde(default)]
    pub order: i32,
    /// `[début, fin)` ; toute autre longueur est ignorée.
    #[serde(default)]
    pub vacations: Vec<NaiveDate>,
    #[serde(default)]
    pub preferences: Vec<String>,
}

/// Plantão imposé hors algorithme (typiquement un férié).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualAssignment {
    pub date: NaiveDate,
    pub round: Round,
    pub medic: String,
}

impl ScheduleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.end <= self.start {
            bail!("end date must be after start date");
        }
        if self.medics.is_empty() {
            bail!("schedule must contain at least one medic");
        }
        let mut seen = HashSet::new();
        for medic in &self.medics {
            if medic.name.trim().is_empty() {
                bail!("medic name cannot be empty");
            }
            if !seen.insert(medic.name.as_str()) {
                bail!("duplicate medic name: {}", medic.name);
            }
        }
        for m in &self.manual {
            if !seen.contains(m.medic.as_str()) {
                bail!("manual assignment references unknown medic: {}", m.medic);
            }
        }
        Ok(())
    }

    pub fn calendar(&self) -> Calendar {
        let mut calendar = Calendar::new(self.start, self.end);
        for h in &self.holidays {
            calendar.add_holiday(h.name.clone(), h.date);
        }
        for token in calendar.set_ignore_rules(&self.ignore) {
            warn!(token = %token, "ignoring malformed ignore rule");
        }
        calendar
    }

    /// Construit le moteur (calendrier + équipe), sans générer.
    pub fn to_scheduler(&self) -> Scheduler {
        let mut scheduler = Scheduler::new(self.calendar(), self.quorum);
        scheduler.add_medics(self.medics.iter().map(MedicConfig::to_medic).collect());
        scheduler
    }

    pub fn manual_for_month(&self, month: u32) -> impl Iterator<Item = &ManualAssignment> {
        self.manual.iter().filter(move |m| m.date.month() == month)
    }
}

impl MedicConfig {
    pub fn to_medic(&self) -> Medic {
        let mut medic = Medic::new(&self.name, self.shift_per_month, self.order);
        for token in &self.preferences {
            match DayType::from_letter(token) {
                Some(day @ DayType::Weekday(_)) => {
                    medic.preferences.insert(day);
                }
                _ => warn!(medic = %self.name, token = %token, "ignoring unknown preference"),
            }
        }
        match self.vacations.as_slice() {
            [] => {}
            [start, end] => match VacationInterval::new(*start, *end) {
                Ok(v) => medic.set_vacation(Some(v)),
                Err(err) => warn!(medic = %self.name, "{err}"),
            },
            other => warn!(
                medic = %self.name,
                len = other.len(),
                "vacations must be a [start, end] pair, ignored"
            ),
        }
        medic
    }
}

pub fn parse_config(json: &str) -> Result<ScheduleConfig> {
    let config: ScheduleConfig = serde_json::from_str(json).context("parsing schedule config")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ScheduleConfig> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_config(&data).with_context(|| format!("loading {}", path.display()))
}

/// Applique les assignations manuelles du mois ; les refus sont journalisés.
pub fn apply_manual(config: &ScheduleConfig, scheduler: &mut Scheduler, month: u32) -> usize {
    let mut applied = 0;
    for m in config.manual_for_month(month) {
        match scheduler.assign_manual(m.date, m.round, &m.medic) {
            Ok(()) => applied += 1,
            Err(err) => warn!(date = %m.date, round = %m.round, "manual assignment refused: {err}"),
        }
    }
    applied
}
