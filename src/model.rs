use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Identifiant fort pour Medic (le nom, unique dans une escala)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MedicId(String);

impl MedicId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MedicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tour d'un plantão : jour (`M`) ou nuit (`N`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Round {
    #[serde(rename = "M")]
    Day,
    #[serde(rename = "N")]
    Night,
}

impl Round {
    pub const ALL: [Round; 2] = [Round::Day, Round::Night];

    pub fn letter(self) -> char {
        match self {
            Round::Day => 'M',
            Round::Night => 'N',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'M' => Some(Round::Day),
            'N' => Some(Round::Night),
            _ => None,
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Round {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next().and_then(Round::from_letter), chars.next()) {
            (Some(round), None) => Ok(round),
            _ => Err(format!("unknown round: {s}")),
        }
    }
}

/// Type de journée : un des sept jours de la semaine, ou férié.
///
/// Le férié est un bucket à part entière pour les stats et le classement,
/// jamais confondu avec un jour de semaine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DayType {
    Weekday(Weekday),
    Holiday,
}

impl DayType {
    pub const fn is_holiday(self) -> bool {
        matches!(self, DayType::Holiday)
    }

    fn rank_index(self) -> u32 {
        match self {
            DayType::Weekday(w) => w.num_days_from_monday(),
            DayType::Holiday => 7,
        }
    }

    /// Lettre de configuration : `2`..`6` lundi..vendredi, `S` samedi, `D` dimanche.
    pub fn letter(self) -> &'static str {
        match self {
            DayType::Weekday(Weekday::Mon) => "2",
            DayType::Weekday(Weekday::Tue) => "3",
            DayType::Weekday(Weekday::Wed) => "4",
            DayType::Weekday(Weekday::Thu) => "5",
            DayType::Weekday(Weekday::Fri) => "6",
            DayType::Weekday(Weekday::Sat) => "S",
            DayType::Weekday(Weekday::Sun) => "D",
            DayType::Holiday => "HD",
        }
    }

    pub fn from_letter(token: &str) -> Option<Self> {
        let weekday = match token.trim().to_ascii_uppercase().as_str() {
            "2" => Weekday::Mon,
            "3" => Weekday::Tue,
            "4" => Weekday::Wed,
            "5" => Weekday::Thu,
            "6" => Weekday::Fri,
            "S" => Weekday::Sat,
            "D" => Weekday::Sun,
            "HD" => return Some(DayType::Holiday),
            _ => return None,
        };
        Some(DayType::Weekday(weekday))
    }
}

impl PartialOrd for DayType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DayType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank_index().cmp(&other.rank_index())
    }
}

impl From<Weekday> for DayType {
    fn from(w: Weekday) -> Self {
        DayType::Weekday(w)
    }
}

impl From<DayType> for String {
    fn from(d: DayType) -> Self {
        d.letter().to_string()
    }
}

impl TryFrom<String> for DayType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        DayType::from_letter(&s).ok_or_else(|| format!("unknown day type: {s}"))
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// Jour férié déclaré dans le calendrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub name: String,
    pub date: NaiveDate,
}

/// Période de congés d'un médecin (intervalle de dates [start, end)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl VacationInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err("vacation end must not precede start".to_string());
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn overlaps(&self, first: NaiveDate, next: NaiveDate) -> bool {
        self.start < next && first < self.end
    }

    /// Chaque jour calendaire de l'intervalle.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start
            .iter_days()
            .take_while(move |d| *d < self.end)
    }
}

/// Compteurs mensuels d'un médecin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyStats {
    #[serde(default)]
    pub counts: BTreeMap<DayType, u32>,
    #[serde(default)]
    pub vacation_days: u32,
    #[serde(default)]
    pub quota: u32,
}

impl MonthlyStats {
    pub fn get(&self, day: DayType) -> u32 {
        self.counts.get(&day).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, day: DayType) {
        *self.counts.entry(day).or_insert(0) += 1;
    }

    /// Total des plantões du mois (le bucket férié n'est pas additionné).
    pub fn count(&self) -> u32 {
        self.counts
            .iter()
            .filter(|(day, _)| !day.is_holiday())
            .map(|(_, c)| *c)
            .sum()
    }

    pub fn holiday_count(&self) -> u32 {
        self.get(DayType::Holiday)
    }

    /// Plantões encore autorisés ce mois, congés déduits.
    pub fn allowance(&self) -> i64 {
        i64::from(self.quota) - i64::from(self.vacation_days)
    }

    pub fn available(&self) -> bool {
        i64::from(self.count()) < self.allowance()
    }

    /// min(samedis, dimanches) / quota ; 0 si quota nul.
    pub fn weekend_ratio(&self) -> f64 {
        if self.quota == 0 {
            return 0.0;
        }
        let sat = self.get(DayType::Weekday(Weekday::Sat));
        let sun = self.get(DayType::Weekday(Weekday::Sun));
        f64::from(sat.min(sun)) / f64::from(self.quota)
    }

    pub fn weekend_percent(&self) -> u32 {
        (self.weekend_ratio() * 100.0).round() as u32
    }
}

/// Médecin (membre de l'escala)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medic {
    pub id: MedicId,
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacation: Option<VacationInterval>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub preferences: BTreeSet<DayType>,
    stats: [MonthlyStats; 12],
}

impl Medic {
    /// Crée un médecin avec le même quota pour les douze mois.
    pub fn new<N: AsRef<str>>(name: N, quota: u32, priority: i32) -> Self {
        let mut medic = Self {
            id: MedicId::new(name),
            priority,
            vacation: None,
            preferences: BTreeSet::new(),
            stats: Default::default(),
        };
        medic.set_quota(quota);
        medic
    }

    pub fn with_preferences<I: IntoIterator<Item = DayType>>(mut self, prefs: I) -> Self {
        self.preferences.extend(prefs);
        self
    }

    pub fn with_vacation(mut self, vacation: VacationInterval) -> Self {
        self.set_vacation(Some(vacation));
        self
    }

    pub fn name(&self) -> &str {
        self.id.as_str()
    }

    pub fn set_quota(&mut self, quota: u32) {
        for stats in &mut self.stats {
            stats.quota = quota;
        }
    }

    /// Remplace les congés et recompte un jour par jour calendaire,
    /// crédité au mois où il tombe.
    pub fn set_vacation(&mut self, vacation: Option<VacationInterval>) {
        for stats in &mut self.stats {
            stats.vacation_days = 0;
        }
        if let Some(v) = vacation {
            for day in v.days() {
                self.stats_mut(day.month()).vacation_days += 1;
            }
        }
        self.vacation = vacation;
    }

    pub fn is_on_vacation(&self, date: NaiveDate) -> bool {
        self.vacation.is_some_and(|v| v.contains(date))
    }

    pub fn prefers(&self, day: DayType) -> bool {
        self.preferences.contains(&day)
    }

    /// Stats du mois `month` (1–12).
    pub fn stats(&self, month: u32) -> &MonthlyStats {
        &self.stats[month_index(month)]
    }

    pub fn stats_mut(&mut self, month: u32) -> &mut MonthlyStats {
        &mut self.stats[month_index(month)]
    }

    pub fn total_count(&self) -> u32 {
        self.stats.iter().map(MonthlyStats::count).sum()
    }

    /// Quota cumulé sur les mois donnés.
    pub fn total_quota(&self, months: &[u32]) -> u32 {
        months.iter().map(|m| self.stats(*m).quota).sum()
    }

    pub fn weekday_total(&self, day: DayType) -> u32 {
        self.stats.iter().map(|s| s.get(day)).sum()
    }

    pub fn holiday_total(&self) -> u32 {
        self.weekday_total(DayType::Holiday)
    }

    /// Part des week-ends sur l'ensemble des plantões, tous mois confondus.
    pub fn weekend_share(&self) -> f64 {
        let total = self.total_count();
        if total == 0 {
            return 0.0;
        }
        let sat = self.weekday_total(DayType::Weekday(Weekday::Sat));
        let sun = self.weekday_total(DayType::Weekday(Weekday::Sun));
        f64::from(sat.min(sun)) / f64::from(total)
    }
}

fn month_index(month: u32) -> usize {
    (month.clamp(1, 12) - 1) as usize
}

/// Créneau (date, tour) à pourvoir.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSlot {
    pub date: NaiveDate,
    pub round: Round,
    pub quorum: u32,
    #[serde(default)]
    pub assigned: Vec<MedicId>,
    #[serde(default)]
    pub blocked: BTreeSet<MedicId>,
    #[serde(default)]
    pub is_holiday: bool,
    pub is_open: bool,
}

impl ShiftSlot {
    pub fn new(date: NaiveDate, round: Round, quorum: u32) -> Self {
        Self {
            date,
            round,
            quorum,
            assigned: Vec::new(),
            blocked: BTreeSet::new(),
            is_holiday: false,
            is_open: true,
        }
    }

    pub fn key(&self) -> (NaiveDate, Round) {
        (self.date, self.round)
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn matches(&self, day: DayType) -> bool {
        match day {
            DayType::Holiday => self.is_holiday,
            DayType::Weekday(w) => self.weekday() == w,
        }
    }

    pub fn is_full(&self) -> bool {
        self.assigned.len() >= self.quorum as usize
    }

    /// Places restantes (négatif impossible : `assigned` ne dépasse jamais le quorum).
    pub fn open_seats(&self) -> u32 {
        self.quorum.saturating_sub(self.assigned.len() as u32)
    }

    pub fn is_assigned(&self, id: &MedicId) -> bool {
        self.assigned.contains(id)
    }

    pub fn is_blocked(&self, id: &MedicId) -> bool {
        self.blocked.contains(id)
    }

    /// Interdit ce créneau aux médecins donnés. Un médecin déjà assigné
    /// reste assigné et n'entre pas dans `blocked`.
    pub fn block<'a, I: IntoIterator<Item = &'a MedicId>>(&mut self, ids: I) {
        for id in ids {
            if !self.assigned.contains(id) {
                self.blocked.insert(id.clone());
            }
        }
    }

    pub fn next_date(&self) -> Option<NaiveDate> {
        self.date.checked_add_days(Days::new(1))
    }
}

/// État complet d'une génération (médecins + créneaux), persistable.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Snapshot {
    pub medics: Vec<Medic>,
    pub slots: Vec<ShiftSlot>,
}

impl Snapshot {
    pub fn find_medic(&self, name: &str) -> Option<&Medic> {
        self.medics.iter().find(|m| m.name() == name)
    }
}
