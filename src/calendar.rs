//! Calendrier d'une escala : plage de dates, jours fériés et règles
//! d'exclusion (`ignore`).

use crate::model::{DayType, Holiday, Round};
use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Règle d'exclusion d'un couple (jour, tour).
///
/// Grammaire des jetons :
/// - `M12` / `N3` : tour + jour du mois (1–31), valable pour tous les mois ;
/// - `SM`, `DN`, `2M` … `6N` : jour de semaine + tour, pour chaque occurrence
///   dans la plage du calendrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreRule {
    DayOfMonth { round: Round, day: u32 },
    Weekday { weekday: Weekday, round: Round },
}

impl IgnoreRule {
    /// Analyse un jeton ; `None` si malformé.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim().to_ascii_uppercase();
        let mut chars = token.chars();
        let head = chars.next()?;
        let rest = chars.as_str();

        if let Some(round) = Round::from_letter(head) {
            let day: u32 = rest.parse().ok()?;
            if !(1..=31).contains(&day) {
                return None;
            }
            return Some(IgnoreRule::DayOfMonth { round, day });
        }

        let DayType::Weekday(weekday) = DayType::from_letter(&head.to_string())? else {
            return None;
        };
        let round = rest.parse::<Round>().ok()?;
        Some(IgnoreRule::Weekday { weekday, round })
    }
}

/// Plage [start, end) + fériés + règles d'exclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    #[serde(default)]
    pub ignore: Vec<IgnoreRule>,
}

impl Calendar {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            holidays: Vec::new(),
            ignore: Vec::new(),
        }
    }

    pub fn add_holiday<S: Into<String>>(&mut self, name: S, date: NaiveDate) {
        self.holidays.push(Holiday {
            name: name.into(),
            date,
        });
    }

    /// Remplace les règles d'exclusion. Les jetons invalides sont écartés
    /// et renvoyés à l'appelant, qui décide d'avertir ou non.
    pub fn set_ignore_rules<I, S>(&mut self, tokens: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rejected = Vec::new();
        self.ignore.clear();
        for token in tokens {
            let token = token.as_ref();
            if token.trim().is_empty() {
                continue;
            }
            match IgnoreRule::parse(token) {
                Some(rule) => self.ignore.push(rule),
                None => rejected.push(token.to_string()),
            }
        }
        rejected
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn holiday(&self, date: NaiveDate) -> Option<&Holiday> {
        self.holidays.iter().find(|h| h.date == date)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday(date).is_some()
    }

    /// Un férié n'est jamais exclu : son créneau doit exister pour
    /// l'assignation manuelle et les rapports.
    pub fn is_excluded(&self, date: NaiveDate, round: Round) -> bool {
        if self.is_holiday(date) {
            return false;
        }
        self.ignore.iter().any(|rule| match *rule {
            IgnoreRule::DayOfMonth { round: r, day } => r == round && date.day() == day,
            IgnoreRule::Weekday { weekday, round: r } => {
                r == round && date.weekday() == weekday && self.contains(date)
            }
        })
    }

    /// Résout un numéro de mois (1–12) en `[premier jour, premier jour du mois suivant)`
    /// dans l'année de `start`. `None` hors de la plage du calendrier.
    pub fn month_span(&self, month: u32) -> Option<(NaiveDate, NaiveDate)> {
        if !(1..=12).contains(&month) || month < self.start.month() {
            return None;
        }
        let first = NaiveDate::from_ymd_opt(self.start.year(), month, 1)?;
        if first >= self.end {
            return None;
        }
        let next = first.checked_add_months(Months::new(1))?;
        Some((first, next))
    }

    /// Mois (1–12) générables pour ce calendrier, dans l'ordre.
    pub fn months(&self) -> Vec<u32> {
        (1..=12).filter(|m| self.month_span(*m).is_some()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_tokens() {
        assert_eq!(
            IgnoreRule::parse("M12"),
            Some(IgnoreRule::DayOfMonth { round: Round::Day, day: 12 })
        );
        assert_eq!(
            IgnoreRule::parse(" sm "),
            Some(IgnoreRule::Weekday { weekday: Weekday::Sat, round: Round::Day })
        );
        assert_eq!(
            IgnoreRule::parse("DN"),
            Some(IgnoreRule::Weekday { weekday: Weekday::Sun, round: Round::Night })
        );
        for bad in ["", "M0", "N32", "Mx", "X1", "SX", "S", "7M", "2MN"] {
            assert_eq!(IgnoreRule::parse(bad), None, "token {bad:?}");
        }
    }

    #[test]
    fn rejected_tokens_are_reported_not_applied() {
        let mut cal = Calendar::new(d(2025, 11, 1), d(2025, 12, 1));
        let rejected = cal.set_ignore_rules(["SM", "bogus", "", "N5"]);
        assert_eq!(rejected, vec!["bogus".to_string()]);
        assert_eq!(cal.ignore.len(), 2);
    }

    #[test]
    fn weekday_rule_excludes_only_its_round() {
        let mut cal = Calendar::new(d(2025, 11, 1), d(2025, 12, 1));
        cal.set_ignore_rules(["SM"]);
        // 2025-11-08 est un samedi
        assert!(cal.is_excluded(d(2025, 11, 8), Round::Day));
        assert!(!cal.is_excluded(d(2025, 11, 8), Round::Night));
        assert!(!cal.is_excluded(d(2025, 11, 9), Round::Day));
    }

    #[test]
    fn holidays_are_never_excluded() {
        let mut cal = Calendar::new(d(2025, 12, 1), d(2026, 1, 1));
        cal.set_ignore_rules(["M25", "5M"]);
        cal.add_holiday("Natal", d(2025, 12, 25));
        assert!(cal.is_holiday(d(2025, 12, 25)));
        assert!(!cal.is_excluded(d(2025, 12, 25), Round::Day));
        assert!(cal.is_excluded(d(2025, 12, 18), Round::Day));
    }

    #[test]
    fn month_span_respects_range() {
        let cal = Calendar::new(d(2025, 10, 15), d(2025, 12, 1));
        assert_eq!(cal.month_span(9), None);
        assert_eq!(cal.month_span(10), Some((d(2025, 10, 1), d(2025, 11, 1))));
        assert_eq!(cal.month_span(11), Some((d(2025, 11, 1), d(2025, 12, 1))));
        assert_eq!(cal.month_span(12), None);
        assert_eq!(cal.month_span(13), None);
        assert_eq!(cal.months(), vec![10, 11]);
    }
}
