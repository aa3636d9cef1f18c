//! Règles de blocage déclenchées par une assignation.
//!
//! Chaque règle associe un déclencheur (tour + jour éventuel du créneau qui
//! vient d'être pourvu) à une cible et un effet. L'ordre de la table est
//! l'ordre d'application : les blocages précèdent la duplication.

use super::{fill, util, Scheduler};
use crate::model::{Round, ShiftSlot};
use chrono::{Days, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Interdit la cible aux assignés du créneau déclencheur.
    Block,
    /// Assigne directement les mêmes médecins sur la cible.
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Créneau exact, `days` jours après la date du déclencheur.
    Offset { days: u64, round: Round },
    /// `nth`-ième créneau (1 = le prochain) après le déclencheur portant ce
    /// jour et ce tour, dans l'ordre (date, tour) de toute la collection.
    Following {
        weekday: Weekday,
        round: Round,
        nth: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub round: Round,
    pub weekday: Option<Weekday>,
    pub target: Target,
    pub effect: Effect,
}

impl Rule {
    pub fn applies_to(&self, slot: &ShiftSlot) -> bool {
        self.round == slot.round && self.weekday.map_or(true, |w| w == slot.weekday())
    }
}

const fn weekend_block(weekday: Weekday, nth: usize) -> Rule {
    Rule {
        round: Round::Day,
        weekday: Some(weekday),
        target: Target::Following { weekday, round: Round::Day, nth },
        effect: Effect::Block,
    }
}

const fn weekend_rules(weekday: Weekday) -> [Rule; 4] {
    [
        // le prochain même jour, puis les deux suivants : on pousse vers les nuits
        weekend_block(weekday, 1),
        weekend_block(weekday, 2),
        weekend_block(weekday, 3),
        // la nuit du même jour
        Rule {
            round: Round::Day,
            weekday: Some(weekday),
            target: Target::Offset { days: 0, round: Round::Night },
            effect: Effect::Block,
        },
    ]
}

pub const RULES: [Rule; 11] = {
    let sat = weekend_rules(Weekday::Sat);
    let sun = weekend_rules(Weekday::Sun);
    [
        // repos après une nuit
        Rule {
            round: Round::Night,
            weekday: None,
            target: Target::Offset { days: 1, round: Round::Day },
            effect: Effect::Block,
        },
        // pas de jour puis nuit
        Rule {
            round: Round::Day,
            weekday: None,
            target: Target::Offset { days: 0, round: Round::Night },
            effect: Effect::Block,
        },
        sat[0],
        sat[1],
        sat[2],
        sat[3],
        // le samedi jour entraîne le dimanche jour du même week-end
        Rule {
            round: Round::Day,
            weekday: Some(Weekday::Sat),
            target: Target::Offset { days: 1, round: Round::Day },
            effect: Effect::Duplicate,
        },
        sun[0],
        sun[1],
        sun[2],
        sun[3],
    ]
};

/// Index du créneau visé par `target` depuis `origin`, s'il existe.
pub fn resolve(slots: &[ShiftSlot], origin: usize, target: Target) -> Option<usize> {
    let from = slots.get(origin)?;
    match target {
        Target::Offset { days, round } => {
            let date = from.date.checked_add_days(Days::new(days))?;
            util::slot_index(slots, date, round)
        }
        Target::Following { weekday, round, nth } => slots
            .iter()
            .enumerate()
            .skip(origin + 1)
            .filter(|(_, s)| s.round == round && s.weekday() == weekday)
            .nth(nth.checked_sub(1)?)
            .map(|(i, _)| i),
    }
}

/// Applique la table après une assignation sur `origin`.
pub(super) fn propagate(scheduler: &mut Scheduler, origin: usize) {
    let source = scheduler.slots[origin].clone();
    for rule in RULES.iter().filter(|r| r.applies_to(&source)) {
        let Some(target) = resolve(&scheduler.slots, origin, rule.target) else {
            continue;
        };
        match rule.effect {
            Effect::Block => scheduler.slots[target].block(&source.assigned),
            Effect::Duplicate => {
                fill::assign_direct(scheduler, target, &source.assigned);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use crate::model::{Medic, MedicId};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Novembre 2025 sans médecin : seulement les créneaux vides.
    fn empty_november() -> Scheduler {
        november_ignoring(&[])
    }

    fn november_ignoring(tokens: &[&str]) -> Scheduler {
        let mut cal = Calendar::new(d(2025, 11, 1), d(2025, 12, 1));
        cal.set_ignore_rules(tokens);
        let mut s = Scheduler::new(cal, 1);
        assert!(s.generate(11, &mut StdRng::seed_from_u64(1)));
        s
    }

    #[test]
    fn table_shape() {
        let dup: Vec<_> = RULES.iter().filter(|r| r.effect == Effect::Duplicate).collect();
        assert_eq!(dup.len(), 1);
        assert_eq!(dup[0].weekday, Some(Weekday::Sat));
        assert!(RULES
            .iter()
            .filter(|r| r.weekday == Some(Weekday::Sun))
            .all(|r| r.effect == Effect::Block));
    }

    #[test]
    fn offsets_resolve_exact_dates() {
        let s = empty_november();
        let night_5 = util::slot_index(&s.slots, d(2025, 11, 5), Round::Night).unwrap();
        let day_6 = resolve(&s.slots, night_5, Target::Offset { days: 1, round: Round::Day }).unwrap();
        assert_eq!(s.slots[day_6].key(), (d(2025, 11, 6), Round::Day));

        let last_night = util::slot_index(&s.slots, d(2025, 11, 30), Round::Night).unwrap();
        assert_eq!(
            resolve(&s.slots, last_night, Target::Offset { days: 1, round: Round::Day }),
            None
        );
    }

    #[test]
    fn following_chains_over_weeks() {
        let s = empty_november();
        let sat_1 = util::slot_index(&s.slots, d(2025, 11, 1), Round::Day).unwrap();
        let third = resolve(
            &s.slots,
            sat_1,
            Target::Following { weekday: Weekday::Sat, round: Round::Day, nth: 3 },
        )
        .unwrap();
        assert_eq!(s.slots[third].date, d(2025, 11, 22));
        let night = resolve(
            &s.slots,
            sat_1,
            Target::Following { weekday: Weekday::Sat, round: Round::Night, nth: 1 },
        )
        .unwrap();
        assert_eq!(s.slots[night].key(), (d(2025, 11, 1), Round::Night));
    }

    #[test]
    fn saturday_day_blocks_and_pairs_sunday() {
        let mut s = empty_november();
        s.add_medics(vec![Medic::new("ana", 8, 1)]);
        let ana = MedicId::new("ana");
        s.assign_manual(d(2025, 11, 8), Round::Day, "ana").unwrap();

        let slot = |s: &Scheduler, day: u32, round: Round| s.slot(d(2025, 11, day), round).unwrap().clone();
        for sat in [15, 22, 29] {
            assert!(slot(&s, sat, Round::Day).is_blocked(&ana), "sat {sat}");
        }
        assert!(slot(&s, 8, Round::Night).is_blocked(&ana));
        assert!(!slot(&s, 1, Round::Day).is_blocked(&ana));

        let sunday = slot(&s, 9, Round::Day);
        assert_eq!(sunday.assigned, vec![ana.clone()]);
        // la duplication déclenche à son tour les règles du dimanche
        assert!(slot(&s, 9, Round::Night).is_blocked(&ana));
        assert!(slot(&s, 16, Round::Day).is_blocked(&ana));
        assert_eq!(s.medic("ana").unwrap().stats(11).count(), 2);
    }

    #[test]
    fn night_blocks_next_day_and_day_blocks_same_night() {
        let mut s = empty_november();
        s.add_medics(vec![Medic::new("bia", 8, 1)]);
        let bia = MedicId::new("bia");
        s.assign_manual(d(2025, 11, 4), Round::Night, "bia").unwrap();
        assert!(s.slot(d(2025, 11, 5), Round::Day).unwrap().is_blocked(&bia));
        assert!(!s.slot(d(2025, 11, 5), Round::Night).unwrap().is_blocked(&bia));

        s.assign_manual(d(2025, 11, 12), Round::Day, "bia").unwrap();
        assert!(s.slot(d(2025, 11, 12), Round::Night).unwrap().is_blocked(&bia));
        assert!(!s.slot(d(2025, 11, 13), Round::Day).unwrap().is_blocked(&bia));
    }

    #[test]
    fn weekend_targets_stay_on_the_same_weekend() {
        // dimanche 2 jour exclu : rien à dupliquer, le week-end suivant est intact
        let mut s = november_ignoring(&["M2"]);
        s.add_medics(vec![Medic::new("ana", 8, 1)]);
        let ana = MedicId::new("ana");
        s.assign_manual(d(2025, 11, 1), Round::Day, "ana").unwrap();
        assert!(s.slot(d(2025, 11, 2), Round::Day).is_none());
        assert!(s.slot(d(2025, 11, 9), Round::Day).unwrap().assigned.is_empty());
        assert!(!s.slot(d(2025, 11, 16), Round::Day).unwrap().is_blocked(&ana));
        assert_eq!(s.medic("ana").unwrap().stats(11).count(), 1);

        // samedi 8 nuit exclue : la nuit du samedi suivant reste libre
        let mut s = november_ignoring(&["N8"]);
        s.add_medics(vec![Medic::new("bia", 8, 1)]);
        let bia = MedicId::new("bia");
        s.assign_manual(d(2025, 11, 8), Round::Day, "bia").unwrap();
        assert!(s.slot(d(2025, 11, 8), Round::Night).is_none());
        assert!(!s.slot(d(2025, 11, 15), Round::Night).unwrap().is_blocked(&bia));
        assert!(s.slot(d(2025, 11, 15), Round::Day).unwrap().is_blocked(&bia));
        assert!(s.slot(d(2025, 11, 9), Round::Day).unwrap().is_assigned(&bia));
    }
}
