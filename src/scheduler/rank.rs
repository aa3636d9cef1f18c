//! Classement des candidats pour un créneau.

use crate::model::{DayType, Medic};
use chrono::Weekday;
use rand::Rng;
use std::cmp::Ordering;

/// En dessous de ce nombre de plantões dans le mois, un médecin passe devant
/// les plus chargés lors d'un classement pondéré.
pub const WORKLOAD_THRESHOLD: u32 = 4;

/// Contexte de classement : mois, type de journée, pondération par priorité.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankContext {
    pub month: u32,
    pub day_type: DayType,
    pub weighted: bool,
}

impl RankContext {
    pub fn weighted(month: u32, day_type: DayType) -> Self {
        Self {
            month,
            day_type,
            weighted: true,
        }
    }

    #[cfg(test)]
    pub fn unweighted(month: u32, day_type: DayType) -> Self {
        Self {
            month,
            day_type,
            weighted: false,
        }
    }
}

/// Compare deux médecins ; `Less` = `a` passe devant.
///
/// Fonction pure : une égalité renvoie `Equal`, le tirage au sort est fait
/// par [`rank_pool`].
pub fn compare(ctx: &RankContext, a: &Medic, b: &Medic) -> Ordering {
    let prefers = |m: &Medic| m.prefers(ctx.day_type);
    prefers(b)
        .cmp(&prefers(a))
        .then_with(|| {
            if !ctx.weighted {
                return Ordering::Equal;
            }
            let light = |m: &Medic| m.stats(ctx.month).count() < WORKLOAD_THRESHOLD;
            light(b)
                .cmp(&light(a))
                .then_with(|| a.priority.cmp(&b.priority))
        })
        .then_with(|| day_type_tie_break(ctx, a, b))
}

fn day_type_tie_break(ctx: &RankContext, a: &Medic, b: &Medic) -> Ordering {
    match ctx.day_type {
        // priorité inversée pour répartir la charge
        DayType::Holiday => a
            .holiday_total()
            .cmp(&b.holiday_total())
            .then_with(|| b.priority.cmp(&a.priority)),
        DayType::Weekday(Weekday::Sat | Weekday::Sun) => {
            let pct = |m: &Medic| m.stats(ctx.month).weekend_percent();
            pct(a)
                .cmp(&pct(b))
                .then_with(|| b.priority.cmp(&a.priority))
        }
        day @ DayType::Weekday(_) => {
            let on_day = |m: &Medic| m.stats(ctx.month).get(day);
            on_day(a).cmp(&on_day(b))
        }
    }
}

/// Ordonne une copie du pool (indices dans `medics`).
///
/// Chaque candidat tire une clé aléatoire, comparée en dernier : les égalités
/// sont départagées au hasard tout en gardant un ordre total.
pub fn rank_pool<R: Rng>(medics: &[Medic], ctx: &RankContext, rng: &mut R) -> Vec<usize> {
    let mut pool: Vec<(usize, u64)> = (0..medics.len()).map(|i| (i, rng.random())).collect();
    pool.sort_by(|(a, ka), (b, kb)| compare(ctx, &medics[*a], &medics[*b]).then(ka.cmp(kb)));
    pool.into_iter().map(|(i, _)| i).collect()
}
