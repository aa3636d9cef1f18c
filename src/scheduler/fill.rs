use super::rank::{self, RankContext};
use super::{propagation, util, Scheduler};
use crate::model::{DayType, Medic, MedicId, ShiftSlot};
use rand::Rng;
use tracing::trace;

/// Pourvoit au plus une place de `slot_idx` avec le meilleur candidat
/// éligible du pool classé. Renvoie `true` si quelqu'un a été assigné.
pub(super) fn fill_one<R: Rng>(
    scheduler: &mut Scheduler,
    slot_idx: usize,
    ctx: &RankContext,
    rng: &mut R,
) -> bool {
    let slot = &scheduler.slots[slot_idx];
    if slot.is_full() || !slot.is_open {
        return false;
    }

    let ranked = rank::rank_pool(&scheduler.medics, ctx, rng);
    let chosen = ranked
        .into_iter()
        .find(|&m| is_eligible(slot, &scheduler.medics[m]));

    let Some(medic_idx) = chosen else {
        trace!(date = %slot.date, round = %slot.round, "no eligible medic, slot stays under quorum");
        return false;
    };

    seat(scheduler, slot_idx, medic_idx);
    propagation::propagate(scheduler, slot_idx);
    true
}

/// Assigne directement, sans classement, chaque médecin éligible de `ids`
/// tant qu'il reste de la place. Renvoie le nombre d'assignés.
pub(super) fn assign_direct(scheduler: &mut Scheduler, slot_idx: usize, ids: &[MedicId]) -> usize {
    if !scheduler.slots[slot_idx].is_open {
        return 0;
    }

    let mut added = 0;
    for id in ids {
        let slot = &scheduler.slots[slot_idx];
        if slot.is_full() {
            break;
        }
        let Some(medic_idx) = util::medic_index(&scheduler.medics, id) else {
            continue;
        };
        if !is_eligible(slot, &scheduler.medics[medic_idx]) {
            continue;
        }
        seat(scheduler, slot_idx, medic_idx);
        added += 1;
    }

    if added > 0 {
        propagation::propagate(scheduler, slot_idx);
    }
    added
}

pub(super) fn is_eligible(slot: &ShiftSlot, medic: &Medic) -> bool {
    !slot.is_assigned(&medic.id)
        && medic.stats(slot.month()).available()
        && !slot.is_blocked(&medic.id)
}

/// Inscrit le médecin et met ses compteurs à jour. Aucun contrôle ici.
pub(super) fn seat(scheduler: &mut Scheduler, slot_idx: usize, medic_idx: usize) {
    let slot = &mut scheduler.slots[slot_idx];
    let medic = &mut scheduler.medics[medic_idx];

    let stats = medic.stats_mut(slot.month());
    if slot.is_holiday {
        stats.increment(DayType::Holiday);
    }
    stats.increment(DayType::Weekday(slot.weekday()));

    trace!(medic = %medic.id, date = %slot.date, round = %slot.round, "assigned");
    slot.assigned.push(medic.id.clone());
    slot.assigned.sort();
}
