use super::rank::RankContext;
use super::{fill, util, Scheduler};
use crate::model::{DayType, Round, ShiftSlot};
use chrono::{NaiveDate, Weekday};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Fériés, vendredis et week-ends : pourvus en premier, dans cet ordre.
pub const PRIORITY_GROUP: [DayType; 4] = [
    DayType::Holiday,
    DayType::Weekday(Weekday::Fri),
    DayType::Weekday(Weekday::Sat),
    DayType::Weekday(Weekday::Sun),
];

/// Jours ordinaires, mélangés à chaque génération.
pub const ORDINARY_WEEKDAYS: [Weekday; 4] = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu];

pub(super) fn generate<R: Rng>(scheduler: &mut Scheduler, month: u32, rng: &mut R) -> bool {
    let Some((first, next)) = scheduler.calendar.month_span(month) else {
        debug!(month, "month outside calendar range, nothing generated");
        return false;
    };

    build_slots(scheduler, first, next);
    block_vacations(scheduler, first, next);

    for day_type in PRIORITY_GROUP {
        fill_day_type(scheduler, month, first, next, day_type, rng);
    }

    assign_preferences(scheduler, first, next);

    let mut weekdays = ORDINARY_WEEKDAYS;
    weekdays.shuffle(rng);
    debug!(month, order = ?weekdays, "ordinary weekday pass");
    for weekday in weekdays {
        fill_day_type(scheduler, month, first, next, DayType::Weekday(weekday), rng);
    }

    util::sort_slots(&mut scheduler.slots);
    debug!(
        month,
        slots = scheduler.month_slot_count(month),
        open_seats = scheduler.under_quorum(month).iter().map(|s| s.open_seats()).sum::<u32>(),
        "month generated"
    );
    true
}

/// Recrée les créneaux du mois (ceux d'une génération précédente du même
/// mois sont remplacés ; les compteurs, eux, ne sont pas remis à zéro).
fn build_slots(scheduler: &mut Scheduler, first: NaiveDate, next: NaiveDate) {
    scheduler.slots.retain(|s| !util::in_span(s, first, next));

    let calendar = &scheduler.calendar;
    for date in first.iter_days().take_while(|d| *d < next) {
        for round in Round::ALL {
            if calendar.is_excluded(date, round) {
                continue;
            }
            let mut slot = ShiftSlot::new(date, round, scheduler.min_quorum);
            if calendar.is_holiday(date) {
                slot.is_holiday = true;
                // assignation manuelle uniquement
                slot.is_open = false;
            }
            scheduler.slots.push(slot);
        }
    }

    util::sort_slots(&mut scheduler.slots);
}

fn block_vacations(scheduler: &mut Scheduler, first: NaiveDate, next: NaiveDate) {
    for medic in &scheduler.medics {
        let Some(vacation) = medic.vacation else {
            continue;
        };
        if !vacation.overlaps(first, next) {
            continue;
        }
        for slot in scheduler
            .slots
            .iter_mut()
            .filter(|s| util::in_span(s, first, next) && vacation.contains(s.date))
        {
            slot.block([&medic.id]);
        }
    }
}

fn fill_day_type<R: Rng>(
    scheduler: &mut Scheduler,
    month: u32,
    first: NaiveDate,
    next: NaiveDate,
    day_type: DayType,
    rng: &mut R,
) {
    let ctx = RankContext::weighted(month, day_type);
    for idx in 0..scheduler.slots.len() {
        let slot = &scheduler.slots[idx];
        if !util::in_span(slot, first, next) || !slot.matches(day_type) || slot.is_full() {
            continue;
        }
        for _ in 0..slot.quorum {
            fill::fill_one(scheduler, idx, &ctx, rng);
        }
    }
}

/// Les préférences passent avant les jours ordinaires, par priorité
/// croissante, sans classement.
fn assign_preferences(scheduler: &mut Scheduler, first: NaiveDate, next: NaiveDate) {
    let mut order: Vec<usize> = (0..scheduler.medics.len()).collect();
    order.sort_by_key(|&i| scheduler.medics[i].priority);

    for medic_idx in order {
        let medic = &scheduler.medics[medic_idx];
        if medic.preferences.is_empty() {
            continue;
        }
        let id = [medic.id.clone()];
        let targets: Vec<usize> = scheduler
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| util::in_span(s, first, next) && !s.is_full())
            .filter(|(_, s)| medic.preferences.iter().any(|p| s.matches(*p)))
            .map(|(i, _)| i)
            .collect();

        for idx in targets {
            fill::assign_direct(scheduler, idx, &id);
        }
    }
}
