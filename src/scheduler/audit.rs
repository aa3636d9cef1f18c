use super::{util, Finding, FindingKind, Scheduler};
use crate::model::{Round, ShiftSlot};

pub(super) fn audit(scheduler: &Scheduler, month: Option<u32>) -> Vec<Finding> {
    let in_scope = |s: &&ShiftSlot| month.map_or(true, |m| s.month() == m);
    let mut out = Vec::new();

    for slot in scheduler.slots.iter().filter(in_scope) {
        let finding = |kind, medic| Finding {
            kind,
            date: slot.date,
            round: slot.round,
            medic,
        };
        if slot.assigned.len() > slot.quorum as usize {
            out.push(finding(FindingKind::OverQuorum, None));
        } else if slot.open_seats() > 0 {
            out.push(finding(FindingKind::UnderQuorum, None));
        }
        for id in slot.assigned.iter().filter(|id| slot.is_blocked(id)) {
            out.push(finding(FindingKind::BlockedAssigned, Some(id.clone())));
        }
    }

    for medic in scheduler.medics.iter() {
        let shifts: Vec<&ShiftSlot> = scheduler
            .slots
            .iter()
            .filter(in_scope)
            .filter(|s| s.is_assigned(&medic.id))
            .collect();

        for s in &shifts {
            let rest_broken = match s.round {
                Round::Day => util::slot_index(&scheduler.slots, s.date, Round::Night)
                    .map(|i| &scheduler.slots[i])
                    .filter(|n| n.is_assigned(&medic.id))
                    .map(|_| FindingKind::DayThenNight),
                Round::Night => s
                    .next_date()
                    .and_then(|d| util::slot_index(&scheduler.slots, d, Round::Day))
                    .map(|i| &scheduler.slots[i])
                    .filter(|n| n.is_assigned(&medic.id))
                    .map(|_| FindingKind::NightThenDay),
            };
            if let Some(kind) = rest_broken {
                out.push(Finding {
                    kind,
                    date: s.date,
                    round: s.round,
                    medic: Some(medic.id.clone()),
                });
            }
        }

        // quota : compte les créneaux du mois dans l'ordre chronologique
        let mut per_month = [0i64; 12];
        for s in &shifts {
            let seen = &mut per_month[(s.month() - 1) as usize];
            *seen += 1;
            if *seen > medic.stats(s.month()).allowance() {
                out.push(Finding {
                    kind: FindingKind::OverQuota,
                    date: s.date,
                    round: s.round,
                    medic: Some(medic.id.clone()),
                });
            }
        }
    }

    out
}
