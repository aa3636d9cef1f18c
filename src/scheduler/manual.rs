use super::{fill, propagation, util, ScheduleError, Scheduler};
use crate::model::{MedicId, Round};
use chrono::NaiveDate;

/// Assignation hors algorithme (fériés notamment) : accepte les créneaux
/// fermés et ne vérifie pas le quota mensuel, mais respecte quorum et
/// blocages, et déclenche les mêmes règles de propagation.
pub(super) fn assign_manual(
    scheduler: &mut Scheduler,
    date: NaiveDate,
    round: Round,
    name: &str,
) -> Result<(), ScheduleError> {
    let id = MedicId::new(name);
    let Some(medic_idx) = util::medic_index(&scheduler.medics, &id) else {
        return Err(ScheduleError::UnknownMedic(name.to_string()));
    };
    let Some(slot_idx) = util::slot_index(&scheduler.slots, date, round) else {
        return Err(ScheduleError::UnknownSlot { date, round });
    };

    let slot = &scheduler.slots[slot_idx];
    if slot.is_assigned(&id) {
        return Err(ScheduleError::AlreadyAssigned {
            medic: name.to_string(),
            date,
            round,
        });
    }
    if slot.is_full() {
        return Err(ScheduleError::SlotFull { date, round });
    }
    if slot.is_blocked(&id) {
        return Err(ScheduleError::Blocked {
            medic: name.to_string(),
            date,
            round,
        });
    }

    fill::seat(scheduler, slot_idx, medic_idx);
    propagation::propagate(scheduler, slot_idx);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::calendar::Calendar;
    use crate::model::{Medic, MedicId, Round};
    use crate::scheduler::{ScheduleError, Scheduler};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, day).unwrap()
    }

    fn december_with_christmas() -> Scheduler {
        let mut cal = Calendar::new(d(1), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        cal.add_holiday("Natal", d(25));
        let mut s = Scheduler::new(cal, 1);
        s.add_medics(vec![Medic::new("ana", 10, 1), Medic::new("bia", 10, 2)]);
        s
    }

    #[test]
    fn holiday_slots_are_closed_and_only_filled_manually() {
        let mut s = december_with_christmas();
        assert!(s.generate(12, &mut StdRng::seed_from_u64(5)));
        let xmas = s.slot(d(25), Round::Day).unwrap();
        assert!(xmas.is_holiday && !xmas.is_open);
        assert!(xmas.assigned.is_empty());

        s.assign_manual(d(25), Round::Day, "bia").unwrap();
        let bia = s.medic("bia").unwrap();
        assert_eq!(bia.stats(12).holiday_count(), 1);
        assert!(s
            .slot(d(25), Round::Night)
            .unwrap()
            .is_blocked(&MedicId::new("bia")));
    }

    #[test]
    fn manual_errors() {
        let mut s = december_with_christmas();
        s.generate(12, &mut StdRng::seed_from_u64(5));
        s.assign_manual(d(25), Round::Night, "ana").unwrap();

        assert!(matches!(
            s.assign_manual(d(25), Round::Night, "ana"),
            Err(ScheduleError::AlreadyAssigned { .. })
        ));
        assert!(matches!(
            s.assign_manual(d(25), Round::Night, "bia"),
            Err(ScheduleError::SlotFull { .. })
        ));
        // nuit du 25 => jour du 26 bloqué
        let day_26 = s.slot(d(26), Round::Day).unwrap();
        if !day_26.is_assigned(&MedicId::new("ana")) && !day_26.is_full() {
            assert!(matches!(
                s.assign_manual(d(26), Round::Day, "ana"),
                Err(ScheduleError::Blocked { .. })
            ));
        }
        assert!(matches!(
            s.assign_manual(d(25), Round::Day, "zeca"),
            Err(ScheduleError::UnknownMedic(_))
        ));
        let jan = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert!(matches!(
            s.assign_manual(jan, Round::Day, "ana"),
            Err(ScheduleError::UnknownSlot { .. })
        ));
    }
}
