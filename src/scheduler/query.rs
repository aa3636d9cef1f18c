use super::{Scheduler, SlotFilter};
use crate::model::{Round, ShiftSlot};
use chrono::{NaiveDate, Weekday};

impl Scheduler {
    pub fn slot(&self, date: NaiveDate, round: Round) -> Option<&ShiftSlot> {
        self.slots
            .iter()
            .find(|s| s.date == date && s.round == round)
    }

    pub fn slots_on(&self, date: NaiveDate) -> Vec<&ShiftSlot> {
        self.slots.iter().filter(|s| s.date == date).collect()
    }

    /// `round: None` = les deux tours ; `weekdays` vide = tous les jours.
    pub fn find_slots(&self, round: Option<Round>, weekdays: &[Weekday]) -> Vec<&ShiftSlot> {
        self.slots
            .iter()
            .filter(|s| round.map_or(true, |r| s.round == r))
            .filter(|s| weekdays.is_empty() || weekdays.contains(&s.weekday()))
            .collect()
    }

    pub fn slots_for_medic(&self, name: &str, filter: &SlotFilter) -> Vec<&ShiftSlot> {
        self.slots
            .iter()
            .filter(|s| filter.month.map_or(true, |m| s.month() == m))
            .filter(|s| filter.round.map_or(true, |r| s.round == r))
            .filter(|s| filter.weekdays.is_empty() || filter.weekdays.contains(&s.weekday()))
            .filter(|s| s.assigned.iter().any(|id| id.as_str() == name))
            .collect()
    }

    pub fn slots_in_month(&self, month: u32) -> Vec<&ShiftSlot> {
        self.slots.iter().filter(|s| s.month() == month).collect()
    }

    pub fn has_month(&self, month: u32) -> bool {
        self.slots.iter().any(|s| s.month() == month)
    }

    pub fn month_slot_count(&self, month: u32) -> usize {
        self.slots.iter().filter(|s| s.month() == month).count()
    }

    /// Places à pourvoir dans le mois (somme des quorums).
    pub fn month_quorum(&self, month: u32) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.month() == month)
            .map(|s| s.quorum)
            .sum()
    }

    pub fn total_quorum(&self) -> u32 {
        self.slots.iter().map(|s| s.quorum).sum()
    }

    /// Plantões que l'équipe peut absorber dans le mois (somme des quotas).
    pub fn month_capacity(&self, month: u32) -> u32 {
        self.medics.iter().map(|m| m.stats(month).quota).sum()
    }

    /// Plantões effectivement comptés pour toute l'équipe, tous mois confondus.
    pub fn total_medic_shifts(&self) -> u32 {
        self.medics.iter().map(|m| m.total_count()).sum()
    }

    pub fn under_quorum(&self, month: u32) -> Vec<&ShiftSlot> {
        self.slots
            .iter()
            .filter(|s| s.month() == month && s.open_seats() > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::calendar::Calendar;
    use crate::model::{Medic, Round};
    use crate::scheduler::{Scheduler, SlotFilter};
    use chrono::{NaiveDate, Weekday};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, day).unwrap()
    }

    #[test]
    fn aggregates_and_filters() {
        let mut s = Scheduler::new(Calendar::new(d(1), d(30)), 2);
        s.add_medics(vec![Medic::new("ana", 6, 1), Medic::new("bia", 5, 2)]);
        s.generate(11, &mut StdRng::seed_from_u64(9));

        assert_eq!(s.month_slot_count(11), 60);
        assert_eq!(s.month_quorum(11), 120);
        assert_eq!(s.total_quorum(), 120);
        assert_eq!(s.month_capacity(11), 11);
        assert!(s.has_month(11) && !s.has_month(12));
        assert_eq!(s.slots_on(d(3)).len(), 2);
        // novembre 2025 : cinq samedis
        assert_eq!(s.find_slots(Some(Round::Night), &[Weekday::Sat]).len(), 5);
        assert_eq!(s.find_slots(None, &[]).len(), 60);

        let ana_total = s.slots_for_medic("ana", &SlotFilter::default()).len() as u32;
        assert_eq!(ana_total, s.medic("ana").unwrap().stats(11).count());
        assert_eq!(s.total_medic_shifts(), ana_total + s.medic("bia").unwrap().total_count());

        let seats_taken: u32 = s.slots_in_month(11).iter().map(|x| x.assigned.len() as u32).sum();
        let open: u32 = s.under_quorum(11).iter().map(|x| x.open_seats()).sum();
        assert_eq!(seats_taken + open, 120);
        assert_eq!(seats_taken, s.total_medic_shifts());
    }
}
