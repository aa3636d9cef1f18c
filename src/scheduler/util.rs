use crate::model::{Medic, MedicId, Round, ShiftSlot};
use chrono::NaiveDate;

pub(super) fn slot_index(slots: &[ShiftSlot], date: NaiveDate, round: Round) -> Option<usize> {
    slots.iter().position(|s| s.date == date && s.round == round)
}

pub(super) fn medic_index(medics: &[Medic], id: &MedicId) -> Option<usize> {
    medics.iter().position(|m| &m.id == id)
}

pub(super) fn in_span(slot: &ShiftSlot, first: NaiveDate, next: NaiveDate) -> bool {
    first <= slot.date && slot.date < next
}

pub(super) fn sort_slots(slots: &mut [ShiftSlot]) {
    slots.sort_by_key(ShiftSlot::key);
}
