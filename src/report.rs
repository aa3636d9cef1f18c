use crate::model::{DayType, Medic, MedicId, ShiftSlot};
use crate::scheduler::Scheduler;
use anyhow::{bail, Result};
use chrono::Weekday;
use std::fmt::Write;

/// Abréviation portugaise du jour, telle qu'affichée dans l'escala.
fn weekday_label(w: Weekday) -> &'static str {
    match w {
        Weekday::Mon => "Seg",
        Weekday::Tue => "Ter",
        Weekday::Wed => "Qua",
        Weekday::Thu => "Qui",
        Weekday::Fri => "Sex",
        Weekday::Sat => "Sab",
        Weekday::Sun => "Dom",
    }
}

fn names<'a>(ids: impl IntoIterator<Item = &'a MedicId>) -> String {
    ids.into_iter()
        .map(MedicId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Chiffres d'un mois généré.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSummary {
    pub month: u32,
    pub slots: usize,
    pub seats: u32,
    pub filled: u32,
    pub capacity: u32,
}

impl MonthSummary {
    pub fn compute(scheduler: &Scheduler, month: u32) -> Self {
        let slots = scheduler.slots_in_month(month);
        Self {
            month,
            slots: slots.len(),
            seats: scheduler.month_quorum(month),
            filled: slots.iter().map(|s| s.assigned.len() as u32).sum(),
            capacity: scheduler.month_capacity(month),
        }
    }
}

/// Permet de customiser le rendu (texte, tableur, etc.).
pub trait ReportRenderer {
    fn render_slot(&self, slot: &ShiftSlot) -> String;
    fn render_summary(&self, summary: &MonthSummary) -> String;
    fn render_team(&self, medics: &[Medic], month: u32) -> String;
    /// Bilan de toute la période générée, tous mois confondus.
    fn render_overall(&self, scheduler: &Scheduler) -> String;
}

/// Rendu texte brut pour le terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReport;

impl ReportRenderer for TextReport {
    fn render_slot(&self, slot: &ShiftSlot) -> String {
        let mut line = format!(
            "{} {} {} - {}",
            slot.date.format("%d/%m/%Y"),
            weekday_label(slot.weekday()),
            slot.round,
            names(&slot.assigned)
        );
        if slot.is_holiday {
            line.push_str(" [feriado]");
        }
        if !slot.blocked.is_empty() {
            let _ = write!(line, " | blocked: {}", names(&slot.blocked));
        }
        line
    }

    fn render_summary(&self, s: &MonthSummary) -> String {
        format!(
            "month {:02}: {} slots, {}/{} seats filled, team capacity {}",
            s.month, s.slots, s.filled, s.seats, s.capacity
        )
    }

    fn render_team(&self, medics: &[Medic], month: u32) -> String {
        let days = [
            DayType::Weekday(Weekday::Mon),
            DayType::Weekday(Weekday::Tue),
            DayType::Weekday(Weekday::Wed),
            DayType::Weekday(Weekday::Thu),
            DayType::Weekday(Weekday::Fri),
            DayType::Weekday(Weekday::Sat),
            DayType::Weekday(Weekday::Sun),
            DayType::Holiday,
        ];
        let width = medics.iter().map(|m| m.name().chars().count()).max().unwrap_or(4).max(4);

        let mut out = format!("{:<width$} prio quota vac total", "name");
        for d in days {
            let _ = write!(out, " {:>2}", d.letter());
        }
        out.push_str("  wknd\n");

        for m in medics {
            let st = m.stats(month);
            let _ = write!(
                out,
                "{:<width$} {:>4} {:>5} {:>3} {:>5}",
                m.name(),
                m.priority,
                st.quota,
                st.vacation_days,
                st.count()
            );
            for d in days {
                let _ = write!(out, " {:>2}", st.get(d));
            }
            let _ = writeln!(out, " {:>4}%", st.weekend_percent());
        }
        out
    }

    fn render_overall(&self, scheduler: &Scheduler) -> String {
        let sat = DayType::Weekday(Weekday::Sat);
        let sun = DayType::Weekday(Weekday::Sun);
        let months: Vec<u32> = (1..=12).filter(|m| scheduler.has_month(*m)).collect();
        let mut out = format!(
            "overall: {} slots, {} seats, {} medics, {} medic shifts\n",
            scheduler.slots().len(),
            scheduler.total_quorum(),
            scheduler.medics().len(),
            scheduler.total_medic_shifts()
        );
        for (i, m) in scheduler.medics().iter().enumerate() {
            let _ = writeln!(
                out,
                "#{:02} {} : {:03}/{:02} plantoes | {} Sab | {} Dom | Fds {} %",
                i + 1,
                m.name(),
                m.total_count(),
                m.total_quota(&months),
                m.weekday_total(sat),
                m.weekday_total(sun),
                (m.weekend_share() * 100.0).round() as u32
            );
        }
        let filled: usize = scheduler.slots().iter().map(|s| s.assigned.len()).sum();
        let _ = writeln!(out, "----- total {filled} plantoes");
        out
    }
}

/// Assemble le rapport complet d'un mois : liste des créneaux, résumé, équipe.
pub fn prepare_report(
    scheduler: &Scheduler,
    month: u32,
    renderer: &dyn ReportRenderer,
) -> Result<String> {
    let slots = scheduler.slots_in_month(month);
    if slots.is_empty() {
        bail!("no slots generated for month {month}");
    }

    let mut out = String::new();
    for slot in slots {
        out.push_str(&renderer.render_slot(slot));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&renderer.render_summary(&MonthSummary::compute(scheduler, month)));
    out.push_str("\n\n");
    out.push_str(&renderer.render_team(scheduler.medics(), month));
    Ok(out)
}
