use crate::model::{DayType, MedicId, Round, ShiftSlot, Snapshot};
use crate::scheduler::Scheduler;
use anyhow::bail;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use csv::WriterBuilder;
use std::fs;
use std::path::{Path, PathBuf};

/// Ordre des colonnes par jour dans l'export équipe.
const TEAM_DAYS: [DayType; 8] = [
    DayType::Weekday(Weekday::Mon),
    DayType::Weekday(Weekday::Tue),
    DayType::Weekday(Weekday::Wed),
    DayType::Weekday(Weekday::Thu),
    DayType::Weekday(Weekday::Fri),
    DayType::Weekday(Weekday::Sat),
    DayType::Weekday(Weekday::Sun),
    DayType::Holiday,
];

fn join_ids<'a, I: IntoIterator<Item = &'a MedicId>>(ids: I) -> String {
    ids.into_iter()
        .map(MedicId::as_str)
        .collect::<Vec<_>>()
        .join(";")
}

/// Export JSON de l'état complet (jolie mise en forme)
pub fn export_snapshot_json<P: AsRef<Path>>(path: P, snapshot: &Snapshot) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des créneaux: header `date,weekday,round,quorum,assigned,blocked,holiday`.
/// Les noms sont séparés par `;`.
pub fn export_slots_csv<'a, P, I>(path: P, slots: I) -> anyhow::Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a ShiftSlot>,
{
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "weekday", "round", "quorum", "assigned", "blocked", "holiday"])?;
    for s in slots {
        let date = s.date.format("%Y-%m-%d").to_string();
        let weekday = DayType::from(s.weekday()).letter();
        let round = s.round.to_string();
        let quorum = s.quorum.to_string();
        let assigned = join_ids(&s.assigned);
        let blocked = join_ids(&s.blocked);
        w.write_record([
            date.as_str(),
            weekday,
            round.as_str(),
            quorum.as_str(),
            assigned.as_str(),
            blocked.as_str(),
            if s.is_holiday { "true" } else { "false" },
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des compteurs d'un mois: header
/// `name,priority,quota,vacation_days,count,2,3,4,5,6,S,D,HD,weekend_percent`.
pub fn export_team_csv<P: AsRef<Path>>(
    path: P,
    scheduler: &Scheduler,
    month: u32,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    let mut header = vec!["name", "priority", "quota", "vacation_days", "count"];
    header.extend(TEAM_DAYS.iter().map(|d| d.letter()));
    header.push("weekend_percent");
    w.write_record(&header)?;

    for medic in scheduler.medics() {
        let stats = medic.stats(month);
        let mut row = vec![
            medic.name().to_string(),
            medic.priority.to_string(),
            stats.quota.to_string(),
            stats.vacation_days.to_string(),
            stats.count().to_string(),
        ];
        row.extend(TEAM_DAYS.iter().map(|d| stats.get(*d).to_string()));
        row.push(stats.weekend_percent().to_string());
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}

/// Largeur de la grille mensuelle : 7 jours, une colonne vide, 5 colonnes de panneaux.
const GRID_WIDTH: usize = 13;
const PANEL_COL: usize = 8;
/// Noms affichés par tour dans une case de la grille.
const NAMES_PER_ROUND: usize = 3;

const MONTHS_PT: [&str; 12] = [
    "JANEIRO", "FEVEREIRO", "MARCO", "ABRIL", "MAIO", "JUNHO", "JULHO", "AGOSTO", "SETEMBRO",
    "OUTUBRO", "NOVEMBRO", "DEZEMBRO",
];

/// `<base>.<MM><Mon>.csv`, à côté du fichier de configuration.
pub fn month_grid_file(base: &Path, first: NaiveDate) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{}.csv", first.format("%m%b")));
    PathBuf::from(name)
}

/// Export CSV de l'escala d'un mois sous forme de calendrier.
///
/// Chaque semaine (lundi..dimanche) occupe 7 lignes : les dates, puis trois
/// lignes de noms pour le jour et trois pour la nuit (`-` pour une place
/// vide). À droite, l'équipe (`#`, nom, plantões/quota, samedis, dimanches)
/// puis le résumé du mois.
pub fn export_month_grid_csv<P: AsRef<Path>>(
    path: P,
    scheduler: &Scheduler,
    month: u32,
) -> anyhow::Result<()> {
    let Some((first, next)) = scheduler.calendar().month_span(month) else {
        bail!("month {month} is outside the calendar range");
    };
    let mut rows = calendar_rows(scheduler, first, next);
    let panel_end = fill_panels(&mut rows, scheduler, month, first);
    while rows.len() < panel_end {
        rows.push(vec![String::new(); GRID_WIDTH]);
    }

    let mut w = WriterBuilder::new().has_headers(false).from_path(path)?;
    for row in &rows {
        w.write_record(row)?;
    }
    w.flush()?;
    Ok(())
}

fn calendar_rows(scheduler: &Scheduler, first: NaiveDate, next: NaiveDate) -> Vec<Vec<String>> {
    let lead = u64::from(first.weekday().num_days_from_monday());
    let monday = first.checked_sub_days(Days::new(lead)).unwrap_or(first);
    let weeks = ((next - monday).num_days() as usize).div_ceil(7);
    let in_month = |date: NaiveDate| first <= date && date < next;

    let mut rows = Vec::with_capacity(weeks * 7);
    for week in 0..weeks {
        let days: Vec<NaiveDate> = (0..7)
            .filter_map(|x| monday.checked_add_days(Days::new((week * 7 + x) as u64)))
            .collect();

        let mut header = vec![String::new(); GRID_WIDTH];
        for (cell, date) in header.iter_mut().zip(&days) {
            if !in_month(*date) {
                continue;
            }
            let label = date.format("%d/%m").to_string();
            *cell = if scheduler.calendar().is_holiday(*date) {
                format!("* {label} *")
            } else {
                label
            };
        }
        rows.push(header);

        for round in Round::ALL {
            for k in 0..NAMES_PER_ROUND {
                let mut row = vec![String::new(); GRID_WIDTH];
                for (cell, date) in row.iter_mut().zip(&days) {
                    if !in_month(*date) {
                        continue;
                    }
                    if let Some(slot) = scheduler.slot(*date, round) {
                        *cell = slot
                            .assigned
                            .get(k)
                            .map_or_else(|| "-".to_string(), |id| id.to_string());
                    }
                }
                rows.push(row);
            }
        }
    }
    rows
}

/// Écrit l'équipe puis le résumé dans les colonnes de droite ; renvoie la
/// première ligne libre sous les panneaux.
fn fill_panels(
    rows: &mut Vec<Vec<String>>,
    scheduler: &Scheduler,
    month: u32,
    first: NaiveDate,
) -> usize {
    let sat = DayType::Weekday(Weekday::Sat);
    let sun = DayType::Weekday(Weekday::Sun);

    let mut panel: Vec<[String; 5]> = vec![[
        "#".into(),
        "Medico".into(),
        "Plantoes".into(),
        "Sab".into(),
        "Dom".into(),
    ]];
    for (i, medic) in scheduler.medics().iter().enumerate() {
        let st = medic.stats(month);
        panel.push([
            (i + 1).to_string(),
            medic.name().to_string(),
            format!("{:02}/{:02}", st.count(), st.quota),
            st.get(sat).to_string(),
            st.get(sun).to_string(),
        ]);
    }
    panel.push(Default::default());

    let month_label = format!("{} {}", MONTHS_PT[(month - 1) as usize], first.year());
    let summary: [(&str, String); 5] = [
        ("Escala:", month_label),
        ("Plantoes Totais:", scheduler.month_slot_count(month).to_string()),
        ("Vagas Totais:", scheduler.month_quorum(month).to_string()),
        ("Medicos Totais:", scheduler.medics().len().to_string()),
        ("Quorum Medico:", format!("{} plantoes", scheduler.month_capacity(month))),
    ];
    panel.push(["Resumo".into(), String::new(), String::new(), String::new(), String::new()]);
    for (label, value) in summary {
        panel.push([label.into(), String::new(), value, String::new(), String::new()]);
    }

    for (y, cells) in panel.into_iter().enumerate() {
        if rows.len() <= y {
            rows.push(vec![String::new(); GRID_WIDTH]);
        }
        for (x, cell) in cells.into_iter().enumerate() {
            rows[y][PANEL_COL + x] = cell;
        }
    }
    rows.len()
}
