#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use medshift::{
    apply_manual, io, load_config,
    report::{prepare_report, MonthSummary, ReportRenderer, TextReport},
    scheduler::{FindingKind, Scheduler},
    storage::{JsonStorage, Storage},
    ScheduleConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération d'escalas de plantão (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de configuration de l'escala
    #[arg(long, global = true, default_value = "escala.json")]
    config: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Générer un mois, ou tout le calendrier
    Generate {
        /// Mois (1-12) ; tous les mois du calendrier si absent
        #[arg(long)]
        month: Option<u32>,
        /// Graine pour rejouer une génération
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
        /// Compteurs de l'équipe pour le mois
        #[arg(long, requires = "month")]
        team_csv: Option<String>,
        /// Sauvegarde de l'état pour `report`/`check`
        #[arg(long)]
        snapshot: Option<String>,
        /// Une grille CSV par mois, `<config>.<MM><Mon>.csv`
        #[arg(long)]
        grid: bool,
    },

    /// Afficher l'escala et les compteurs
    Report {
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        /// Relire un état sauvegardé au lieu de générer
        #[arg(long)]
        snapshot: Option<String>,
    },

    /// Vérifier quorum, blocages, repos et quotas
    Check {
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        snapshot: Option<String>,
        /// Export CSV des anomalies (optionnel)
        #[arg(long)]
        report: Option<String>,
    },
}

/// Génère `month` (ou tout le calendrier) puis rejoue les assignations manuelles.
fn run(config: &ScheduleConfig, month: Option<u32>, seed: Option<u64>) -> Result<(Scheduler, Vec<u32>)> {
    let mut rng = StdRng::seed_from_u64(seed.unwrap_or_else(rand::random));
    let mut scheduler = config.to_scheduler();
    let months = match month {
        Some(m) => {
            if !scheduler.generate(m, &mut rng) {
                bail!("month {m} is outside the calendar range");
            }
            vec![m]
        }
        None => {
            let mut months = scheduler.generate_calendar(&mut rng);
            months.sort_unstable();
            months
        }
    };
    for m in &months {
        apply_manual(config, &mut scheduler, *m);
    }
    Ok((scheduler, months))
}

/// État à examiner : relu depuis `snapshot`, ou généré.
fn obtain(
    config: &ScheduleConfig,
    month: Option<u32>,
    seed: Option<u64>,
    snapshot: Option<String>,
) -> Result<(Scheduler, Vec<u32>)> {
    let Some(path) = snapshot else {
        return run(config, month, seed);
    };
    let saved = JsonStorage::open(path).load()?;
    let scheduler = Scheduler::from_snapshot(config.calendar(), config.quorum, saved);
    let months: Vec<u32> = match month {
        Some(m) => vec![m],
        None => (1..=12).filter(|m| scheduler.has_month(*m)).collect(),
    };
    Ok((scheduler, months))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    }

    let config = load_config(&cli.config)?;

    let code = match cli.cmd {
        Commands::Generate {
            month,
            seed,
            out_json,
            out_csv,
            team_csv,
            snapshot,
            grid,
        } => {
            let (scheduler, months) = run(&config, month, seed)?;
            if let Some(path) = out_json {
                io::export_snapshot_json(path, &scheduler.snapshot())?;
            }
            if let Some(path) = out_csv {
                io::export_slots_csv(path, scheduler.slots())?;
            }
            if let (Some(path), Some(m)) = (team_csv, month) {
                io::export_team_csv(path, &scheduler, m)?;
            }
            if let Some(path) = snapshot {
                JsonStorage::open(path).save(&scheduler.snapshot())?;
            }
            for m in months {
                if grid {
                    if let Some((first, _)) = scheduler.calendar().month_span(m) {
                        let path = io::month_grid_file(Path::new(&cli.config), first);
                        io::export_month_grid_csv(&path, &scheduler, m)?;
                    }
                }
                println!("{}", TextReport.render_summary(&MonthSummary::compute(&scheduler, m)));
            }
            0
        }
        Commands::Report {
            month,
            seed,
            snapshot,
        } => {
            let (scheduler, months) = obtain(&config, month, seed, snapshot)?;
            for m in months {
                println!("{}", prepare_report(&scheduler, m, &TextReport)?);
            }
            print!("{}", TextReport.render_overall(&scheduler));
            0
        }
        Commands::Check {
            month,
            seed,
            snapshot,
            report,
        } => {
            let (scheduler, _) = obtain(&config, month, seed, snapshot)?;
            let findings = scheduler.audit(month);
            if findings.is_empty() {
                println!("OK: every slot filled, no conflicts");
                0
            } else {
                eprintln!("Found {} finding(s)", findings.len());
                if let Some(path) = report {
                    // CSV simple
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["date", "round", "medic", "kind"])?;
                    for f in &findings {
                        let date = f.date.format("%Y-%m-%d").to_string();
                        let round = f.round.to_string();
                        w.write_record([
                            date.as_str(),
                            round.as_str(),
                            f.medic.as_ref().map(|m| m.as_str()).unwrap_or(""),
                            match f.kind {
                                FindingKind::UnderQuorum => "under_quorum",
                                FindingKind::OverQuorum => "over_quorum",
                                FindingKind::BlockedAssigned => "blocked_assigned",
                                FindingKind::DayThenNight => "day_then_night",
                                FindingKind::NightThenDay => "night_then_day",
                                FindingKind::OverQuota => "over_quota",
                            },
                        ])?;
                    }
                    w.flush()?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
    };

    std::process::exit(code);
}
