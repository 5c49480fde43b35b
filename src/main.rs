use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use uuid::Uuid;

mod activities;
mod config;
mod db;
mod error;
mod filter;
mod logging;
mod models;
mod period;
mod render;
mod report;
mod schedule;
mod statistics;
mod stored;

use activities::AttendanceDraft;
use config::{Config, DEFAULT_CONFIG_FILE};
use error::ReportError;
use filter::ActivityFilter;
use models::{parse_filter, ActivityKind, ActivityStatus, AgeBracket, Origin};
use period::{AutoPeriod, DateRange, DateRangePreset};
use render::{export_file_name, ExportFormat};
use report::{ReportKind, ReportRequest};
use statistics::PeriodStatistics;

#[derive(Parser)]
#[command(name = "museum-reports")]
#[command(about = "Activity reports for museum programmes", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a demo museum with January activities
    Seed,
    /// Import activities from a CSV file
    ImportActivities {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Import attendance records from a CSV file
    ImportAttendance {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Record attendance for one activity
    RecordAttendance {
        #[arg(long)]
        activity: Uuid,
        #[arg(long)]
        attendees: i32,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "mixed")]
        age_bracket: AgeBracket,
        #[arg(long, default_value = "local")]
        origin: Origin,
        #[arg(long)]
        satisfaction: Option<f64>,
        #[arg(long)]
        comments: Option<String>,
    },
    /// Change an activity's status, e.g. to mark it completed
    SetActivityStatus {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        status: ActivityStatus,
    },
    /// Delete an activity and its calendar event
    DeleteActivity {
        #[arg(long)]
        id: Uuid,
    },
    /// Generate and store a report, printing its summary
    Report {
        #[arg(long)]
        museum: String,
        /// by-worker or by-date
        #[arg(long, default_value = "by-date")]
        kind: ReportKind,
        /// today, this-week, this-month, previous-month, this-quarter or custom
        /// (custom needs --from and --to)
        #[arg(long, default_value = "this-month")]
        range: DateRangePreset,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Activity type code, or "all"
        #[arg(long, default_value = "all")]
        activity_kind: String,
        /// Activity status code, or "all"
        #[arg(long, default_value = "all")]
        status: String,
        /// Restrict a by-worker report to these workers
        #[arg(long = "worker")]
        workers: Vec<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Export a generated report to the output directory
    Export {
        #[arg(long)]
        id: Uuid,
        /// pdf or spreadsheet
        #[arg(long, default_value = "pdf")]
        format: ExportFormat,
    },
    /// Generate the prior-period reports for every active museum
    AutoReports {
        /// monthly, quarterly or yearly; all three when omitted
        #[arg(long)]
        period: Option<AutoPeriod>,
        /// Reference date, defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Print period statistics as JSON
    Stats {
        #[arg(long)]
        museum: String,
        #[arg(long, default_value = "this-month")]
        range: DateRangePreset,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Delete draft reports older than the retention window
    CleanupDrafts {
        /// Overrides draft_retention_days
        #[arg(long)]
        days: Option<i64>,
    },
    /// Make a gallery image the museum's only primary image
    SetPrimaryImage {
        #[arg(long)]
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    logging::init(config.log_level.as_deref(), cli.verbose);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.database_url()?)
        .await
        .context("failed to connect to Postgres")?;

    let today = Utc::now().date_naive();

    let outcome: anyhow::Result<()> = async {
        match cli.command {
            Commands::InitDb => {
                db::init_db(&pool).await?;
                println!("Schema ready.");
            }
            Commands::Seed => {
                db::seed(&pool).await?;
                println!("Seed data inserted.");
            }
            Commands::ImportActivities { csv } => {
                let inserted = db::import_activities(&pool, &csv).await?;
                println!("Inserted {inserted} activities from {}.", csv.display());
            }
            Commands::ImportAttendance { csv } => {
                let inserted = db::import_attendance(&pool, &csv).await?;
                println!("Inserted {inserted} attendance records from {}.", csv.display());
            }
            Commands::RecordAttendance {
                activity,
                attendees,
                date,
                age_bracket,
                origin,
                satisfaction,
                comments,
            } => {
                let record = db::PgStore::service(&pool)
                    .record_attendance(
                        activity,
                        AttendanceDraft {
                            date: date.unwrap_or(today),
                            attendees,
                            age_bracket,
                            origin,
                            satisfaction,
                            comments,
                        },
                    )
                    .await?;
                println!("Recorded {} attendees ({}).", record.attendees, record.id);
            }
            Commands::SetActivityStatus { id, status } => {
                let activity = db::PgStore::service(&pool).set_status(id, status).await?;
                println!("{} is now {}.", activity.name, status);
            }
            Commands::DeleteActivity { id } => {
                if db::PgStore::service(&pool).delete(id).await? {
                    println!("Activity {id} deleted.");
                } else {
                    println!("No activity {id}.");
                }
            }
            Commands::Report {
                museum,
                kind,
                range,
                from,
                to,
                activity_kind,
                status,
                workers,
                name,
            } => {
                let museum = db::find_museum(&pool, &museum).await?;
                let period = range.resolve(today, from, to)?;
                let request = ReportRequest {
                    name: name.unwrap_or_else(|| {
                        ReportRequest::default_name(kind, &museum.name, &period)
                    }),
                    museum_id: museum.id,
                    museum_name: museum.name.clone(),
                    period,
                    kind,
                    workers: db::find_worker_ids(&pool, &workers).await?,
                    kind_filter: parse_filter::<ActivityKind>(&activity_kind)?,
                    status_filter: parse_filter::<ActivityStatus>(&status)?,
                };

                let id = db::insert_report(&pool, &request).await?;
                let snapshot =
                    db::fetch_activities(&pool, &ActivityFilter::from_request(&request)).await?;
                let result = report::generate(&request, &snapshot)?;
                db::save_result(&pool, id, &result).await?;

                info!(%id, report = %request.name, "report generated");
                println!("Report {id}");
                print!("{}", report::summary_markdown(&result));
            }
            Commands::Export { id, format } => {
                let stored = db::load_report(&pool, id).await?;
                let result = stored.generated_result()?;
                let bytes = format.render(result)?;

                std::fs::create_dir_all(&config.output_dir).with_context(|| {
                    format!("failed to create {}", config.output_dir.display())
                })?;
                let out = config
                    .output_dir
                    .join(export_file_name(&stored.request.name, format, Utc::now()));
                std::fs::write(&out, bytes)?;
                db::mark_exported(&pool, id).await?;

                info!(%id, path = %out.display(), "report exported");
                println!("Report written to {}.", out.display());
            }
            Commands::AutoReports { period, today: on } => {
                let on = on.unwrap_or(today);
                let periods = match period {
                    Some(period) => vec![period],
                    None => AutoPeriod::ALL.to_vec(),
                };
                let museums = db::fetch_museums(&pool).await?;

                for period in periods {
                    let range = period.prior_range(on);
                    let existing = db::existing_period_keys(&pool, period).await?;

                    let mut snapshot = Vec::new();
                    for museum in museums.iter().filter(|museum| museum.active) {
                        let filter = ActivityFilter::new(
                            museum.id,
                            range,
                            None,
                            Some(ActivityStatus::Completed),
                        );
                        snapshot.extend(db::fetch_activities(&pool, &filter).await?);
                    }

                    let scheduled =
                        schedule::generate_default_reports(period, on, &museums, &snapshot, &existing)?;
                    for report in &scheduled {
                        if db::insert_scheduled(&pool, report).await? {
                            let stats = &report.statistics;
                            println!("Generated {}.", report.request.name);
                            println!(
                                "  {} activities, {} attendees (avg {:.2}), revenue {:.2}",
                                stats.total_activities,
                                stats.total_attendees,
                                stats.average_attendance,
                                stats.total_revenue
                            );
                        } else {
                            warn!(report = %report.request.name, "already generated concurrently");
                        }
                    }
                }
            }
            Commands::Stats {
                museum,
                range,
                from,
                to,
            } => {
                let museum = db::find_museum(&pool, &museum).await?;
                let period: DateRange = range.resolve(today, from, to)?;
                let filter = ActivityFilter::new(museum.id, period, None, None);
                let activities = db::fetch_activities(&pool, &filter).await?;
                let stats = PeriodStatistics::compute(&activities);
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            Commands::CleanupDrafts { days } => {
                let days = days.unwrap_or(config.draft_retention_days);
                let cutoff = stored::draft_cutoff(Utc::now(), days)?;
                let removed = db::cleanup_drafts(&pool, cutoff).await?;
                println!("Removed {removed} draft reports older than {days} days.");
            }
            Commands::SetPrimaryImage { id } => {
                let museum_id = db::set_primary_image(&pool, id).await?;
                println!("Image {id} is now the primary image of museum {museum_id}.");
            }
        }
        Ok(())
    }
    .await;

    match outcome {
        Err(err)
            if err
                .downcast_ref::<ReportError>()
                .is_some_and(ReportError::is_input_error) =>
        {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
        other => other,
    }
}
