//! Gradebook CLI - Command-line interface for the academic analytics reports

use anyhow::Context;
use clap::{Parser, Subcommand};
use gradebook::config::{self, GradebookConfig};
use gradebook::query::AnalyticsEngine;
use gradebook::ui::{self, Icons};
use gradebook::storage::DbStats;
use gradebook::{Average, Dataset, RecordId, RelationalStore, SqliteStore};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tabled::Tabled;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "gradebook")]
#[command(version)]
#[command(about = "Academic analytics - fixed reports over a gradebook database")]
#[command(long_about = r#"
Gradebook answers fixed analytical questions over an academic-records
database: student and group averages, teacher course listings and
latest-session grade lookups.

Example usage:
  gradebook init --database records.db
  gradebook load demos/sample.json
  gradebook top-students
  gradebook latest-session --discipline 1 --group 2
  gradebook report --format json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides gradebook.toml)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write gradebook.toml and create an empty database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Import a JSON dataset into the database
    Load {
        /// Path to the dataset file
        path: PathBuf,
    },

    /// Show row counts per table
    Stats,

    /// Five students with the highest average grade
    TopStudents,

    /// Student with the highest average in a discipline
    BestStudent {
        #[arg(long)]
        discipline: RecordId,
    },

    /// Average grade per group in a discipline
    GroupAverages {
        #[arg(long)]
        discipline: RecordId,
    },

    /// Average over every grade
    OverallAverage,

    /// Disciplines taught by a teacher
    TeacherCourses {
        #[arg(long)]
        teacher: RecordId,
    },

    /// Students of a group
    GroupStudents {
        #[arg(long)]
        group: RecordId,
    },

    /// Grades of a group in a discipline
    GroupGrades {
        #[arg(long)]
        group: RecordId,
        #[arg(long)]
        discipline: RecordId,
    },

    /// Average grade a teacher gives
    TeacherAverage {
        #[arg(long)]
        teacher: RecordId,
    },

    /// Disciplines a student is graded in
    StudentCourses {
        #[arg(long)]
        student: RecordId,
    },

    /// Disciplines a teacher grades a student in
    StudentTeacherCourses {
        #[arg(long)]
        student: RecordId,
        #[arg(long)]
        teacher: RecordId,
    },

    /// Average grade a teacher gives a student
    StudentTeacherAverage {
        #[arg(long)]
        student: RecordId,
        #[arg(long)]
        teacher: RecordId,
    },

    /// Grades of a group in a discipline on the latest session
    LatestSession {
        #[arg(long)]
        discipline: RecordId,
        #[arg(long)]
        group: RecordId,
    },

    /// Run all twelve reports with the demonstration identifiers
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.to_lowercase().as_str() {
            "text" | "human" => Ok(OutputMode::Text),
            "json" => Ok(OutputMode::Json),
            other => anyhow::bail!("unknown output format {:?} (expected text or json)", other),
        }
    }
}

/// Collects report sections: tables in text mode, one JSON document otherwise.
///
/// Everything a command emits on stdout goes through the writer, so a JSON run
/// produces nothing but the document.
struct Output<W: Write> {
    mode: OutputMode,
    json: serde_json::Map<String, serde_json::Value>,
    writer: W,
}

impl<W: Write> Output<W> {
    fn new(mode: OutputMode, writer: W) -> Self {
        Self { mode, json: serde_json::Map::new(), writer }
    }

    fn line(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", text)?;
        Ok(())
    }

    fn section(&mut self, icon: &str, title: &str) -> anyhow::Result<()> {
        match ui::section(icon, title) {
            Some(heading) => self.line(&heading),
            None => Ok(()),
        }
    }

    /// Text only
    fn banner(&mut self, title: &str, subtitle: &str) -> anyhow::Result<()> {
        match (self.mode, ui::banner(title, subtitle)) {
            (OutputMode::Text, Some(banner)) => self.line(&banner),
            _ => Ok(()),
        }
    }

    /// Text only
    fn note(&mut self, text: &str) -> anyhow::Result<()> {
        match self.mode {
            OutputMode::Text => self.line(text),
            OutputMode::Json => Ok(()),
        }
    }

    /// JSON only
    fn value<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> anyhow::Result<()> {
        if self.mode == OutputMode::Json {
            self.json.insert(key.to_string(), serde_json::to_value(value)?);
        }
        Ok(())
    }

    fn rows<T: Tabled + Serialize>(&mut self, key: &str, icon: &str, title: &str, rows: &[T]) -> anyhow::Result<()> {
        match self.mode {
            OutputMode::Json => self.value(key, rows),
            OutputMode::Text => {
                self.section(icon, title)?;
                if rows.is_empty() {
                    self.line(&ui::empty("No matching rows."))
                } else {
                    self.line(&ui::report_table(rows))
                }
            }
        }
    }

    fn names(&mut self, key: &str, icon: &str, title: &str, names: &[String]) -> anyhow::Result<()> {
        match self.mode {
            OutputMode::Json => self.value(key, names),
            OutputMode::Text => {
                self.section(icon, title)?;
                if names.is_empty() {
                    self.line(&ui::empty("No matching rows."))
                } else {
                    self.line(&ui::list_table(names))
                }
            }
        }
    }

    fn average(&mut self, key: &str, icon: &str, title: &str, average: Option<Average>) -> anyhow::Result<()> {
        match self.mode {
            OutputMode::Json => self.value(key, &average),
            OutputMode::Text => {
                self.section(icon, title)?;
                match average {
                    Some(avg) => self.line(&format!(
                        "  {} {}",
                        Icons::STAR,
                        avg.to_string().style(ui::theme().accent.clone())
                    )),
                    None => self.line(&ui::empty("No grades match.")),
                }
            }
        }
    }

    /// A single section prints its bare value; several print as one object
    /// in insertion order
    fn finish(mut self) -> anyhow::Result<W> {
        if self.mode == OutputMode::Json && !self.json.is_empty() {
            let json = std::mem::take(&mut self.json);
            let document = if json.len() == 1 {
                json.into_iter().next().map(|(_, v)| v).unwrap_or_default()
            } else {
                serde_json::Value::Object(json)
            };
            writeln!(self.writer, "{}", serde_json::to_string_pretty(&document)?)?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

fn id(value: i64) -> anyhow::Result<RecordId> {
    Ok(RecordId::new(value)?)
}

fn open_reporting_store(database: &Path) -> anyhow::Result<SqliteStore> {
    SqliteStore::open_read_only(database)
        .with_context(|| format!("cannot open database {}", database.display()))
}

fn load_summary<W: Write>(out: &mut Output<W>, imported: usize, stats: &DbStats) -> anyhow::Result<()> {
    out.value("imported", &imported)?;
    out.value("stats", stats)?;

    out.note(&ui::success(&format!("Imported {} records", imported)))?;
    let counts: Vec<(&str, String)> = stats
        .rows()
        .iter()
        .map(|(label, count)| (*label, count.to_string()))
        .collect();
    let pairs: Vec<(&str, &str)> = counts.iter().map(|(l, v)| (*l, v.as_str())).collect();
    out.note(&ui::stats_table(&pairs))
}

/// All twelve reports with the demonstration identifiers
fn run_report<S, W>(engine: &AnalyticsEngine<'_, S>, database: &Path, out: &mut Output<W>) -> anyhow::Result<()>
where
    S: RelationalStore + ?Sized,
    W: Write,
{
    out.banner("Gradebook report", &database.display().to_string())?;

    out.rows("top_students", Icons::CAP, "1. Top students", &engine.top_students()?)?;
    out.rows(
        "best_student",
        Icons::STAR,
        "2. Best student in discipline 1",
        engine.best_student_in_discipline(id(1)?)?.as_slice(),
    )?;
    out.rows(
        "group_averages",
        Icons::GROUP,
        "3. Group averages in discipline 1",
        &engine.group_averages_in_discipline(id(1)?)?,
    )?;
    out.average("overall_average", Icons::STATS, "4. Overall average", engine.overall_average()?)?;
    out.names(
        "teacher_courses",
        Icons::TEACHER,
        "5. Disciplines of teacher 4",
        &engine.teacher_disciplines(id(4)?)?,
    )?;
    out.names(
        "group_students",
        Icons::GROUP,
        "6. Students of group 2",
        &engine.group_students(id(2)?)?,
    )?;
    out.rows(
        "group_grades",
        Icons::BOOK,
        "7. Grades of group 3 in discipline 8",
        &engine.group_grades_in_discipline(id(3)?, id(8)?)?,
    )?;
    out.average(
        "teacher_average",
        Icons::TEACHER,
        "8. Average given by teacher 3",
        engine.teacher_average(id(3)?)?,
    )?;
    out.names(
        "student_courses",
        Icons::BOOK,
        "9. Disciplines of student 1",
        &engine.student_disciplines(id(1)?)?,
    )?;
    out.names(
        "student_teacher_courses",
        Icons::BOOK,
        "10. Disciplines of student 2 taught by teacher 1",
        &engine.student_disciplines_by_teacher(id(2)?, id(1)?)?,
    )?;
    out.average(
        "student_teacher_average",
        Icons::TEACHER,
        "11. Average teacher 1 gives student 5",
        engine.student_average_by_teacher(id(5)?, id(1)?)?,
    )?;
    out.rows(
        "latest_session",
        Icons::CALENDAR,
        "12. Latest session of discipline 1 in group 2",
        &engine.latest_session_grades(id(1)?, id(2)?)?,
    )?;

    out.note("")?;
    out.note(&ui::muted("Averages are rounded half away from zero to 2 decimals."))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let loaded = config::load_config(Some(&config_path))?.unwrap_or_default();

    let database = cli
        .database
        .clone()
        .or_else(|| loaded.database.as_ref().map(PathBuf::from))
        .unwrap_or_else(config::default_database_path);
    let mode = OutputMode::parse(
        cli.format
            .as_deref()
            .or(loaded.format.as_deref())
            .unwrap_or("text"),
    )?;
    tracing::debug!("Using database {:?} ({:?} output)", database, mode);

    let mut out = Output::new(mode, std::io::stdout());

    match cli.command {
        Commands::Init { force } => {
            let config = GradebookConfig {
                database: Some(database.to_string_lossy().to_string()),
                format: cli.format.clone(),
            };
            config::write_config(&config_path, &config, force)?;
            config::ensure_db_dir(&database)?;
            SqliteStore::open(&database)?;

            tracing::info!("Initialized {:?} with database {:?}", config_path, database);
            println!("{}", ui::success(&format!("Wrote {}", config_path.display())));
            ui::info("Database", &database.display().to_string());
        }

        Commands::Load { path } => {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read dataset {}", path.display()))?;
            let dataset = Dataset::from_json(&contents)?;
            if dataset.total_records() == 0 {
                ui::warn(&format!("{} contains no records", path.display()));
            }

            config::ensure_db_dir(&database)?;
            let store = SqliteStore::open(&database)?;
            tracing::info!("Loading {} records from {}", dataset.total_records(), path.display());
            store.import(&dataset)?;

            let stats = store.stats()?;
            load_summary(&mut out, dataset.total_records(), &stats)?;
        }

        Commands::Stats => {
            let store = open_reporting_store(&database)?;
            let stats = store.stats()?;

            if mode == OutputMode::Json {
                out.value("stats", &stats)?;
            } else {
                ui::header(&format!("{} Gradebook Statistics ({})", Icons::STATS, database.display()));
                for (label, count) in stats.rows() {
                    ui::summary_row(&format!("{:<12}", label), &count.to_string());
                }
            }
        }

        Commands::TopStudents => {
            let store = open_reporting_store(&database)?;
            let engine = AnalyticsEngine::new(&store);
            out.rows("top_students", Icons::CAP, "Top students", &engine.top_students()?)?;
        }

        Commands::BestStudent { discipline } => {
            let store = open_reporting_store(&database)?;
            let engine = AnalyticsEngine::new(&store);
            let best = engine.best_student_in_discipline(discipline)?;
            out.rows(
                "best_student",
                Icons::STAR,
                &format!("Best student in discipline {}", discipline),
                best.as_slice(),
            )?;
        }

        Commands::GroupAverages { discipline } => {
            let store = open_reporting_store(&database)?;
            let engine = AnalyticsEngine::new(&store);
            out.rows(
                "group_averages",
                Icons::GROUP,
                &format!("Group averages in discipline {}", discipline),
                &engine.group_averages_in_discipline(discipline)?,
            )?;
        }

        Commands::OverallAverage => {
            let store = open_reporting_store(&database)?;
            let engine = AnalyticsEngine::new(&store);
            out.average("overall_average", Icons::STATS, "Overall average", engine.overall_average()?)?;
        }

        Commands::TeacherCourses { teacher } => {
            let store = open_reporting_store(&database)?;
            let engine = AnalyticsEngine::new(&store);
            out.names(
                "teacher_courses",
                Icons::TEACHER,
                &format!("Disciplines of teacher {}", teacher),
                &engine.teacher_disciplines(teacher)?,
            )?;
        }

        Commands::GroupStudents { group } => {
            let store = open_reporting_store(&database)?;
            let engine = AnalyticsEngine::new(&store);
            out.names(
                "group_students",
                Icons::GROUP,
                &format!("Students of group {}", group),
                &engine.group_students(group)?,
            )?;
        }

        Commands::GroupGrades { group, discipline } => {
            let store = open_reporting_store(&database)?;
            let engine = AnalyticsEngine::new(&store);
            out.rows(
                "group_grades",
                Icons::BOOK,
                &format!("Grades of group {} in discipline {}", group, discipline),
                &engine.group_grades_in_discipline(group, discipline)?,
            )?;
        }

        Commands::TeacherAverage { teacher } => {
            let store = open_reporting_store(&database)?;
            let engine = AnalyticsEngine::new(&store);
            out.average(
                "teacher_average",
                Icons::TEACHER,
                &format!("Average given by teacher {}", teacher),
                engine.teacher_average(teacher)?,
            )?;
        }

        Commands::StudentCourses { student } => {
            let store = open_reporting_store(&database)?;
            let engine = AnalyticsEngine::new(&store);
            out.names(
                "student_courses",
                Icons::BOOK,
                &format!("Disciplines of student {}", student),
                &engine.student_disciplines(student)?,
            )?;
        }

        Commands::StudentTeacherCourses { student, teacher } => {
            let store = open_reporting_store(&database)?;
            let engine = AnalyticsEngine::new(&store);
            out.names(
                "student_teacher_courses",
                Icons::BOOK,
                &format!("Disciplines of student {} taught by teacher {}", student, teacher),
                &engine.student_disciplines_by_teacher(student, teacher)?,
            )?;
        }

        Commands::StudentTeacherAverage { student, teacher } => {
            let store = open_reporting_store(&database)?;
            let engine = AnalyticsEngine::new(&store);
            out.average(
                "student_teacher_average",
                Icons::TEACHER,
                &format!("Average teacher {} gives student {}", teacher, student),
                engine.student_average_by_teacher(student, teacher)?,
            )?;
        }

        Commands::LatestSession { discipline, group } => {
            let store = open_reporting_store(&database)?;
            let engine = AnalyticsEngine::new(&store);
            out.rows(
                "latest_session",
                Icons::CALENDAR,
                &format!("Latest session of discipline {} in group {}", discipline, group),
                &engine.latest_session_grades(discipline, group)?,
            )?;
        }

        Commands::Report => {
            let store = open_reporting_store(&database)?;
            let engine = AnalyticsEngine::new(&store);
            run_report(&engine, &database, &mut out)?;
        }
    }

    out.finish()?;
    Ok(())
}
