use std::{error::Error, fs::File, io::Write, path::PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, Role, StatsFilter, StudentStats};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "sams_admin")]
#[command(about = "Admin utilities for SAMS (bootstrap accounts, export statistics)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./sams.db?mode=rwc")]
    database_url: String,

    /// Token signing key. Nothing here issues tokens, any value works.
    #[arg(
        long,
        env = "SAMS__SERVER__TOKEN_SECRET",
        default_value = "sams-admin",
        hide_env_values = true
    )]
    token_secret: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Stats(Stats),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Admin,
    Teacher,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Admin => Role::Admin,
            RoleArg::Teacher => Role::Teacher,
        }
    }
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    full_name: String,
    #[arg(long, value_enum)]
    role: RoleArg,
}

#[derive(Args, Debug)]
struct Stats {
    #[command(subcommand)]
    command: StatsCommand,
}

#[derive(Subcommand, Debug)]
enum StatsCommand {
    Export(StatsExportArgs),
}

#[derive(Args, Debug)]
struct StatsExportArgs {
    #[arg(long)]
    class_id: Option<i32>,
    #[arg(long)]
    subject_id: Option<i32>,
    /// First day included, `YYYY-MM-DD`.
    #[arg(long)]
    start_date: Option<NaiveDate>,
    /// Last day included, `YYYY-MM-DD`.
    #[arg(long)]
    end_date: Option<NaiveDate>,
    /// CSV destination; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl From<&StatsExportArgs> for StatsFilter {
    fn from(args: &StatsExportArgs) -> Self {
        StatsFilter {
            class_id: args.class_id,
            subject_id: args.subject_id,
            start_date: args.start_date,
            end_date: args.end_date,
        }
    }
}

const STATS_HEADER: [&str; 9] = [
    "student_id",
    "student_name",
    "student_number",
    "class_name",
    "total_records",
    "present_count",
    "absent_count",
    "excused_count",
    "attendance_rate",
];

fn write_stats<W: Write>(rows: &[StudentStats], out: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(STATS_HEADER)?;
    for row in rows {
        writer.write_record([
            row.student_id.to_string(),
            row.student_name.clone(),
            row.student_number.clone(),
            row.class_name.clone(),
            row.total_records.to_string(),
            row.present_count.to_string(),
            row.absent_count.to_string(),
            row.excused_count.to_string(),
            format!("{:.2}", row.attendance_rate()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.is_empty() {
            execute!(out, Print("Password must not be empty.\r\n"))?;
            continue;
        }

        let second = prompt_password("Confirm password: ")?;
        if first == second {
            return Ok(first);
        }

        execute!(out, Print("Passwords do not match. Try again.\r\n"))?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter("sams_admin=info,engine=warn")
        .init();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder()
        .database(db)
        .token_secret(&cli.token_secret)
        .build()
        .await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;
            let created = engine
                .create_user(&args.username, &password, &args.full_name, args.role.into())
                .await;
            match created {
                Ok(user) => {
                    tracing::info!(user_id = user.id, role = user.role.as_str(), "user created");
                    println!("created user: {} ({})", user.username, user.id);
                }
                Err(EngineError::DuplicateUsername) => {
                    eprintln!("user already exists: {}", args.username.trim());
                    std::process::exit(1);
                }
                Err(EngineError::Validation(message)) => {
                    eprintln!("{message}");
                    std::process::exit(2);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Stats(Stats {
            command: StatsCommand::Export(args),
        }) => {
            let rows = engine
                .student_attendance_stats(StatsFilter::from(&args))
                .await?;
            match &args.output {
                Some(path) => {
                    write_stats(&rows, File::create(path)?)?;
                    tracing::info!(rows = rows.len(), path = %path.display(), "statistics exported");
                }
                None => write_stats(&rows, std::io::stdout().lock())?,
            }
        }
    }

    Ok(())
}
