//! Schema runner: `migration [up [N] | down [N] | fresh | status]`.
//!
//! Connects to `DATABASE_URL` (default `./sams.db`).

use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./sams.db?mode=rwc";

fn usage() -> ! {
    eprintln!("usage: migration [up [steps] | down [steps] | fresh | status]");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "up".to_string());
    let steps = match args.next() {
        Some(raw) => match raw.parse::<u32>() {
            Ok(steps) => Some(steps),
            Err(_) => usage(),
        },
        None => None,
    };

    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&url).await?;

    match command.as_str() {
        "up" => migration::Migrator::up(&db, steps).await?,
        // Without a count only the latest migration is reverted.
        "down" => migration::Migrator::down(&db, Some(steps.unwrap_or(1))).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => {
            migration::Migrator::status(&db).await?;
            let pending = migration::Migrator::get_pending_migrations(&db).await?;
            println!("{} pending migration(s)", pending.len());
        }
        _ => usage(),
    }

    Ok(())
}
