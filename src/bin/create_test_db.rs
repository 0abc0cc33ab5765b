use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Month, OffsetDateTime};

use agent_dashboard::{initialize_db, seed_demo_agents};

/// A utility for creating a test database for the agent dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The year to create transactions in, defaults to the current year.
    #[arg(long, short)]
    year: Option<i32>,
}

/// The number of transactions each agent makes per month.
const TRANSACTIONS_PER_MONTH: usize = 3;

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let year = args
        .year
        .unwrap_or_else(|| OffsetDateTime::now_utc().year());

    println!("Creating database at {output_path:#?}");
    let mut conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo agents...");
    seed_demo_agents(&conn)?;

    let agent_ids = {
        let mut statement = conn.prepare("SELECT id FROM agents ORDER BY id")?;
        statement
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?
    };

    println!("Creating transactions for {year}...");
    let transaction = conn.transaction()?;
    let mut count = 0;
    {
        let mut statement = transaction.prepare(
            "INSERT INTO transactions (agent_id, volume, date, address) VALUES (?1, ?2, ?3, ?4)",
        )?;

        for (agent_index, agent_id) in agent_ids.iter().enumerate() {
            for month_number in 1..=12u8 {
                let month = Month::try_from(month_number)?;

                for i in 0..TRANSACTIONS_PER_MONTH {
                    let seed = agent_index * 7 + usize::from(month_number) * 3 + i * 5;
                    let day = 1 + (seed % 28) as u8;
                    let date = Date::from_calendar_date(year, month, day)?;
                    let volume = sample_volume(seed);
                    let address = format!("{} Example Street", 10 + seed % 90);

                    statement.execute((agent_id, volume, date, address))?;
                    count += 1;
                }
            }
        }
    }
    transaction.commit()?;

    println!("Created {count} transactions.");
    println!("Success!");

    Ok(())
}

/// A volume between $80,000 and $120,000 that depends only on `seed`.
fn sample_volume(seed: usize) -> f64 {
    let step = (seed * 37 % 41) as f64;

    80_000.0 + step * 1_000.0
}
