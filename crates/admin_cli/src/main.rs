use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, Money, ShowTime, TheatreId, provision};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "tickets_admin")]
#[command(about = "Admin utilities for the ticket catalog (theatres, movies, ledger audit)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./tickets_r_us.db?mode=rwc"
    )]
    database_url: String,

    /// Log level for engine diagnostics.
    #[arg(long, default_value = "warn")]
    level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Theatre(Theatre),
    Movie(Movie),
    /// Compare movie counters with the sales ledger; exits 1 on drift.
    Audit,
}

#[derive(Args, Debug)]
struct Theatre {
    #[command(subcommand)]
    command: TheatreCommand,
}

#[derive(Subcommand, Debug)]
enum TheatreCommand {
    Create(TheatreCreateArgs),
}

#[derive(Args, Debug)]
struct TheatreCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    capacity: i64,
}

#[derive(Args, Debug)]
struct Movie {
    #[command(subcommand)]
    command: MovieCommand,
}

#[derive(Subcommand, Debug)]
enum MovieCommand {
    Create(MovieCreateArgs),
}

#[derive(Args, Debug)]
struct MovieCreateArgs {
    #[arg(long)]
    theatre: i32,
    #[arg(long)]
    title: String,
    /// Ticket price, e.g. `10.50`.
    #[arg(long)]
    price: Money,
    /// Show time, `HH:MM` (24-hour).
    #[arg(long)]
    show_time: ShowTime,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(format!("engine={}", cli.level))
        .with_writer(std::io::stderr)
        .init();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::Theatre(Theatre {
            command: TheatreCommand::Create(args),
        }) => {
            let theatre_id = provision::create_theatre(&db, &args.name, args.capacity).await?;
            println!("created theatre: {} ({theatre_id})", args.name.trim());
        }
        Command::Movie(Movie {
            command: MovieCommand::Create(args),
        }) => {
            let movie_id = provision::create_movie(
                &db,
                TheatreId::new(args.theatre),
                &args.title,
                args.price,
                args.show_time,
            )
            .await?;
            println!("created movie: {} ({movie_id})", args.title.trim());
        }
        Command::Audit => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let drift = engine.audit().await?;
            engine.close().await?;
            if drift.is_empty() {
                println!("ledger consistent");
                return Ok(());
            }
            for row in &drift {
                eprintln!("{row}");
            }
            std::process::exit(1);
        }
    }

    db.close().await?;
    Ok(())
}
