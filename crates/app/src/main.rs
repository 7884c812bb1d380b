use engine::Engine;
use migration::{Migrator, MigratorTrait};
use session::Session;
use settings::Database;

mod error;
mod session;
mod settings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> error::Result<()> {
    let settings = settings::Settings::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tickets={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let db = connect_database(&settings.database).await?;
    let mut engine = Engine::builder().database(db).build().await?;
    tracing::info!("inventory ready");

    let drift = engine.audit().await?;
    if !drift.is_empty() {
        tracing::warn!(movies = drift.len(), "sales ledger and movie counters disagree");
    }

    let stdin = std::io::stdin();
    let outcome = Session::new(&mut engine, stdin.lock(), std::io::stdout())
        .run()
        .await;
    engine.close().await?;
    outcome
}

async fn connect_database(config: &Database) -> error::Result<sea_orm::DatabaseConnection> {
    let url = config.url();
    tracing::info!(%url, "connecting to database");
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
