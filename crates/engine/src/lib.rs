//! Ticket inventory engine.
//!
//! The [`Engine`] is the context object an operator session works with. It
//! holds the loaded [`Inventory`] (theatres, movies, purchased counters) and
//! the [`Ledger`] that mirrors every accepted mutation into the store.
//!
//! Mutations follow one protocol: apply to memory first (where the capacity
//! invariant is checked), then persist through the ledger as one database
//! transaction. If the store refuses the write, the in-memory counter is put
//! back, so the two views never diverge.

use sea_orm::DatabaseConnection;

pub use error::EngineError;
pub use ids::{MovieId, SaleId, TheatreId};
pub use inventory::Inventory;
pub use ledger::{Ledger, LedgerDrift};
pub use money::Money;
pub use movies::Movie;
pub use sales::Sale;
pub use show_time::ShowTime;
pub use theatres::Theatre;

mod error;
mod flows;
mod ids;
mod inventory;
mod ledger;
mod money;
mod movies;
pub mod provision;
mod sales;
mod show_time;
mod theatres;

type ResultEngine<T> = Result<T, EngineError>;

#[derive(Debug)]
pub struct Engine {
    inventory: Inventory,
    ledger: Ledger,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Theatres ordered by id.
    pub fn theatres(&self) -> impl Iterator<Item = &Theatre> {
        self.inventory.theatres()
    }

    pub fn theatre(&self, theatre_id: TheatreId) -> ResultEngine<&Theatre> {
        self.inventory.theatre(theatre_id)
    }

    /// Movies of one theatre, ordered by id.
    pub fn movies(&self, theatre_id: TheatreId) -> ResultEngine<impl Iterator<Item = &Movie>> {
        Ok(self.inventory.theatre(theatre_id)?.movies())
    }

    pub fn movie(&self, theatre_id: TheatreId, movie_id: MovieId) -> ResultEngine<&Movie> {
        self.inventory.theatre(theatre_id)?.movie(movie_id)
    }

    pub fn availability(&self, theatre_id: TheatreId, movie_id: MovieId) -> ResultEngine<i64> {
        self.inventory.theatre(theatre_id)?.availability(movie_id)
    }

    /// Sales ordered by id, read from the store.
    pub async fn sales(&self) -> ResultEngine<Vec<Sale>> {
        self.ledger.sales().await
    }

    /// Movies whose memory, movie row and sale rows disagree.
    pub async fn audit(&self) -> ResultEngine<Vec<LedgerDrift>> {
        self.ledger.audit(&self.inventory).await
    }

    /// Throw away the in-memory inventory and read it again from the store.
    pub async fn reload(&mut self) -> ResultEngine<()> {
        self.inventory = self.ledger.load_inventory().await?;
        Ok(())
    }

    /// Release the store connection.
    pub async fn close(self) -> ResultEngine<()> {
        self.ledger.close().await
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`, loading the inventory from the database.
    pub async fn build(self) -> ResultEngine<Engine> {
        let ledger = Ledger::new(self.database);
        let inventory = ledger.load_inventory().await?;
        Ok(Engine { inventory, ledger })
    }
}
