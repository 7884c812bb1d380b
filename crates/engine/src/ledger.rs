//! Persistence side of every inventory mutation.
//!
//! The in-memory [`Inventory`] is the authority for the capacity invariant;
//! the [`Ledger`] mirrors each accepted mutation into the store. Every write
//! that touches more than one row runs inside a single database transaction,
//! so a restart always reloads a consistent catalog.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseConnection, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, Inventory, Money, Movie, MovieId, ResultEngine, Sale, SaleId, Theatre,
    TheatreId, movies, sales, theatres,
};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: ResultEngine<_> = async { $body }.await;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                $tx.rollback().await?;
                Err(err)
            }
        }
    }};
}

/// A movie whose persisted counters disagree with each other or with memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerDrift {
    pub movie_id: MovieId,
    /// Purchased count held by the loaded inventory.
    pub in_memory: Option<i64>,
    /// Purchased count stored on the movie row.
    pub stored: Option<i64>,
    /// Sum of the quantities of the movie's sale rows.
    pub sold: i64,
}

impl fmt::Display for LedgerDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |value: Option<i64>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
        write!(
            f,
            "movie {}: in memory {}, stored {}, sold {}",
            self.movie_id,
            show(self.in_memory),
            show(self.stored),
            self.sold
        )
    }
}

/// Store handle plus the reconciling writes.
#[derive(Clone, Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Read every theatre and movie row into a fresh inventory.
    ///
    /// Rows that break the capacity invariant fail the load. A movie pointing
    /// at a missing theatre is skipped.
    pub async fn load_inventory(&self) -> ResultEngine<Inventory> {
        let theatre_models = theatres::Entity::find()
            .order_by_asc(theatres::Column::Id)
            .all(&self.database)
            .await?;
        let movie_models = movies::Entity::find()
            .order_by_asc(movies::Column::Id)
            .all(&self.database)
            .await?;

        let mut inventory = Inventory::new();
        for model in theatre_models {
            inventory.insert_theatre(Theatre::try_from(model)?);
        }

        let mut skipped = 0usize;
        for model in movie_models {
            let theatre_id = TheatreId::new(model.theatre_id);
            let Ok(theatre) = inventory.theatre(theatre_id) else {
                tracing::warn!(
                    movie_id = model.id,
                    theatre_id = model.theatre_id,
                    "skipping movie of unknown theatre"
                );
                skipped += 1;
                continue;
            };
            let movie = Movie::from_model(model, theatre.capacity())?;
            inventory.insert_movie(movie)?;
        }

        tracing::info!(
            theatres = inventory.theatres().count(),
            movies = inventory.movies().count(),
            skipped,
            "inventory loaded"
        );
        Ok(inventory)
    }

    /// All sales ordered by id.
    pub async fn sales(&self) -> ResultEngine<Vec<Sale>> {
        let models = sales::Entity::find()
            .order_by_asc(sales::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Sale::from).collect())
    }

    pub async fn sale(&self, sale_id: SaleId) -> ResultEngine<Sale> {
        sales::Entity::find_by_id(sale_id.get())
            .one(&self.database)
            .await?
            .map(Sale::from)
            .ok_or_else(|| EngineError::NotFound(format!("sale {sale_id}")))
    }

    /// Persist a purchase already applied to `movie` in memory: append the
    /// sale and store the movie's new purchased count, as one unit.
    ///
    /// Quantity bounds are not checked again here.
    pub async fn record_purchase(
        &self,
        movie: &Movie,
        quantity: i64,
        unit_price: Money,
        sold_at: DateTime<Utc>,
    ) -> ResultEngine<SaleId> {
        let sale = sales::new_active_model(movie.id, quantity, unit_price, sold_at)?;
        let tickets_purchased = movie.tickets_purchased();

        let sale_id = with_tx!(self, |db_tx| {
            let inserted = sale.insert(&db_tx).await?;
            let updated = movies::Entity::update_many()
                .col_expr(
                    movies::Column::TicketsPurchased,
                    Expr::value(tickets_purchased),
                )
                .filter(movies::Column::Id.eq(movie.id.get()))
                .exec(&db_tx)
                .await?;
            ensure_movie_updated(updated.rows_affected, movie.id)?;
            Ok(SaleId::new(inserted.id))
        })?;

        tracing::debug!(
            sale_id = sale_id.get(),
            movie_id = movie.id.get(),
            quantity,
            tickets_purchased,
            "purchase recorded"
        );
        Ok(sale_id)
    }

    /// Delete a sale and take its quantity off the movie's stored purchased
    /// count, as one unit. Returns the movie and the quantity given back.
    pub async fn record_cancellation(&self, sale_id: SaleId) -> ResultEngine<(MovieId, i64)> {
        let (movie_id, quantity) = with_tx!(self, |db_tx| {
            let sale = sales::Entity::find_by_id(sale_id.get())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("sale {sale_id}")))?;

            sales::Entity::delete_by_id(sale.id).exec(&db_tx).await?;

            let movie_id = MovieId::new(sale.movie_id);
            let updated = movies::Entity::update_many()
                .col_expr(
                    movies::Column::TicketsPurchased,
                    Expr::col(movies::Column::TicketsPurchased).sub(sale.qty),
                )
                .filter(movies::Column::Id.eq(sale.movie_id))
                .filter(movies::Column::TicketsPurchased.gte(sale.qty))
                .exec(&db_tx)
                .await?;
            ensure_movie_updated(updated.rows_affected, movie_id)?;
            Ok((movie_id, sale.qty))
        })?;

        tracing::debug!(
            sale_id = sale_id.get(),
            movie_id = movie_id.get(),
            quantity,
            "cancellation recorded"
        );
        Ok((movie_id, quantity))
    }

    /// Store the price and show time of `movie`.
    pub async fn write_movie_details(&self, movie: &Movie) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let updated = movies::Entity::update_many()
                .col_expr(movies::Column::Price, Expr::value(movie.price().cents()))
                .col_expr(
                    movies::Column::ShowTime,
                    Expr::value(movie.show_time().to_string()),
                )
                .filter(movies::Column::Id.eq(movie.id.get()))
                .exec(&db_tx)
                .await?;
            ensure_movie_updated(updated.rows_affected, movie.id)
        })?;

        tracing::debug!(
            movie_id = movie.id.get(),
            price = %movie.price(),
            show_time = %movie.show_time(),
            "movie details recorded"
        );
        Ok(())
    }

    /// Compare, per movie, the in-memory purchased count, the stored movie row
    /// and the sum of its sale rows. Returns every movie where they disagree.
    pub async fn audit(&self, inventory: &Inventory) -> ResultEngine<Vec<LedgerDrift>> {
        let movie_models = movies::Entity::find().all(&self.database).await?;
        let sale_models = sales::Entity::find().all(&self.database).await?;

        let mut rows: BTreeMap<MovieId, LedgerDrift> = BTreeMap::new();
        for movie in inventory.movies() {
            drift_row(&mut rows, movie.id).in_memory = Some(movie.tickets_purchased());
        }
        for model in movie_models {
            drift_row(&mut rows, MovieId::new(model.id)).stored = Some(model.tickets_purchased);
        }
        for model in sale_models {
            drift_row(&mut rows, MovieId::new(model.movie_id)).sold += model.qty;
        }

        let drift: Vec<LedgerDrift> = rows
            .into_values()
            .filter(|row| row.in_memory != Some(row.sold) || row.stored != Some(row.sold))
            .collect();
        for row in &drift {
            tracing::warn!("ledger drift: {row}");
        }
        Ok(drift)
    }

    /// Release the store connection.
    pub async fn close(self) -> ResultEngine<()> {
        self.database.close().await?;
        Ok(())
    }
}

fn drift_row(rows: &mut BTreeMap<MovieId, LedgerDrift>, movie_id: MovieId) -> &mut LedgerDrift {
    rows.entry(movie_id).or_insert(LedgerDrift {
        movie_id,
        in_memory: None,
        stored: None,
        sold: 0,
    })
}

fn ensure_movie_updated(rows_affected: u64, movie_id: MovieId) -> ResultEngine<()> {
    if rows_affected != 1 {
        tracing::error!(
            movie_id = movie_id.get(),
            rows_affected,
            "movie row was not updated"
        );
        return Err(EngineError::Storage(DbErr::RecordNotUpdated));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drift_display_marks_missing_counters() {
        let drift = LedgerDrift {
            movie_id: MovieId::new(3),
            in_memory: Some(4),
            stored: None,
            sold: 2,
        };
        assert_eq!(drift.to_string(), "movie 3: in memory 4, stored -, sold 2");
    }

    #[test]
    fn zero_rows_updated_is_a_storage_failure() {
        assert!(ensure_movie_updated(1, MovieId::new(1)).is_ok());
        assert!(ensure_movie_updated(0, MovieId::new(1)).unwrap_err().is_storage());
    }
}
