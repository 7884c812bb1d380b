use chrono::{DateTime, Utc};

use crate::{Engine, MovieId, ResultEngine, SaleId, TheatreId};

impl Engine {
    /// Sell `quantity` tickets for a movie of a theatre.
    ///
    /// The quantity is validated against the in-memory availability, then the
    /// sale and the new purchased count are persisted together. Nothing changes
    /// when either step fails.
    pub async fn purchase(
        &mut self,
        theatre_id: TheatreId,
        movie_id: MovieId,
        quantity: i64,
        sold_at: DateTime<Utc>,
    ) -> ResultEngine<SaleId> {
        let theatre = self.inventory.theatre_mut(theatre_id)?;
        let previous = theatre.movie(movie_id)?.tickets_purchased();
        theatre.purchase(movie_id, quantity)?;

        let movie = theatre.movie_mut(movie_id)?;
        let unit_price = movie.price();
        match self
            .ledger
            .record_purchase(movie, quantity, unit_price, sold_at)
            .await
        {
            Ok(sale_id) => {
                tracing::info!(
                    sale_id = sale_id.get(),
                    movie_id = movie_id.get(),
                    quantity,
                    "tickets purchased"
                );
                Ok(sale_id)
            }
            Err(err) => {
                movie.restore_tickets_purchased(previous);
                tracing::error!(
                    movie_id = movie_id.get(),
                    quantity,
                    "purchase rolled back: {err}"
                );
                Err(err)
            }
        }
    }

    /// Cancel a whole sale, giving its tickets back to the movie.
    ///
    /// Returns the movie and the quantity that was cancelled.
    pub async fn cancel_sale(&mut self, sale_id: SaleId) -> ResultEngine<(MovieId, i64)> {
        let sale = self.ledger.sale(sale_id).await?;
        let theatre_id = self.inventory.owner_of(sale.movie_id)?;
        let theatre = self.inventory.theatre_mut(theatre_id)?;
        let previous = theatre.movie(sale.movie_id)?.tickets_purchased();
        theatre.cancel(sale.movie_id, sale.quantity)?;

        let movie = theatre.movie_mut(sale.movie_id)?;
        match self.ledger.record_cancellation(sale_id).await {
            Ok(cancelled) => {
                tracing::info!(
                    sale_id = sale_id.get(),
                    movie_id = sale.movie_id.get(),
                    quantity = sale.quantity,
                    "sale cancelled"
                );
                Ok(cancelled)
            }
            Err(err) => {
                movie.restore_tickets_purchased(previous);
                tracing::error!(sale_id = sale_id.get(), "cancellation rolled back: {err}");
                Err(err)
            }
        }
    }

    /// Change the price and/or show time of a movie.
    ///
    /// Blank or missing values are left as they are. Both values are validated
    /// before anything is written.
    pub async fn update_movie(
        &mut self,
        theatre_id: TheatreId,
        movie_id: MovieId,
        price: Option<&str>,
        show_time: Option<&str>,
    ) -> ResultEngine<()> {
        let current = self.movie(theatre_id, movie_id)?;
        let mut preview = current.clone();
        if let Some(raw) = non_blank(price) {
            preview.set_price(raw.parse()?)?;
        }
        if let Some(raw) = non_blank(show_time) {
            preview.set_show_time(raw)?;
        }
        if preview == *current {
            return Ok(());
        }

        self.ledger.write_movie_details(&preview).await?;
        tracing::info!(
            movie_id = movie_id.get(),
            price = %preview.price(),
            show_time = %preview.show_time(),
            "movie updated"
        );
        *self
            .inventory
            .theatre_mut(theatre_id)?
            .movie_mut(movie_id)? = preview;
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
