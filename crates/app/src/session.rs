//! The interactive operator menu.
//!
//! Reads commands from any `BufRead` and writes to any `Write`, so the loop
//! runs the same on a terminal and in tests. End of input exits the loop.

use std::io::{BufRead, Write};

use chrono::{SecondsFormat, Utc};
use engine::{Engine, EngineError, MovieId, SaleId, TheatreId};

use crate::error::Result;

const MENU: &str = "1) View theatres\n\
                    2) View movies by theatre\n\
                    3) Purchase tickets\n\
                    4) Cancel purchase\n\
                    5) Admin: update movie info\n\
                    6) Exit";

pub struct Session<'e, R, W> {
    engine: &'e mut Engine,
    input: R,
    output: W,
}

impl<'e, R: BufRead, W: Write> Session<'e, R, W> {
    pub fn new(engine: &'e mut Engine, input: R, output: W) -> Self {
        Self {
            engine,
            input,
            output,
        }
    }

    /// Serve menu commands until the operator exits or input ends.
    pub async fn run(mut self) -> Result<()> {
        loop {
            match self.step().await {
                Ok(true) => {}
                Ok(false) | Err(Interrupt::EndOfInput) => break,
                Err(Interrupt::Fatal(err)) => return Err(err),
            }
        }
        self.output.flush()?;
        Ok(())
    }

    /// Show the menu and run one command. `false` means exit.
    async fn step(&mut self) -> Step<bool> {
        writeln!(self.output, "{MENU}")?;
        let choice = self
            .prompt_int(" ", |n| (1..=6).contains(&n))?
            .ok_or(Interrupt::EndOfInput)?;
        match choice {
            1 => self.list_theatres().map(|_| ())?,
            2 => self.view_movies()?,
            3 => self.purchase().await?,
            4 => self.cancel().await?,
            5 => self.update_movie().await?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn list_theatres(&mut self) -> Step<bool> {
        let mut any = false;
        for theatre in self.engine.theatres() {
            writeln!(
                self.output,
                "{}: {} (capacity {})",
                theatre.id,
                theatre.name,
                theatre.capacity()
            )?;
            any = true;
        }
        if !any {
            writeln!(self.output, "No theatres.")?;
        }
        Ok(any)
    }

    fn list_movies(&mut self, theatre_id: TheatreId) -> Step<()> {
        let theatre = self.engine.theatre(theatre_id).map_err(Interrupt::from)?;
        for movie in theatre.movies() {
            writeln!(
                self.output,
                "{}: {} @ {} | ${} | available {}",
                movie.id,
                movie.title,
                movie.show_time(),
                movie.price(),
                movie.availability(theatre.capacity())
            )?;
        }
        Ok(())
    }

    fn view_movies(&mut self) -> Step<()> {
        let Some(theatre_id) = self.choose_theatre()? else {
            return Ok(());
        };
        self.list_movies(theatre_id)
    }

    async fn purchase(&mut self) -> Step<()> {
        let Some((theatre_id, movie_id)) = self.choose_movie()? else {
            return Ok(());
        };
        let available = self
            .engine
            .availability(theatre_id, movie_id)
            .map_err(Interrupt::from)?;
        if available == 0 {
            writeln!(self.output, "No tickets available.")?;
            return Ok(());
        }

        let prompt = format!("Quantity (1-{available}): ");
        let quantity = self
            .prompt_int(&prompt, |n| (1..=available).contains(&n))?
            .ok_or(Interrupt::EndOfInput)?;
        match self
            .engine
            .purchase(theatre_id, movie_id, quantity, Utc::now())
            .await
        {
            Ok(sale_id) => writeln!(self.output, "Purchase successful. Sale {sale_id}.")?,
            Err(err) => self.report(err).await?,
        }
        Ok(())
    }

    async fn cancel(&mut self) -> Step<()> {
        let sales = match self.engine.sales().await {
            Ok(sales) => sales,
            Err(err) => return self.report(err).await,
        };
        if sales.is_empty() {
            writeln!(self.output, "No sales.")?;
            return Ok(());
        }
        for sale in &sales {
            writeln!(
                self.output,
                "{}: movie {} qty {} time {} total ${}",
                sale.id,
                sale.movie_id,
                sale.quantity,
                sale.sold_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                sale.total_price
            )?;
        }

        let sale_id = self
            .prompt_int("Sale ID to cancel: ", |n| i32::try_from(n).is_ok())?
            .ok_or(Interrupt::EndOfInput)?;
        let sale_id = SaleId::new(sale_id as i32);
        match self.engine.cancel_sale(sale_id).await {
            Ok(_) => writeln!(self.output, "Cancellation successful.")?,
            Err(EngineError::NotFound(what)) if what == format!("sale {sale_id}") => {
                writeln!(self.output, "Sale not found.")?
            }
            Err(err) => self.report(err).await?,
        }
        Ok(())
    }

    async fn update_movie(&mut self) -> Step<()> {
        let Some((theatre_id, movie_id)) = self.choose_movie()? else {
            return Ok(());
        };
        let price = self
            .prompt_line("New price (blank to skip): ")?
            .ok_or(Interrupt::EndOfInput)?;
        let show_time = self
            .prompt_line("New show time HH:MM (blank to skip): ")?
            .ok_or(Interrupt::EndOfInput)?;

        match self
            .engine
            .update_movie(theatre_id, movie_id, Some(&price), Some(&show_time))
            .await
        {
            Ok(()) => writeln!(self.output, "Movie updated.")?,
            Err(err) => self.report(err).await?,
        }
        Ok(())
    }

    fn choose_theatre(&mut self) -> Step<Option<TheatreId>> {
        if !self.list_theatres()? {
            return Ok(None);
        }
        let inventory = self.engine.inventory();
        let valid: Vec<i64> = inventory.theatre_ids().map(|id| id.get().into()).collect();
        let id = self
            .prompt_int("Theatre ID: ", |n| valid.contains(&n))?
            .ok_or(Interrupt::EndOfInput)?;
        Ok(Some(TheatreId::new(id as i32)))
    }

    fn choose_movie(&mut self) -> Step<Option<(TheatreId, MovieId)>> {
        let Some(theatre_id) = self.choose_theatre()? else {
            return Ok(None);
        };
        self.list_movies(theatre_id)?;
        let theatre = self.engine.theatre(theatre_id).map_err(Interrupt::from)?;
        let valid: Vec<i64> = theatre.movie_ids().map(|id| id.get().into()).collect();
        if valid.is_empty() {
            writeln!(self.output, "No movies.")?;
            return Ok(None);
        }
        let id = self
            .prompt_int("Movie ID: ", |n| valid.contains(&n))?
            .ok_or(Interrupt::EndOfInput)?;
        Ok(Some((theatre_id, MovieId::new(id as i32))))
    }

    /// Show an engine failure to the operator. After a storage failure the
    /// inventory is reloaded; if that fails too the session ends.
    async fn report(&mut self, err: EngineError) -> Step<()> {
        writeln!(self.output, "{err}")?;
        if err.is_storage() {
            tracing::warn!("reloading inventory after storage failure");
            self.engine.reload().await.map_err(Interrupt::from)?;
        }
        Ok(())
    }

    /// Prompt until the operator enters an integer accepted by `valid`.
    /// Returns `None` at end of input.
    fn prompt_int(&mut self, prompt: &str, valid: impl Fn(i64) -> bool) -> Step<Option<i64>> {
        loop {
            let Some(line) = self.prompt_line(prompt)? else {
                return Ok(None);
            };
            if let Ok(value) = line.parse::<i64>()
                && valid(value)
            {
                return Ok(Some(value));
            }
        }
    }

    fn prompt_line(&mut self, prompt: &str) -> Step<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Why a menu action stopped early.
enum Interrupt {
    EndOfInput,
    Fatal(crate::error::AppError),
}

type Step<T> = std::result::Result<T, Interrupt>;

impl From<std::io::Error> for Interrupt {
    fn from(err: std::io::Error) -> Self {
        Interrupt::Fatal(err.into())
    }
}

impl From<EngineError> for Interrupt {
    fn from(err: EngineError) -> Self {
        Interrupt::Fatal(err.into())
    }
}

#[cfg(test)]
mod tests {
    use engine::{Money, provision};
    use migration::MigratorTrait;
    use sea_orm::Database;

    use super::*;

    async fn engine() -> Engine {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let odeon = provision::create_theatre(&db, "Odeon", 100).await.unwrap();
        provision::create_movie(
            &db,
            odeon,
            "Metropolis",
            Money::new(1000),
            "20:00".parse().unwrap(),
        )
        .await
        .unwrap();
        let rex = provision::create_theatre(&db, "Rex", 2).await.unwrap();
        provision::create_movie(&db, rex, "Sunrise", Money::new(750), "18:15".parse().unwrap())
            .await
            .unwrap();
        Engine::builder().database(db).build().await.unwrap()
    }

    async fn run(engine: &mut Engine, input: &str) -> String {
        let mut output = Vec::new();
        Session::new(engine, input.as_bytes(), &mut output)
            .run()
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    fn purchased(engine: &Engine, theatre: i32, movie: i32) -> i64 {
        engine
            .movie(TheatreId::new(theatre), MovieId::new(movie))
            .unwrap()
            .tickets_purchased()
    }

    #[tokio::test]
    async fn lists_theatres_and_movies() {
        let mut engine = engine().await;
        let out = run(&mut engine, "1\n2\n7\n1\n6\n").await;

        assert!(out.contains("1: Odeon (capacity 100)"));
        assert!(out.contains("2: Rex (capacity 2)"));
        assert!(out.contains("1: Metropolis @ 20:00 | $10.00 | available 100"));
        assert!(!out.contains("Sunrise"));
    }

    #[tokio::test]
    async fn purchase_reprompts_until_quantity_is_in_range() {
        let mut engine = engine().await;
        let out = run(&mut engine, "3\n1\n1\nabc\n0\n101\n5\n6\n").await;

        assert_eq!(out.matches("Quantity (1-100): ").count(), 4);
        assert!(out.contains("Purchase successful. Sale 1."));
        assert_eq!(purchased(&engine, 1, 1), 5);
        assert_eq!(engine.availability(TheatreId::new(1), MovieId::new(1)).unwrap(), 95);
    }

    #[tokio::test]
    async fn sold_out_movie_is_reported() {
        let mut engine = engine().await;
        let out = run(&mut engine, "3\n2\n2\n2\n3\n2\n2\n6\n").await;

        assert!(out.contains("Purchase successful."));
        assert!(out.contains("No tickets available."));
        assert_eq!(purchased(&engine, 2, 2), 2);
    }

    #[tokio::test]
    async fn cancel_reports_unknown_sales() {
        let mut engine = engine().await;
        let out = run(&mut engine, "4\n3\n1\n1\n4\n4\n99\n4\n1\n6\n").await;

        assert!(out.contains("No sales."));
        assert!(out.contains("1: movie 1 qty 4 time "));
        assert!(out.contains("total $40.00"));
        assert!(out.contains("Sale not found."));
        assert!(out.contains("Cancellation successful."));
        assert_eq!(purchased(&engine, 1, 1), 0);
        assert!(engine.sales().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_movie_shows_format_errors() {
        let mut engine = engine().await;
        let out = run(
            &mut engine,
            "5\n1\n1\n\n25:00\n5\n1\n1\n12.50\n18:30\n2\n1\n6\n",
        )
        .await;

        assert!(out.contains("Invalid format: show time must be HH:MM"));
        assert!(out.contains("Movie updated."));
        assert!(out.contains("1: Metropolis @ 18:30 | $12.50 | available 100"));
    }

    #[tokio::test]
    async fn end_of_input_exits_cleanly() {
        let mut engine = engine().await;
        let out = run(&mut engine, "3\n1\n").await;
        assert!(out.contains("Movie ID: "));
        assert_eq!(purchased(&engine, 1, 1), 0);

        let out = run(&mut engine, "").await;
        assert!(out.starts_with("1) View theatres"));
    }
}
