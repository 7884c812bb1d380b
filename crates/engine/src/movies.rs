//! The module contains `Movie` and its capacity-aware ticket counter.

use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{EngineError, Money, MovieId, ResultEngine, ShowTime, TheatreId};

/// A movie showing in one theatre.
///
/// `tickets_purchased` is the only counter the engine mutates on purchase and
/// cancellation. Every mutation checks its bounds before touching the counter,
/// so `0 <= tickets_purchased <= capacity` holds at every observable point.
/// The capacity is owned by the theatre and passed in by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Movie {
    pub id: MovieId,
    pub theatre_id: TheatreId,
    pub title: String,
    price: Money,
    show_time: ShowTime,
    tickets_purchased: i64,
}

impl Movie {
    pub fn new(
        id: MovieId,
        theatre_id: TheatreId,
        title: String,
        price: Money,
        show_time: ShowTime,
    ) -> ResultEngine<Self> {
        if price.is_negative() {
            return Err(EngineError::InvalidFormat(format!(
                "price must not be negative, got {price}"
            )));
        }
        Ok(Self {
            id,
            theatre_id,
            title,
            price,
            show_time,
            tickets_purchased: 0,
        })
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn show_time(&self) -> ShowTime {
        self.show_time
    }

    pub fn tickets_purchased(&self) -> i64 {
        self.tickets_purchased
    }

    /// Tickets still available given the owning theatre's capacity.
    pub fn availability(&self, capacity: i64) -> i64 {
        capacity - self.tickets_purchased
    }

    /// Sell `quantity` tickets, returning the new purchased count.
    pub fn purchase(&mut self, quantity: i64, capacity: i64) -> ResultEngine<i64> {
        let available = self.availability(capacity);
        if quantity < 1 || quantity > available {
            return Err(EngineError::InvalidQuantity(format!(
                "{quantity} requested for '{}', must be between 1 and {available}",
                self.title
            )));
        }
        self.tickets_purchased += quantity;
        Ok(self.tickets_purchased)
    }

    /// Return `quantity` previously sold tickets, returning the new purchased
    /// count.
    pub fn cancel(&mut self, quantity: i64) -> ResultEngine<i64> {
        if quantity < 1 || quantity > self.tickets_purchased {
            return Err(EngineError::InvalidQuantity(format!(
                "{quantity} to cancel for '{}', must be between 1 and {}",
                self.title, self.tickets_purchased
            )));
        }
        self.tickets_purchased -= quantity;
        Ok(self.tickets_purchased)
    }

    pub fn set_price(&mut self, price: Money) -> ResultEngine<()> {
        if price.is_negative() {
            return Err(EngineError::InvalidFormat(format!(
                "price must not be negative, got {price}"
            )));
        }
        self.price = price;
        Ok(())
    }

    /// Parse and set a new show time (`HH:MM`, 24-hour).
    pub fn set_show_time(&mut self, raw: &str) -> ResultEngine<()> {
        self.show_time = raw.parse()?;
        Ok(())
    }

    /// Put the counter back after the store refused to persist a mutation.
    pub(crate) fn restore_tickets_purchased(&mut self, previous: i64) {
        self.tickets_purchased = previous;
    }

    /// Rebuild a movie from its row, checking the stored counter against the
    /// theatre capacity.
    pub(crate) fn from_model(model: Model, capacity: i64) -> ResultEngine<Self> {
        let show_time: ShowTime = model.show_time.parse()?;
        let mut movie = Movie::new(
            MovieId::new(model.id),
            TheatreId::new(model.theatre_id),
            model.title,
            Money::new(model.price),
            show_time,
        )?;
        if model.tickets_purchased < 0 || model.tickets_purchased > capacity {
            return Err(EngineError::InvalidQuantity(format!(
                "movie {} has {} tickets purchased, capacity is {capacity}",
                movie.id, model.tickets_purchased
            )));
        }
        movie.tickets_purchased = model.tickets_purchased;
        Ok(movie)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movie")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub theatre_id: i32,
    pub title: String,
    pub price: i64,
    pub show_time: String,
    pub tickets_purchased: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::theatres::Entity",
        from = "Column::TheatreId",
        to = "super::theatres::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Theatres,
    #[sea_orm(has_many = "super::sales::Entity")]
    Sales,
}

impl Related<super::theatres::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Theatres.def()
    }
}

impl Related<super::sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Movie> for ActiveModel {
    fn from(value: &Movie) -> Self {
        Self {
            id: ActiveValue::Set(value.id.get()),
            theatre_id: ActiveValue::Set(value.theatre_id.get()),
            title: ActiveValue::Set(value.title.clone()),
            price: ActiveValue::Set(value.price.cents()),
            show_time: ActiveValue::Set(value.show_time.to_string()),
            tickets_purchased: ActiveValue::Set(value.tickets_purchased),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPACITY: i64 = 100;

    fn movie() -> Movie {
        Movie::new(
            MovieId::new(1),
            TheatreId::new(1),
            String::from("Metropolis"),
            Money::new(1000),
            "20:00".parse().unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn purchase_reduces_availability() {
        let mut movie = movie();
        assert_eq!(movie.purchase(5, CAPACITY).unwrap(), 5);
        assert_eq!(movie.tickets_purchased(), 5);
        assert_eq!(movie.availability(CAPACITY), 95);
    }

    #[test]
    fn purchase_can_sell_out_exactly() {
        let mut movie = movie();
        assert_eq!(movie.purchase(CAPACITY, CAPACITY).unwrap(), CAPACITY);
        assert_eq!(movie.availability(CAPACITY), 0);
        assert!(matches!(
            movie.purchase(1, CAPACITY),
            Err(EngineError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn rejected_purchase_leaves_counter_untouched() {
        let mut movie = movie();
        movie.purchase(5, CAPACITY).unwrap();
        for quantity in [0, -3, 96, i64::MAX] {
            assert!(matches!(
                movie.purchase(quantity, CAPACITY),
                Err(EngineError::InvalidQuantity(_))
            ));
            assert_eq!(movie.tickets_purchased(), 5);
            assert_eq!(movie.availability(CAPACITY), 95);
        }
    }

    #[test]
    fn cancel_is_bounded_by_purchased() {
        let mut movie = movie();
        movie.purchase(4, CAPACITY).unwrap();
        for quantity in [0, -1, 5] {
            assert!(matches!(
                movie.cancel(quantity),
                Err(EngineError::InvalidQuantity(_))
            ));
            assert_eq!(movie.tickets_purchased(), 4);
        }
        assert_eq!(movie.cancel(4).unwrap(), 0);
    }

    #[test]
    fn purchase_then_cancel_round_trips() {
        let mut movie = movie();
        movie.purchase(7, CAPACITY).unwrap();
        let before = movie.tickets_purchased();
        movie.purchase(12, CAPACITY).unwrap();
        movie.cancel(12).unwrap();
        assert_eq!(movie.tickets_purchased(), before);
    }

    #[test]
    fn invariant_holds_over_mixed_sequences() {
        let mut movie = movie();
        let steps: [(bool, i64); 10] = [
            (true, 30),
            (true, 80),
            (false, 10),
            (true, 70),
            (false, 200),
            (true, 10),
            (false, 0),
            (true, 1),
            (false, 100),
            (false, 100),
        ];
        for (buy, quantity) in steps {
            let _ = if buy {
                movie.purchase(quantity, CAPACITY)
            } else {
                movie.cancel(quantity)
            };
            assert!((0..=CAPACITY).contains(&movie.tickets_purchased()));
        }
    }

    #[test]
    fn show_time_must_be_24_hour() {
        let mut movie = movie();
        assert!(matches!(
            movie.set_show_time("25:00"),
            Err(EngineError::InvalidFormat(_))
        ));
        assert_eq!(movie.show_time().to_string(), "20:00");
        movie.set_show_time("18:30").unwrap();
        assert_eq!(movie.show_time().to_string(), "18:30");
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut movie = movie();
        assert!(matches!(
            movie.set_price(Money::new(-1)),
            Err(EngineError::InvalidFormat(_))
        ));
        assert_eq!(movie.price(), Money::new(1000));
        movie.set_price(Money::new(1250)).unwrap();
        assert_eq!(movie.price(), Money::new(1250));
    }

    #[test]
    fn model_over_capacity_is_rejected() {
        let model = Model {
            id: 3,
            theatre_id: 1,
            title: "Nosferatu".to_string(),
            price: 800,
            show_time: "22:15".to_string(),
            tickets_purchased: 51,
        };
        assert!(matches!(
            Movie::from_model(model.clone(), 50),
            Err(EngineError::InvalidQuantity(_))
        ));
        let movie = Movie::from_model(model, 60).unwrap();
        assert_eq!(movie.tickets_purchased(), 51);
        assert_eq!(movie.availability(60), 9);
    }
}
