//! The module contains `Sale`, a persisted record of a completed purchase.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{EngineError, Money, MovieId, ResultEngine, SaleId};

/// A completed purchase.
///
/// `total_price` is captured at sale time (`quantity × unit price`) and is not
/// recomputed when the movie price changes later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sale {
    pub id: SaleId,
    pub movie_id: MovieId,
    pub quantity: i64,
    pub sold_at: DateTime<Utc>,
    pub total_price: Money,
}

/// Sale row before the store assigned its id.
pub(crate) fn new_active_model(
    movie_id: MovieId,
    quantity: i64,
    unit_price: Money,
    sold_at: DateTime<Utc>,
) -> ResultEngine<ActiveModel> {
    let total = unit_price.checked_mul(quantity).ok_or_else(|| {
        EngineError::InvalidQuantity(format!("total for {quantity} tickets overflows"))
    })?;
    Ok(ActiveModel {
        id: ActiveValue::NotSet,
        movie_id: ActiveValue::Set(movie_id.get()),
        qty: ActiveValue::Set(quantity),
        sale_time: ActiveValue::Set(sold_at),
        total_price: ActiveValue::Set(total.cents()),
    })
}

impl From<Model> for Sale {
    fn from(model: Model) -> Self {
        Self {
            id: SaleId::new(model.id),
            movie_id: MovieId::new(model.movie_id),
            quantity: model.qty,
            sold_at: model.sale_time,
            total_price: Money::new(model.total_price),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sale")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub movie_id: i32,
    pub qty: i64,
    pub sale_time: DateTimeUtc,
    pub total_price: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::movies::Entity",
        from = "Column::MovieId",
        to = "super::movies::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Movies,
}

impl Related<super::movies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn total_is_quantity_times_unit_price() {
        let sold_at = Utc.timestamp_opt(0, 0).unwrap();
        let model = new_active_model(MovieId::new(4), 5, Money::new(1000), sold_at).unwrap();
        assert_eq!(model.total_price, ActiveValue::Set(5000));
        assert_eq!(model.qty, ActiveValue::Set(5));
        assert_eq!(model.id, ActiveValue::NotSet);
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let sold_at = Utc.timestamp_opt(0, 0).unwrap();
        assert!(matches!(
            new_active_model(MovieId::new(4), 2, Money::new(i64::MAX), sold_at),
            Err(EngineError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn model_maps_to_sale() {
        let sold_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let sale = Sale::from(Model {
            id: 9,
            movie_id: 4,
            qty: 3,
            sale_time: sold_at,
            total_price: 2550,
        });
        assert_eq!(sale.id, SaleId::new(9));
        assert_eq!(sale.movie_id, MovieId::new(4));
        assert_eq!(sale.total_price.to_string(), "25.50");
    }
}
