//! Catalog provisioning: creating theatres and movies in the store.
//!
//! An [`Engine`](crate::Engine) never creates catalog rows itself; these
//! helpers are used by the admin tool (and tests) before the engine loads.

use sea_orm::{ActiveValue, ConnectionTrait, prelude::*};

use crate::{EngineError, Money, MovieId, ResultEngine, ShowTime, TheatreId, movies, theatres};

/// Insert a theatre and return its id.
pub async fn create_theatre<C: ConnectionTrait>(
    db: &C,
    name: &str,
    capacity: i64,
) -> ResultEngine<TheatreId> {
    let name = normalize_required_name(name, "theatre")?;
    if capacity < 1 {
        return Err(EngineError::InvalidQuantity(format!(
            "theatre capacity must be positive, got {capacity}"
        )));
    }

    let model = theatres::ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name),
        capacity: ActiveValue::Set(capacity),
    }
    .insert(db)
    .await?;

    tracing::info!(theatre_id = model.id, capacity, "theatre created");
    Ok(TheatreId::new(model.id))
}

/// Insert a movie with no tickets sold and return its id.
pub async fn create_movie<C: ConnectionTrait>(
    db: &C,
    theatre_id: TheatreId,
    title: &str,
    price: Money,
    show_time: ShowTime,
) -> ResultEngine<MovieId> {
    let title = normalize_required_name(title, "movie")?;
    if price.is_negative() {
        return Err(EngineError::InvalidFormat(format!(
            "price must not be negative, got {price}"
        )));
    }
    if theatres::Entity::find_by_id(theatre_id.get())
        .one(db)
        .await?
        .is_none()
    {
        return Err(EngineError::NotFound(format!("theatre {theatre_id}")));
    }

    let model = movies::ActiveModel {
        id: ActiveValue::NotSet,
        theatre_id: ActiveValue::Set(theatre_id.get()),
        title: ActiveValue::Set(title),
        price: ActiveValue::Set(price.cents()),
        show_time: ActiveValue::Set(show_time.to_string()),
        tickets_purchased: ActiveValue::Set(0),
    }
    .insert(db)
    .await?;

    tracing::info!(movie_id = model.id, theatre_id = theatre_id.get(), "movie created");
    Ok(MovieId::new(model.id))
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidFormat(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}
