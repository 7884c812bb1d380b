//! The `Theatre` holds the movies showing in it and the seating capacity they
//! share.

use std::collections::BTreeMap;

use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{EngineError, Movie, MovieId, ResultEngine, TheatreId};

/// A theatre and its movies.
///
/// The capacity is fixed once the theatre is loaded. Each movie sells against
/// the full capacity independently (one showing per movie).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theatre {
    pub id: TheatreId,
    pub name: String,
    capacity: i64,
    movies: BTreeMap<MovieId, Movie>,
}

impl Theatre {
    pub fn new(id: TheatreId, name: String, capacity: i64) -> ResultEngine<Self> {
        if capacity < 1 {
            return Err(EngineError::InvalidQuantity(format!(
                "theatre capacity must be positive, got {capacity}"
            )));
        }
        Ok(Self {
            id,
            name,
            capacity,
            movies: BTreeMap::new(),
        })
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Attach a movie to this theatre. The movie must belong here and its
    /// purchased counter must fit the capacity.
    pub fn add_movie(&mut self, movie: Movie) -> ResultEngine<()> {
        if movie.theatre_id != self.id {
            return Err(EngineError::NotFound(format!(
                "theatre {} for movie {}",
                movie.theatre_id, movie.id
            )));
        }
        if movie.tickets_purchased() > self.capacity {
            return Err(EngineError::InvalidQuantity(format!(
                "movie {} has {} tickets purchased, capacity is {}",
                movie.id,
                movie.tickets_purchased(),
                self.capacity
            )));
        }
        self.movies.insert(movie.id, movie);
        Ok(())
    }

    pub fn has_movie(&self, movie_id: MovieId) -> bool {
        self.movies.contains_key(&movie_id)
    }

    pub fn movie(&self, movie_id: MovieId) -> ResultEngine<&Movie> {
        self.movies
            .get(&movie_id)
            .ok_or_else(|| self.missing_movie(movie_id))
    }

    pub(crate) fn movie_mut(&mut self, movie_id: MovieId) -> ResultEngine<&mut Movie> {
        let missing = self.missing_movie(movie_id);
        self.movies.get_mut(&movie_id).ok_or(missing)
    }

    /// Movies ordered by id.
    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    pub fn movie_ids(&self) -> impl Iterator<Item = MovieId> + '_ {
        self.movies.keys().copied()
    }

    pub fn availability(&self, movie_id: MovieId) -> ResultEngine<i64> {
        Ok(self.movie(movie_id)?.availability(self.capacity))
    }

    /// Sell tickets for one of this theatre's movies.
    pub fn purchase(&mut self, movie_id: MovieId, quantity: i64) -> ResultEngine<i64> {
        let capacity = self.capacity;
        self.movie_mut(movie_id)?.purchase(quantity, capacity)
    }

    /// Give back tickets for one of this theatre's movies.
    pub fn cancel(&mut self, movie_id: MovieId, quantity: i64) -> ResultEngine<i64> {
        self.movie_mut(movie_id)?.cancel(quantity)
    }

    fn missing_movie(&self, movie_id: MovieId) -> EngineError {
        EngineError::NotFound(format!("movie {movie_id} in theatre {}", self.id))
    }
}

impl TryFrom<Model> for Theatre {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Theatre::new(TheatreId::new(model.id), model.name, model.capacity)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "theatre")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub capacity: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movies::Entity")]
    Movies,
}

impl Related<super::movies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Theatre> for ActiveModel {
    fn from(value: &Theatre) -> Self {
        Self {
            id: ActiveValue::Set(value.id.get()),
            name: ActiveValue::Set(value.name.clone()),
            capacity: ActiveValue::Set(value.capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Money;

    fn theatre() -> Theatre {
        let mut theatre = Theatre::new(TheatreId::new(1), String::from("Odeon"), 100).unwrap();
        for (id, title) in [(10, "Metropolis"), (11, "Sunrise")] {
            let movie = Movie::new(
                MovieId::new(id),
                TheatreId::new(1),
                title.to_string(),
                Money::new(1000),
                "19:00".parse().unwrap(),
            )
            .unwrap();
            theatre.add_movie(movie).unwrap();
        }
        theatre
    }

    #[test]
    fn capacity_must_be_positive() {
        assert!(matches!(
            Theatre::new(TheatreId::new(1), String::from("Closet"), 0),
            Err(EngineError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn movies_share_capacity_independently() {
        let mut theatre = theatre();
        theatre.purchase(MovieId::new(10), 60).unwrap();
        assert_eq!(theatre.availability(MovieId::new(10)).unwrap(), 40);
        assert_eq!(theatre.availability(MovieId::new(11)).unwrap(), 100);
    }

    #[test]
    fn scenario_purchase_reject_cancel() {
        let mut theatre = theatre();
        let movie_id = MovieId::new(10);

        assert_eq!(theatre.purchase(movie_id, 5).unwrap(), 5);
        assert_eq!(theatre.availability(movie_id).unwrap(), 95);

        assert!(matches!(
            theatre.purchase(movie_id, 96),
            Err(EngineError::InvalidQuantity(_))
        ));
        assert_eq!(theatre.movie(movie_id).unwrap().tickets_purchased(), 5);
        assert_eq!(theatre.availability(movie_id).unwrap(), 95);

        assert_eq!(theatre.cancel(movie_id, 5).unwrap(), 0);
        assert_eq!(theatre.availability(movie_id).unwrap(), 100);
    }

    #[test]
    fn unknown_movie_is_not_found() {
        let mut theatre = theatre();
        assert_eq!(
            theatre.purchase(MovieId::new(99), 1),
            Err(EngineError::NotFound("movie 99 in theatre 1".to_string()))
        );
        assert!(!theatre.has_movie(MovieId::new(99)));
        assert!(theatre.has_movie(MovieId::new(11)));
    }

    #[test]
    fn movie_from_another_theatre_is_refused() {
        let mut theatre = theatre();
        let stray = Movie::new(
            MovieId::new(20),
            TheatreId::new(2),
            String::from("Faust"),
            Money::new(900),
            "21:00".parse().unwrap(),
        )
        .unwrap();
        assert!(theatre.add_movie(stray).is_err());
        assert_eq!(
            theatre.movie_ids().collect::<Vec<_>>(),
            vec![MovieId::new(10), MovieId::new(11)]
        );
    }
}
