//! In-memory view of the catalog: every theatre with its movies.

use std::collections::BTreeMap;

use crate::{EngineError, Movie, MovieId, ResultEngine, Theatre, TheatreId};

/// Theatres keyed by id, plus an index from movie to owning theatre.
///
/// All ticket counters live here; the store only mirrors them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    theatres: BTreeMap<TheatreId, Theatre>,
    movie_owner: BTreeMap<MovieId, TheatreId>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_theatre(&mut self, theatre: Theatre) {
        for movie_id in theatre.movie_ids() {
            self.movie_owner.insert(movie_id, theatre.id);
        }
        self.theatres.insert(theatre.id, theatre);
    }

    /// Attach a movie to its already loaded theatre.
    pub fn insert_movie(&mut self, movie: Movie) -> ResultEngine<()> {
        let movie_id = movie.id;
        let theatre_id = movie.theatre_id;
        self.theatre_mut(theatre_id)?.add_movie(movie)?;
        self.movie_owner.insert(movie_id, theatre_id);
        Ok(())
    }

    /// Theatres ordered by id.
    pub fn theatres(&self) -> impl Iterator<Item = &Theatre> {
        self.theatres.values()
    }

    pub fn theatre_ids(&self) -> impl Iterator<Item = TheatreId> + '_ {
        self.theatres.keys().copied()
    }

    pub fn has_theatre(&self, theatre_id: TheatreId) -> bool {
        self.theatres.contains_key(&theatre_id)
    }

    pub fn theatre(&self, theatre_id: TheatreId) -> ResultEngine<&Theatre> {
        self.theatres
            .get(&theatre_id)
            .ok_or_else(|| EngineError::NotFound(format!("theatre {theatre_id}")))
    }

    pub(crate) fn theatre_mut(&mut self, theatre_id: TheatreId) -> ResultEngine<&mut Theatre> {
        self.theatres
            .get_mut(&theatre_id)
            .ok_or_else(|| EngineError::NotFound(format!("theatre {theatre_id}")))
    }

    /// Theatre that shows `movie_id`.
    pub fn owner_of(&self, movie_id: MovieId) -> ResultEngine<TheatreId> {
        self.movie_owner
            .get(&movie_id)
            .copied()
            .ok_or_else(|| EngineError::NotFound(format!("movie {movie_id}")))
    }

    /// Look a movie up by id alone.
    pub fn movie(&self, movie_id: MovieId) -> ResultEngine<&Movie> {
        let theatre_id = self.owner_of(movie_id)?;
        self.theatre(theatre_id)?.movie(movie_id)
    }

    /// All movies of all theatres, ordered by theatre then movie id.
    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.theatres.values().flat_map(|theatre| theatre.movies())
    }

    pub fn is_empty(&self) -> bool {
        self.theatres.is_empty()
    }
}
