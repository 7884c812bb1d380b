//! Strongly typed identifiers for catalog rows.
//!
//! All three wrap the integer primary key assigned by the store. Keeping them
//! distinct stops a sale id from being used where a movie id is expected.

use core::fmt;

use serde::{Deserialize, Serialize};

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Raw primary key value.
            #[must_use]
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Identifier of a theatre row.
    TheatreId
);
row_id!(
    /// Identifier of a movie row.
    MovieId
);
row_id!(
    /// Identifier of a sale row, assigned by the store on insert.
    SaleId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_keep_their_raw_value() {
        let id = MovieId::new(7);
        assert_eq!(id.get(), 7);
        assert_eq!(i32::from(id), 7);
        assert_eq!(MovieId::from(7), id);
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn ids_order_by_raw_value() {
        let mut ids = vec![SaleId::new(3), SaleId::new(1), SaleId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![SaleId::new(1), SaleId::new(2), SaleId::new(3)]);
    }
}
