//! Initial schema migration for the ticket catalog.
//!
//! - `theatre`: venues with a fixed seating capacity
//! - `movie`: showings owned by one theatre, with price, show time and the
//!   number of tickets sold so far
//! - `sale`: the ledger of completed purchases, one row per purchase
//!
//! Prices are stored as integer minor units (cents).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Theatre {
    Table,
    Id,
    Name,
    Capacity,
}

#[derive(Iden)]
enum Movie {
    Table,
    Id,
    TheatreId,
    Title,
    Price,
    ShowTime,
    TicketsPurchased,
}

#[derive(Iden)]
enum Sale {
    Table,
    Id,
    MovieId,
    Qty,
    SaleTime,
    TotalPrice,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Theatres
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Theatre::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Theatre::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Theatre::Name).string().not_null())
                    .col(ColumnDef::new(Theatre::Capacity).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Movies
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Movie::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Movie::TheatreId).integer().not_null())
                    .col(ColumnDef::new(Movie::Title).string().not_null())
                    .col(ColumnDef::new(Movie::Price).big_integer().not_null())
                    .col(ColumnDef::new(Movie::ShowTime).string().not_null())
                    .col(
                        ColumnDef::new(Movie::TicketsPurchased)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-movie-theatre_id")
                            .from(Movie::Table, Movie::TheatreId)
                            .to(Theatre::Table, Theatre::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-movie-theatre_id")
                    .table(Movie::Table)
                    .col(Movie::TheatreId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Sales
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Sale::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sale::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sale::MovieId).integer().not_null())
                    .col(ColumnDef::new(Sale::Qty).big_integer().not_null())
                    .col(ColumnDef::new(Sale::SaleTime).timestamp().not_null())
                    .col(ColumnDef::new(Sale::TotalPrice).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sale-movie_id")
                            .from(Sale::Table, Sale::MovieId)
                            .to(Movie::Table, Movie::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sale-movie_id")
                    .table(Sale::Table)
                    .col(Sale::MovieId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Sale::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Movie::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Theatre::Table).to_owned())
            .await?;
        Ok(())
    }
}
