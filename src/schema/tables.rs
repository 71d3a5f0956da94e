//! Staging and star-schema table definitions.

use super::table::{Column, SqlType, Table};
use crate::warehouse_column;

// =============================================================================
// Staging tables
// =============================================================================

/// Raw user activity events, one row per log line.
pub const STAGING_EVENTS_TABLE: Table = Table {
    name: "staging_events",
    columns: &[
        warehouse_column!("artist", SqlType::Varchar),
        warehouse_column!("auth", SqlType::Varchar),
        warehouse_column!("firstName", SqlType::Varchar),
        warehouse_column!("gender", SqlType::Varchar),
        warehouse_column!("itemInSession", SqlType::Integer),
        warehouse_column!("lastName", SqlType::Varchar),
        warehouse_column!("length", SqlType::Decimal),
        warehouse_column!("level", SqlType::Varchar),
        warehouse_column!("location", SqlType::Varchar),
        warehouse_column!("method", SqlType::Varchar),
        warehouse_column!("page", SqlType::Varchar),
        warehouse_column!("registration", SqlType::Varchar),
        warehouse_column!("sessionId", SqlType::Integer),
        warehouse_column!("song", SqlType::Text),
        warehouse_column!("status", SqlType::Integer),
        warehouse_column!("ts", SqlType::Timestamp),
        warehouse_column!("userAgent", SqlType::Text),
        warehouse_column!("userId", SqlType::Integer),
    ],
};

/// Raw song catalog records.
pub const STAGING_SONGS_TABLE: Table = Table {
    name: "staging_songs",
    columns: &[
        warehouse_column!("num_songs", SqlType::Integer),
        warehouse_column!("artist_id", SqlType::Text),
        warehouse_column!("artist_latitude", SqlType::Float),
        warehouse_column!("artist_longitude", SqlType::Float),
        warehouse_column!("artist_location", SqlType::Varchar),
        warehouse_column!("artist_name", SqlType::Text),
        warehouse_column!("song_id", SqlType::Text),
        warehouse_column!("title", SqlType::Text),
        warehouse_column!("duration", SqlType::Float),
        warehouse_column!("year", SqlType::Integer),
    ],
};

// =============================================================================
// Star schema
// =============================================================================

pub const SONGPLAYS_TABLE: Table = Table {
    name: "songplays",
    columns: &[
        warehouse_column!(
            "songplay_id",
            SqlType::Integer,
            is_primary_key = true,
            is_identity = true
        ),
        warehouse_column!("start_time", SqlType::Timestamp, non_null = true),
        warehouse_column!("user_id", SqlType::Integer, non_null = true),
        warehouse_column!("level", SqlType::Varchar),
        warehouse_column!("song_id", SqlType::Text, non_null = true),
        warehouse_column!("artist_id", SqlType::Text, non_null = true),
        warehouse_column!("session_id", SqlType::Integer, non_null = true),
        warehouse_column!("location", SqlType::Varchar),
        warehouse_column!("user_agent", SqlType::Text),
    ],
};

pub const USERS_TABLE: Table = Table {
    name: "users",
    columns: &[
        warehouse_column!("user_id", SqlType::Integer, is_primary_key = true),
        warehouse_column!("first_name", SqlType::Text),
        warehouse_column!("last_name", SqlType::Text),
        warehouse_column!("gender", SqlType::Text),
        warehouse_column!("level", SqlType::Text),
    ],
};

pub const SONGS_TABLE: Table = Table {
    name: "songs",
    columns: &[
        warehouse_column!("song_id", SqlType::Text, is_primary_key = true),
        warehouse_column!("title", SqlType::Text),
        warehouse_column!("artist_id", SqlType::Text, non_null = true),
        warehouse_column!("year", SqlType::Integer),
        warehouse_column!("duration", SqlType::Float),
    ],
};

pub const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        warehouse_column!("artist_id", SqlType::Text, is_primary_key = true),
        warehouse_column!("name", SqlType::Text),
        warehouse_column!("location", SqlType::Text),
        warehouse_column!("latitude", SqlType::Float),
        warehouse_column!("longitude", SqlType::Float),
    ],
};

pub const TIME_TABLE: Table = Table {
    name: "time",
    columns: &[
        warehouse_column!("start_time", SqlType::Timestamp, is_primary_key = true),
        warehouse_column!("hour", SqlType::Integer, non_null = true),
        warehouse_column!("day", SqlType::Integer, non_null = true),
        warehouse_column!("week", SqlType::Integer, non_null = true),
        warehouse_column!("month", SqlType::Integer, non_null = true),
        warehouse_column!("year", SqlType::Integer, non_null = true),
        warehouse_column!("weekday", SqlType::Integer, non_null = true),
    ],
};

/// Drop and create order.
pub const ALL_TABLES: &[Table] = &[
    STAGING_EVENTS_TABLE,
    STAGING_SONGS_TABLE,
    SONGPLAYS_TABLE,
    USERS_TABLE,
    SONGS_TABLE,
    ARTISTS_TABLE,
    TIME_TABLE,
];

pub fn find_table(name: &str) -> Option<&'static Table> {
    ALL_TABLES.iter().find(|t| t.name == name)
}
