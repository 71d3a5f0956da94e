mod table;
mod tables;

pub use table::{Column, SqlType, Table};
pub use tables::{
    find_table, ALL_TABLES, ARTISTS_TABLE, SONGPLAYS_TABLE, SONGS_TABLE, STAGING_EVENTS_TABLE,
    STAGING_SONGS_TABLE, TIME_TABLE, USERS_TABLE,
};
