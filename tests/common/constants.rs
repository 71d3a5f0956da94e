//! Shared constants for end-to-end tests

// ============================================================================
// Catalog
// ============================================================================

pub const SONG_1_ID: &str = "S1";
pub const SONG_1_TITLE: &str = "Test Song";

pub const ARTIST_1_ID: &str = "A1";
pub const ARTIST_1_NAME: &str = "Test Artist";

// ============================================================================
// Events
// ============================================================================

pub const USER_ID: i64 = 7;

/// 2021-01-01 10:00:00 UTC
pub const FIRST_PLAY_TS: i64 = 1_609_495_200_000;
pub const FIRST_PLAY_TIME: &str = "2021-01-01 10:00:00";

/// 2021-01-01 10:05:00 UTC
pub const SECOND_PLAY_TS: i64 = 1_609_495_500_000;
