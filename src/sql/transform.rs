//! INSERT ... SELECT statements that move staging rows into the star schema.

use super::Dialect;

const NEXT_SONG_PAGE: &str = "NextSong";

/// Calendar decomposition of every distinct NextSong timestamp not yet in `time`.
pub fn time_table_insert(dialect: Dialect) -> String {
    let extract = |field: &str| match dialect {
        Dialect::Redshift => format!("EXTRACT({} FROM ts)", field),
        Dialect::Sqlite => {
            let specifier = match field {
                "hour" => "%H",
                "day" => "%d",
                "week" => "%V",
                "month" => "%m",
                "year" => "%Y",
                _ => "%w",
            };
            format!("CAST(strftime('{}', ts) AS INTEGER)", specifier)
        }
    };

    format!(
        "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
SELECT  DISTINCT
        ts AS start_time,
        {} AS hour,
        {} AS day,
        {} AS week,
        {} AS month,
        {} AS year,
        {} AS weekday
FROM staging_events
WHERE page = '{}'
  AND ts IS NOT NULL
  AND NOT EXISTS (SELECT 1 FROM time t WHERE t.start_time = staging_events.ts);",
        extract("hour"),
        extract("day"),
        extract("week"),
        extract("month"),
        extract("year"),
        extract("dow"),
        NEXT_SONG_PAGE
    )
}

/// One row per user, taken from their most recent NextSong event.
pub fn user_table_insert() -> String {
    format!(
        "INSERT INTO users (user_id, first_name, last_name, gender, level)
SELECT  user_id, first_name, last_name, gender, level
FROM (
    SELECT  userId    AS user_id,
            firstName AS first_name,
            lastName  AS last_name,
            gender    AS gender,
            level     AS level,
            ROW_NUMBER() OVER (PARTITION BY userId
                               ORDER BY ts DESC NULLS LAST,
                                        itemInSession DESC NULLS LAST,
                                        level NULLS LAST) AS recency
    FROM staging_events
    WHERE page = '{}'
      AND userId IS NOT NULL
) latest
WHERE recency = 1;",
        NEXT_SONG_PAGE
    )
}

pub fn song_table_insert() -> String {
    "INSERT INTO songs (song_id, title, artist_id, year, duration)
SELECT  DISTINCT
        song_id,
        title,
        artist_id,
        year,
        duration
FROM staging_songs
WHERE song_id IS NOT NULL;"
        .to_string()
}

pub fn artist_table_insert() -> String {
    "INSERT INTO artists (artist_id, name, location, latitude, longitude)
SELECT  DISTINCT
        artist_id,
        artist_name      AS name,
        artist_location  AS location,
        artist_latitude  AS latitude,
        artist_longitude AS longitude
FROM staging_songs
WHERE artist_id IS NOT NULL;"
        .to_string()
}

/// Events are matched to the catalog by exact title and artist name. Events
/// whose text differs in any way (case, whitespace) produce no fact row, nor
/// do plays without a user.
pub fn songplay_table_insert() -> String {
    format!(
        "INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
SELECT  eve.ts        AS start_time,
        eve.userId    AS user_id,
        eve.level     AS level,
        son.song_id   AS song_id,
        son.artist_id AS artist_id,
        eve.sessionId AS session_id,
        eve.location  AS location,
        eve.userAgent AS user_agent
FROM staging_events eve
INNER JOIN (
    SELECT s.song_id, s.artist_id, s.title, a.name
    FROM songs s
    JOIN artists a ON s.artist_id = a.artist_id
    WHERE s.song_id IS NOT NULL AND a.artist_id IS NOT NULL
) son ON eve.song = son.title AND eve.artist = son.name
WHERE eve.page = '{}'
  AND eve.userId IS NOT NULL;",
        NEXT_SONG_PAGE
    )
}

/// Number of users seen with more than one subscription level.
pub fn user_level_conflicts_query() -> String {
    format!(
        "SELECT COUNT(*) FROM (
    SELECT userId
    FROM staging_events
    WHERE page = '{}' AND userId IS NOT NULL
    GROUP BY userId
    HAVING COUNT(DISTINCT level) > 1
) conflicted;",
        NEXT_SONG_PAGE
    )
}

pub fn row_count_query(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {};", table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_insert_uses_dialect_extraction() {
        let redshift = time_table_insert(Dialect::Redshift);
        assert!(redshift.contains("EXTRACT(week FROM ts) AS week"));
        assert!(redshift.contains("EXTRACT(dow FROM ts) AS weekday"));

        let sqlite = time_table_insert(Dialect::Sqlite);
        assert!(sqlite.contains("CAST(strftime('%V', ts) AS INTEGER) AS week"));
        assert!(sqlite.contains("CAST(strftime('%w', ts) AS INTEGER) AS weekday"));
        assert!(!sqlite.contains("EXTRACT"));
    }

    #[test]
    fn time_insert_is_guarded_by_primary_key() {
        let sql = time_table_insert(Dialect::Redshift);
        assert!(sql.contains("NOT EXISTS (SELECT 1 FROM time t"));
        assert!(sql.contains("WHERE page = 'NextSong'"));
    }

    #[test]
    fn user_insert_breaks_timestamp_ties() {
        let sql = user_table_insert();
        assert!(sql.contains("ORDER BY ts DESC NULLS LAST,"));
        assert!(sql.contains("itemInSession DESC NULLS LAST,"));
        assert!(sql.contains("level NULLS LAST) AS recency"));
        assert!(sql.contains("WHERE recency = 1"));
    }

    #[test]
    fn songplay_insert_matches_on_title_and_artist_name() {
        let sql = songplay_table_insert();
        assert!(sql.contains("ON eve.song = son.title AND eve.artist = son.name"));
        assert!(sql.contains("INNER JOIN"));
        assert!(sql.contains("AND eve.userId IS NOT NULL"));
    }
}
