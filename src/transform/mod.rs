//! Table derivations and pipeline stages
//!
//! The whole job is five derivations and a partitioned-overwrite layout:
//!
//! | Table       | Derivation                          | Partitioning      |
//! |-------------|-------------------------------------|-------------------|
//! | songs       | distinct catalog projection         | year, artist_id   |
//! | artists     | distinct catalog projection         | none              |
//! | users       | distinct event projection           | none              |
//! | time        | calendar breakdown of event instants| year, month       |
//! | songplays   | events ⋈ catalog on artist name     | year, month       |
//!
//! [`CatalogTransform`] and [`EventTransform`] drive the two stages. They
//! share no state; the event stage re-reads the catalog glob for its join
//! rather than reusing the catalog stage's relation.

mod catalog;
mod events;

pub use catalog::{artists_table, songs_table, CatalogTransform};
pub use events::{
    filter_playback_events, songplays_table, time_table, users_table, EventTransform,
};

/// Glob for catalog record files under the input root
pub const SONG_DATA_GLOB: &str = "song_data/*/*/*/*.json";

/// Glob for event log files under the input root
pub const LOG_DATA_GLOB: &str = "log_data/*.json";

/// Destination directory for the songs dimension
pub const TABLE_SONGS: &str = "table_songs/";

/// Destination directory for the artists dimension
pub const TABLE_ARTISTS: &str = "table_artists/";

/// Destination directory for the users dimension
pub const TABLE_USERS: &str = "table_users/";

/// Destination directory for the time dimension
pub const TABLE_TIMES: &str = "table_times/";

/// Destination directory for the songplays fact table
pub const TABLE_SONGPLAYS: &str = "table_songplays/";

/// Event-type value marking a playback event
pub const PLAYBACK_PAGE: &str = "NextSong";
