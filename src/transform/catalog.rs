//! Catalog Transform
//!
//! First pipeline stage: reads catalog records and derives the songs and
//! artists dimensions.

use super::{SONG_DATA_GLOB, TABLE_ARTISTS, TABLE_SONGS};
use crate::engine::{QueryEngine, WriteMode, WriteReport};
use crate::error::Result;
use crate::relation::Relation;
use tracing::info;

/// Songs dimension: distinct (song_id, title, artist_id, year, duration)
/// where song_id is non-null
pub fn songs_table(catalog: &Relation) -> Relation {
    catalog
        .where_not_null("song_id")
        .select(&[
            ("song_id", "song_id"),
            ("title", "title"),
            ("artist_id", "artist_id"),
            ("year", "year"),
            ("duration", "duration"),
        ])
        .distinct()
}

/// Artists dimension: distinct (artist_id, name, location, latitude,
/// longitude) where artist_id is non-null
pub fn artists_table(catalog: &Relation) -> Relation {
    catalog
        .where_not_null("artist_id")
        .select(&[
            ("artist_id", "artist_id"),
            ("artist_name", "name"),
            ("artist_location", "location"),
            ("artist_latitude", "latitude"),
            ("artist_longitude", "longitude"),
        ])
        .distinct()
}

/// The catalog stage driver
pub struct CatalogTransform<'a, E: QueryEngine> {
    engine: &'a E,
}

impl<'a, E: QueryEngine> CatalogTransform<'a, E> {
    /// Create the stage against an engine
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// Load catalog records, derive both dimensions, write them
    ///
    /// Songs are partitioned by (year, artist_id); artists are
    /// unpartitioned. Both destinations are fully overwritten.
    pub async fn run(&self) -> Result<Vec<WriteReport>> {
        info!("starting catalog transform");
        let catalog = self.engine.load(SONG_DATA_GLOB).await?;

        let songs = songs_table(&catalog);
        let songs_report = self
            .engine
            .write(&songs, TABLE_SONGS, &["year", "artist_id"], WriteMode::Overwrite)
            .await?;

        let artists = artists_table(&catalog);
        let artists_report = self
            .engine
            .write(&artists, TABLE_ARTISTS, &[], WriteMode::Overwrite)
            .await?;

        info!(
            songs = songs_report.rows,
            artists = artists_report.rows,
            "catalog transform complete"
        );
        Ok(vec![songs_report, artists_report])
    }
}
