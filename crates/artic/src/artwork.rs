use serde::{Deserialize, Serialize};

use pagesel_engine::Item;

/// One artwork record as returned by `/artworks`.
///
/// Only `id` is guaranteed; the API returns `null` for any other field
/// it has no data for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub place_of_origin: Option<String>,
    #[serde(default)]
    pub artist_display: Option<String>,
    #[serde(default)]
    pub inscriptions: Option<String>,
    #[serde(default)]
    pub date_start: Option<i64>,
    #[serde(default)]
    pub date_end: Option<i64>,
}

impl Artwork {
    /// Column headers in display order.
    pub const COLUMNS: [&'static str; 6] = [
        "Title",
        "Place Of Origin",
        "Artist Display",
        "Inscriptions",
        "Start Date",
        "End Date",
    ];

    /// Display values matching [`Self::COLUMNS`]. Missing values are empty.
    pub fn cells(&self) -> [String; 6] {
        fn text(v: &Option<String>) -> String {
            v.as_deref().unwrap_or("").replace('\n', " ")
        }
        fn year(v: &Option<i64>) -> String {
            v.map(|y| y.to_string()).unwrap_or_default()
        }
        [
            text(&self.title),
            text(&self.place_of_origin),
            text(&self.artist_display),
            text(&self.inscriptions),
            year(&self.date_start),
            year(&self.date_end),
        ]
    }
}

impl Item for Artwork {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}
