use serde::{Deserialize, Serialize};

/// One title's daily box office record
///
/// `genre` is empty until the detail lookup fills it in; enrichment produces
/// a new value through [`BoxOfficeEntry::with_genre`] rather than mutating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BoxOfficeEntry {
    /// Provider movie code, empty when the upstream omitted it
    pub movie_code: String,
    pub title: String,
    /// Opening date as reported upstream
    pub open_date: String,
    pub country_name: String,
    /// Comma-joined genre names
    pub genre: String,
}

impl BoxOfficeEntry {
    pub fn with_genre(self, genre: String) -> Self {
        Self { genre, ..self }
    }

    pub fn has_movie_code(&self) -> bool {
        !self.movie_code.is_empty()
    }

    /// True when any tag occurs verbatim in the title
    pub fn title_matches_any(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| self.title.contains(tag.as_str()))
    }
}

/// Genre information resolved from the movie detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MovieDetail {
    pub genre: String,
}

/// Response body for the movie endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieListResponse {
    pub movies: Vec<BoxOfficeEntry>,
}

impl From<Vec<BoxOfficeEntry>> for MovieListResponse {
    fn from(movies: Vec<BoxOfficeEntry>) -> Self {
        Self { movies }
    }
}

// ============================================================================
// KOBIS API Types
// ============================================================================

/// One element of `boxOfficeResult.dailyBoxOfficeList`
///
/// Every field is optional upstream; absent or null values become empty strings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct KobisBoxOfficeItem {
    pub movie_cd: Option<String>,
    pub movie_nm: Option<String>,
    pub open_dt: Option<String>,
    pub rep_nation_nm: Option<String>,
    pub genre_alt: Option<String>,
}

impl From<KobisBoxOfficeItem> for BoxOfficeEntry {
    fn from(item: KobisBoxOfficeItem) -> Self {
        BoxOfficeEntry {
            movie_code: item.movie_cd.unwrap_or_default(),
            title: item.movie_nm.unwrap_or_default(),
            open_date: item.open_dt.unwrap_or_default(),
            country_name: item.rep_nation_nm.unwrap_or_default(),
            genre: item.genre_alt.unwrap_or_default(),
        }
    }
}

/// `movieInfoResult.movieInfo` from the movie detail endpoint
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct KobisMovieInfo {
    pub genres: Option<Vec<KobisGenre>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct KobisGenre {
    pub genre_nm: Option<String>,
}

impl From<KobisMovieInfo> for MovieDetail {
    fn from(info: KobisMovieInfo) -> Self {
        let genre = info
            .genres
            .unwrap_or_default()
            .into_iter()
            .map(|g| g.genre_nm.unwrap_or_default())
            .collect::<Vec<_>>()
            .join(", ");

        MovieDetail { genre }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, title: &str) -> BoxOfficeEntry {
        BoxOfficeEntry {
            movie_code: code.to_string(),
            title: title.to_string(),
            open_date: "2019-05-30".to_string(),
            country_name: "한국".to_string(),
            genre: String::new(),
        }
    }

    #[test]
    fn test_with_genre_keeps_other_fields() {
        let original = entry("20183782", "기생충");
        let enriched = original.clone().with_genre("드라마".to_string());

        assert_eq!(enriched.genre, "드라마");
        assert_eq!(enriched.movie_code, original.movie_code);
        assert_eq!(enriched.title, original.title);
        assert!(original.genre.is_empty());
    }

    #[test]
    fn test_has_movie_code() {
        assert!(entry("20183782", "Parasite").has_movie_code());
        assert!(!entry("", "Parasite").has_movie_code());
        // only an empty code is missing; blanks still go to the provider
        assert!(entry("  ", "Parasite").has_movie_code());
    }

    #[test]
    fn test_title_matches_any_is_case_sensitive() {
        let movie = entry("1", "Parasite 2");
        assert!(movie.title_matches_any(&["Parasite".to_string()]));
        assert!(!movie.title_matches_any(&["parasite".to_string()]));
        assert!(!movie.title_matches_any(&[]));
    }

    #[test]
    fn test_empty_title_never_matches_non_empty_tag() {
        let movie = entry("1", "");
        assert!(!movie.title_matches_any(&["Action".to_string()]));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(entry("1", "Parasite")).unwrap();
        assert_eq!(json["movieCode"], "1");
        assert_eq!(json["openDate"], "2019-05-30");
        assert_eq!(json["countryName"], "한국");
        assert_eq!(json["genre"], "");
    }

    #[test]
    fn test_box_office_item_defaults_missing_fields() {
        let item: KobisBoxOfficeItem =
            serde_json::from_str(r#"{"movieNm": "Parasite", "openDt": null}"#).unwrap();
        let entry = BoxOfficeEntry::from(item);

        assert_eq!(entry.title, "Parasite");
        assert_eq!(entry.movie_code, "");
        assert_eq!(entry.open_date, "");
        assert_eq!(entry.genre, "");
    }

    #[test]
    fn test_movie_info_joins_genres() {
        let info: KobisMovieInfo = serde_json::from_str(
            r#"{"genres": [{"genreNm": "Drama"}, {"genreNm": "Action"}]}"#,
        )
        .unwrap();
        assert_eq!(MovieDetail::from(info).genre, "Drama, Action");
    }

    #[test]
    fn test_movie_info_without_genres_is_empty() {
        let info: KobisMovieInfo = serde_json::from_str(r#"{"movieNm": "x"}"#).unwrap();
        assert_eq!(MovieDetail::from(info).genre, "");

        let info: KobisMovieInfo = serde_json::from_str(r#"{"genres": []}"#).unwrap();
        assert_eq!(MovieDetail::from(info).genre, "");
    }
}
