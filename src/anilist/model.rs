//! Response shapes of the AniList GraphQL API.
//!
//! These mirror the fields requested by [`super::client`] and nothing
//! more. Status and format are closed enums, so an unexpected value from
//! the API fails deserialization instead of leaking through.

use crate::error::AnilistError;
use serde::Deserialize;
use std::collections::HashMap;

/// Staff roles credited as story work.
const STORY_ROLES: &[&str] = &["Story", "Story & Art", "Original Creator", "Original Story"];

/// Staff roles credited as art work.
const ART_ROLES: &[&str] = &["Art", "Story & Art", "Illustration"];

/// Top-level GraphQL envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Response<T> {
    /// Payload; `null` when the query failed.
    pub data: Option<T>,

    /// GraphQL errors reported alongside (or instead of) the payload.
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

/// A single entry of the GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
}

impl<T> Response<T> {
    /// Unwraps the payload, turning reported errors into [`AnilistError::Api`].
    pub fn into_data(self) -> Result<T, AnilistError> {
        if !self.errors.is_empty() {
            let messages: Vec<String> = self
                .errors
                .iter()
                .map(|e| match e.status {
                    Some(status) => format!("{} ({})", e.message, status),
                    None => e.message.clone(),
                })
                .collect();
            return Err(AnilistError::Api(messages.join("; ")));
        }

        self.data
            .ok_or_else(|| AnilistError::Api("response contained no data".to_string()))
    }
}

/// `{ "Page": { <key>: [T], "pageInfo": {..} } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    #[serde(rename = "Page")]
    pub page: Page<T>,
}

/// Body of a `Page` query. The list key depends on the query.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(rename = "pageInfo", default)]
    pub page_info: Option<PageInfo>,

    #[serde(flatten)]
    lists: HashMap<String, Vec<T>>,
}

/// Pagination metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub last_page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub has_next_page: bool,
}

impl<T> Paginated<T> {
    /// Returns the items listed under `key`, or an empty slice.
    pub fn items(&self, key: &str) -> &[T] {
        self.page.lists.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Takes ownership of the items under `key`.
    pub fn into_items(mut self, key: &str) -> Vec<T> {
        self.page.lists.remove(key).unwrap_or_default()
    }

    pub fn page_info(&self) -> Option<&PageInfo> {
        self.page.page_info.as_ref()
    }

    /// Page number to request next, if the API reports one.
    ///
    /// `requested` stands in when `currentPage` wasn't returned. There is
    /// no page after `u32::MAX`.
    pub fn next_page(&self, requested: u32) -> Option<u32> {
        let info = self.page_info().filter(|info| info.has_next_page)?;
        info.current_page.unwrap_or(requested).checked_add(1)
    }
}

impl Paginated<Media> {
    pub fn media(&self) -> &[Media] {
        self.items("media")
    }
}

/// A media page as returned by the search query.
pub type PaginatedMedia = Response<Paginated<Media>>;

/// `{ "Media": {..} }` as returned by a lookup by id.
#[derive(Debug, Clone, Deserialize)]
pub struct SingleMedia {
    #[serde(rename = "Media")]
    pub media: Option<Media>,
}

/// Publication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaStatus {
    Finished,
    Releasing,
    NotYetReleased,
    Cancelled,
    Hiatus,
}

impl MediaStatus {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            MediaStatus::Finished => "Finished",
            MediaStatus::Releasing => "Releasing",
            MediaStatus::NotYetReleased => "Not yet released",
            MediaStatus::Cancelled => "Cancelled",
            MediaStatus::Hiatus => "Hiatus",
        }
    }
}

/// Media format. Only manga formats are queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaFormat {
    Manga,
    OneShot,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    pub extra_large: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaTitle {
    #[serde(default)]
    pub english: Option<String>,
    pub romaji: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonName {
    pub full: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: PersonName,
}

/// A staff credit: a person and their free-text role.
#[derive(Debug, Clone, Deserialize)]
pub struct StaffEdge {
    pub node: Person,
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Staff {
    #[serde(default)]
    pub edges: Vec<StaffEdge>,
}

/// One catalog entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: u64,
    pub cover_image: CoverImage,
    #[serde(default)]
    pub description: Option<String>,
    pub format: MediaFormat,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub staff: Staff,
    pub status: MediaStatus,
    pub title: MediaTitle,
}

impl Media {
    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), AnilistError> {
        if self.title.romaji.trim().is_empty() {
            return Err(AnilistError::InvalidMedia {
                id: self.id,
                message: "romaji title is empty".to_string(),
            });
        }
        Ok(())
    }

    /// English title when preferred and available, romaji otherwise.
    pub fn display_title(&self, prefer_english: bool) -> &str {
        if prefer_english {
            if let Some(english) = self.title.english.as_deref() {
                if !english.trim().is_empty() {
                    return english;
                }
            }
        }
        &self.title.romaji
    }

    /// Staff credited for the story.
    pub fn authors(&self) -> Vec<&str> {
        self.staff_with_roles(STORY_ROLES)
    }

    /// Staff credited for the art.
    pub fn artists(&self) -> Vec<&str> {
        self.staff_with_roles(ART_ROLES)
    }

    fn staff_with_roles(&self, roles: &[&str]) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for edge in &self.staff.edges {
            // "Story (vol. 1-3)" counts as "Story"
            let base = edge.role.split('(').next().unwrap_or(&edge.role).trim();
            if !roles.contains(&base) {
                continue;
            }
            let name = edge.node.name.full.as_str();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SEARCH_FIXTURE: &str = r#"{
      "data": {
        "Page": {
          "pageInfo": { "total": 2, "currentPage": 1, "lastPage": 1, "perPage": 10, "hasNextPage": false },
          "media": [
            {
              "id": 30013,
              "coverImage": { "extraLarge": "https://s4.anilist.co/file/anilistcdn/media/manga/cover/large/bx30013.jpg" },
              "description": "Gol D. Roger was known as the Pirate King.<br><br>\nMonkey D. Luffy &amp; friends set sail.",
              "format": "MANGA",
              "genres": ["Action", "Adventure", "Comedy"],
              "staff": {
                "edges": [
                  { "node": { "id": 96881, "name": { "full": "Eiichiro Oda" } }, "role": "Story & Art" },
                  { "node": { "id": 110000, "name": { "full": "Stephen Paul" } }, "role": "Translator (English)" }
                ]
              },
              "status": "RELEASING",
              "title": { "english": "One Piece", "romaji": "ONE PIECE" }
            },
            {
              "id": 86635,
              "coverImage": { "extraLarge": "https://example.org/cover.jpg" },
              "format": "ONE_SHOT",
              "genres": [],
              "staff": { "edges": [] },
              "status": "FINISHED",
              "title": { "english": null, "romaji": "Kimetsu no Yaiba: Tokubetsu Yomikiri" }
            }
          ]
        }
      }
    }"#;

    fn media_with_staff(edges: &[(&str, &str)]) -> Media {
        let edges: Vec<serde_json::Value> = edges
            .iter()
            .enumerate()
            .map(|(i, (name, role))| {
                serde_json::json!({ "node": { "id": i, "name": { "full": name } }, "role": role })
            })
            .collect();
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "coverImage": { "extraLarge": "" },
            "format": "MANGA",
            "genres": [],
            "staff": { "edges": edges },
            "status": "FINISHED",
            "title": { "romaji": "Title" }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_search_page() {
        let response: PaginatedMedia = serde_json::from_str(SEARCH_FIXTURE).unwrap();
        let page = response.into_data().unwrap();

        let media = page.media();
        assert_eq!(media.len(), 2);
        for entry in media {
            assert!(entry.validate().is_ok());
            assert!(!entry.title.romaji.is_empty());
        }
        assert_eq!(media[0].status, MediaStatus::Releasing);
        assert_eq!(media[1].format, MediaFormat::OneShot);
        assert!(media[1].title.english.is_none());
        assert!(!page.page_info().unwrap().has_next_page);
    }

    #[test]
    fn test_next_page() {
        let last: PaginatedMedia = serde_json::from_str(SEARCH_FIXTURE).unwrap();
        assert_eq!(last.into_data().unwrap().next_page(1), None);

        let more: PaginatedMedia = serde_json::from_str(
            r#"{"data":{"Page":{"pageInfo":{"currentPage":3,"hasNextPage":true},"media":[]}}}"#,
        )
        .unwrap();
        assert_eq!(more.into_data().unwrap().next_page(1), Some(4));

        let no_current: PaginatedMedia = serde_json::from_str(
            r#"{"data":{"Page":{"pageInfo":{"hasNextPage":true},"media":[]}}}"#,
        )
        .unwrap();
        let page = no_current.into_data().unwrap();
        assert_eq!(page.next_page(7), Some(8));
        assert_eq!(page.next_page(u32::MAX), None);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let json = SEARCH_FIXTURE.replace("\"RELEASING\"", "\"ON_BREAK\"");
        assert!(serde_json::from_str::<PaginatedMedia>(&json).is_err());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let json = SEARCH_FIXTURE.replace("\"ONE_SHOT\"", "\"NOVEL\"");
        assert!(serde_json::from_str::<PaginatedMedia>(&json).is_err());
    }

    #[test]
    fn test_missing_list_key_is_empty() {
        let response: PaginatedMedia =
            serde_json::from_str(r#"{"data":{"Page":{"characters":[]}}}"#).unwrap();
        let page = response.into_data().unwrap();
        assert!(page.media().is_empty());
        assert!(page.page_info().is_none());
    }

    #[test]
    fn test_graphql_errors_surface() {
        let response: PaginatedMedia = serde_json::from_str(
            r#"{"data":null,"errors":[{"message":"Too Many Requests.","status":429}]}"#,
        )
        .unwrap();
        let err = response.into_data().unwrap_err();
        assert!(err.to_string().contains("Too Many Requests. (429)"));
    }

    #[test]
    fn test_empty_romaji_invalid() {
        let mut media = media_with_staff(&[]);
        media.title.romaji = "  ".to_string();
        assert!(matches!(
            media.validate(),
            Err(AnilistError::InvalidMedia { id: 1, .. })
        ));
    }

    #[test]
    fn test_display_title() {
        let response: PaginatedMedia = serde_json::from_str(SEARCH_FIXTURE).unwrap();
        let page = response.into_data().unwrap();
        let media = page.media();

        assert_eq!(media[0].display_title(true), "One Piece");
        assert_eq!(media[0].display_title(false), "ONE PIECE");
        // No english title falls back to romaji
        assert_eq!(
            media[1].display_title(true),
            "Kimetsu no Yaiba: Tokubetsu Yomikiri"
        );
    }

    #[test]
    fn test_staff_roles() {
        let media = media_with_staff(&[
            ("Tsugumi Ohba", "Story"),
            ("Takeshi Obata", "Art"),
            ("Tsugumi Ohba", "Original Story (vol. 1)"),
            ("Someone Else", "Assistant"),
        ]);
        assert_eq!(media.authors(), vec!["Tsugumi Ohba"]);
        assert_eq!(media.artists(), vec!["Takeshi Obata"]);

        let solo = media_with_staff(&[("Eiichiro Oda", "Story & Art")]);
        assert_eq!(solo.authors(), vec!["Eiichiro Oda"]);
        assert_eq!(solo.artists(), vec!["Eiichiro Oda"]);
    }
}
