//! HTTP client for the AniList GraphQL endpoint.

use super::model::{Media, Paginated, PaginatedMedia, Response, SingleMedia};
use super::CatalogSource;
use crate::config::AnilistConfig;
use crate::error::AnilistError;
use crate::utils::{decode_graphql_response, rate_limit};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Largest page size AniList accepts.
pub const MAX_PER_PAGE: u32 = 50;

/// Fields requested for every media entry.
const MEDIA_FIELDS: &str = r#"
    id
    coverImage { extraLarge }
    description
    format
    genres
    staff { edges { node { id name { full } } role } }
    status
    title { english romaji }
"#;

/// GraphQL request body.
#[derive(Debug, Serialize)]
struct GraphqlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchVariables<'a> {
    search: &'a str,
    page: u32,
    per_page: u32,
}

#[derive(Debug, Serialize)]
struct MediaVariables {
    id: u64,
}

/// AniList catalog client.
pub struct AnilistClient {
    client: Client,
    config: AnilistConfig,
}

impl AnilistClient {
    /// Creates a client for the configured endpoint.
    pub fn new(config: AnilistConfig) -> Result<Self, AnilistError> {
        Self::from_builder(Client::builder(), config)
    }

    fn from_builder(builder: ClientBuilder, config: AnilistConfig) -> Result<Self, AnilistError> {
        let client = builder
            .user_agent(concat!("tachimeta/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }

    fn search_query() -> String {
        format!(
            r#"query ($search: String, $page: Int, $perPage: Int) {{
  Page(page: $page, perPage: $perPage) {{
    pageInfo {{ total currentPage lastPage perPage hasNextPage }}
    media(search: $search, type: MANGA) {{ {MEDIA_FIELDS} }}
  }}
}}"#
        )
    }

    fn media_query() -> String {
        format!(
            r#"query ($id: Int) {{
  Media(id: $id, type: MANGA) {{ {MEDIA_FIELDS} }}
}}"#
        )
    }

    /// Sends one GraphQL query and decodes the envelope.
    async fn post<V, T>(&self, query: &str, variables: V) -> Result<Response<T>, AnilistError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        rate_limit(self.config.delay_between_requests_sec).await;

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Accept", "application/json")
            .json(&GraphqlRequest { query, variables })
            .send()
            .await?;

        decode_graphql_response(response).await
    }
}

#[async_trait]
impl CatalogSource for AnilistClient {
    fn name(&self) -> &'static str {
        "AniList"
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Paginated<Media>, AnilistError> {
        let variables = SearchVariables {
            search: query,
            page: page.max(1),
            per_page: clamp_per_page(per_page),
        };

        let response: PaginatedMedia = self.post(&Self::search_query(), variables).await?;
        let page = response.into_data()?;
        for media in page.media() {
            media.validate()?;
        }
        Ok(page)
    }

    async fn media(&self, id: u64) -> Result<Media, AnilistError> {
        let response: Response<SingleMedia> =
            self.post(&Self::media_query(), MediaVariables { id }).await?;

        // AniList answers an unknown id with HTTP 404 and a matching error entry
        let media = match response.into_data() {
            Ok(single) => single.media,
            Err(AnilistError::Api(message)) if message.contains("(404)") => None,
            Err(e) => return Err(e),
        }
        .ok_or(AnilistError::NotFound(id))?;

        media.validate()?;
        Ok(media)
    }
}

/// Keeps a requested page size inside what AniList accepts.
pub fn clamp_per_page(per_page: u32) -> u32 {
    per_page.clamp(1, MAX_PER_PAGE)
}
