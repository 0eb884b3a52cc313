//! Exports catalog entries as Tachiyomi series folders.

use crate::anilist::CatalogSource;
use crate::error::{AnilistError, ExportError};
use crate::tachiyomi::{TachiyomiEntry, write_details};
use crate::utils::sanitize_dir_name;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

/// Why a single id failed to export.
#[derive(Error, Debug)]
pub enum ExportFailure {
    #[error(transparent)]
    Catalog(#[from] AnilistError),

    #[error(transparent)]
    Write(#[from] ExportError),
}

/// A series folder that was written.
#[derive(Debug, Clone)]
pub struct ExportedSeries {
    pub id: u64,
    pub entry: TachiyomiEntry,
    pub details_path: PathBuf,
}

impl ExportedSeries {
    /// One-line report: title, status and where it went.
    pub fn summary(&self) -> String {
        format!(
            "{} [{}] -> {}",
            self.entry.title,
            self.entry.status.label(),
            self.details_path.display()
        )
    }
}

/// Writes `<output>/<title>/details.json` for catalog ids.
///
/// When two ids in one run share a title, the later one goes to
/// `<title> [<id>]`. An existing folder from an earlier run is overwritten.
pub struct Exporter<'a> {
    source: &'a dyn CatalogSource,
    output_dir: PathBuf,
    prefer_english: bool,
    /// Folder name -> id that wrote it during this run.
    claimed: Mutex<HashMap<String, u64>>,
}

impl<'a> Exporter<'a> {
    pub fn new(source: &'a dyn CatalogSource, output_dir: PathBuf, prefer_english: bool) -> Self {
        Self {
            source,
            output_dir,
            prefer_english,
            claimed: Mutex::new(HashMap::new()),
        }
    }

    /// Fetches one id and writes its folder.
    pub async fn export(&self, id: u64) -> Result<ExportedSeries, ExportFailure> {
        let media = self.source.media(id).await?;
        let entry = TachiyomiEntry::from_media(&media, self.prefer_english);

        let series_dir = self.output_dir.join(self.claim_dir_name(id, &entry.title));
        let details_path = write_details(&series_dir, &entry)?;

        Ok(ExportedSeries {
            id,
            entry,
            details_path,
        })
    }

    /// Picks the folder name for `id`, suffixing the id on a title clash.
    fn claim_dir_name(&self, id: u64, title: &str) -> String {
        let base = sanitize_dir_name(title);
        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());

        let name = match claimed.get(&base) {
            Some(&owner) if owner != id => format!("{} [{}]", base, id),
            _ => base,
        };
        claimed.insert(name.clone(), id);
        name
    }

    /// Exports ids one after another; one failure doesn't stop the rest.
    ///
    /// Results come back in input order.
    pub async fn export_all(&self, ids: &[u64]) -> Vec<(u64, Result<ExportedSeries, ExportFailure>)> {
        stream::iter(ids.iter().copied())
            .then(|id| async move { (id, self.export(id).await) })
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anilist::model::tests::SEARCH_FIXTURE;
    use crate::anilist::{Media, Paginated, PaginatedMedia};
    use crate::tachiyomi::{DETAILS_FILENAME, TachiyomiStatus, read_details};
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Serves the search fixture without touching the network.
    struct FixtureCatalog {
        page: Paginated<Media>,
        extra: Vec<Media>,
    }

    impl FixtureCatalog {
        fn new() -> Self {
            let response: PaginatedMedia = serde_json::from_str(SEARCH_FIXTURE).unwrap();
            Self {
                page: response.into_data().unwrap(),
                extra: Vec::new(),
            }
        }

        /// Adds a copy of `source_id` under a new id, same titles.
        fn with_namesake(mut self, source_id: u64, new_id: u64) -> Self {
            let mut twin = self
                .page
                .media()
                .iter()
                .find(|m| m.id == source_id)
                .cloned()
                .unwrap();
            twin.id = new_id;
            self.extra.push(twin);
            self
        }
    }

    #[async_trait]
    impl CatalogSource for FixtureCatalog {
        fn name(&self) -> &'static str {
            "Fixture"
        }

        async fn search(
            &self,
            _query: &str,
            _page: u32,
            _per_page: u32,
        ) -> Result<Paginated<Media>, AnilistError> {
            Ok(self.page.clone())
        }

        async fn media(&self, id: u64) -> Result<Media, AnilistError> {
            self.page
                .media()
                .iter()
                .chain(self.extra.iter())
                .find(|m| m.id == id)
                .cloned()
                .ok_or(AnilistError::NotFound(id))
        }
    }

    #[tokio::test]
    async fn test_export_writes_series_folder() {
        let dir = TempDir::new().unwrap();
        let catalog = FixtureCatalog::new();
        let exporter = Exporter::new(&catalog, dir.path().to_path_buf(), true);

        let exported = exporter.export(30013).await.unwrap();
        assert_eq!(
            exported.details_path,
            dir.path().join("One Piece").join(DETAILS_FILENAME)
        );

        let entry = read_details(&exported.details_path).unwrap();
        assert_eq!(entry.title, "One Piece");
        assert_eq!(entry.status, TachiyomiStatus::Ongoing);
    }

    #[tokio::test]
    async fn test_export_sanitizes_folder_name() {
        let dir = TempDir::new().unwrap();
        let catalog = FixtureCatalog::new();
        let exporter = Exporter::new(&catalog, dir.path().to_path_buf(), false);

        let exported = exporter.export(86635).await.unwrap();
        assert_eq!(
            exported.details_path,
            dir.path()
                .join("Kimetsu no Yaiba_ Tokubetsu Yomikiri")
                .join(DETAILS_FILENAME)
        );
    }

    #[tokio::test]
    async fn test_export_all_keeps_going_after_failure() {
        let dir = TempDir::new().unwrap();
        let catalog = FixtureCatalog::new();
        let exporter = Exporter::new(&catalog, dir.path().to_path_buf(), true);

        let results = exporter.export_all(&[1, 30013]).await;
        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[0],
            (1, Err(ExportFailure::Catalog(AnilistError::NotFound(1))))
        ));
        assert!(matches!(results[1], (30013, Ok(_))));
    }

    #[tokio::test]
    async fn test_shared_title_gets_id_suffix() {
        let dir = TempDir::new().unwrap();
        let catalog = FixtureCatalog::new().with_namesake(30013, 777);
        let exporter = Exporter::new(&catalog, dir.path().to_path_buf(), true);

        let first = exporter.export(30013).await.unwrap();
        let second = exporter.export(777).await.unwrap();

        assert_eq!(
            first.details_path,
            dir.path().join("One Piece").join(DETAILS_FILENAME)
        );
        assert_eq!(
            second.details_path,
            dir.path().join("One Piece [777]").join(DETAILS_FILENAME)
        );
        // Both files survive
        assert!(read_details(&first.details_path).is_ok());
        assert!(read_details(&second.details_path).is_ok());
    }

    #[tokio::test]
    async fn test_same_id_twice_reuses_folder() {
        let dir = TempDir::new().unwrap();
        let catalog = FixtureCatalog::new();
        let exporter = Exporter::new(&catalog, dir.path().to_path_buf(), true);

        let first = exporter.export(30013).await.unwrap();
        let again = exporter.export(30013).await.unwrap();
        assert_eq!(first.details_path, again.details_path);
    }

    #[tokio::test]
    async fn test_summary_line() {
        let dir = TempDir::new().unwrap();
        let catalog = FixtureCatalog::new();
        let exporter = Exporter::new(&catalog, dir.path().to_path_buf(), true);

        let exported = exporter.export(86635).await.unwrap();
        let summary = exported.summary();
        assert!(summary.starts_with("Kimetsu no Yaiba: Tokubetsu Yomikiri [Completed] -> "));
        assert!(summary.ends_with(DETAILS_FILENAME));
    }
}
