//! Catalog providers.
//!
//! Each provider implements [`MangaSource`]; callers hold a
//! `&dyn MangaSource` and stay independent of which catalog backs it.

pub mod mangadex;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Chapter, Manga};

/// A remote catalog that can resolve works, chapter feeds and page links.
#[async_trait]
pub trait MangaSource: Send + Sync {
    /// Tag identifying this provider, recorded on the records it produces
    fn provider(&self) -> &'static str;

    /// Search the catalog by title and return the best match.
    async fn search_manga(&self, title: &str) -> Result<Manga>;

    /// Fetch every chapter of a work, following pagination to the end.
    async fn fetch_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>>;

    /// Resolve the download links for one chapter.
    async fn fetch_chapter_links(&self, chapter_id: &str) -> Result<ChapterLinks>;
}

/// Download links for a single chapter. Fetched right before downloading
/// and never persisted; the catalog rotates the hosts they point at.
#[derive(Debug, Clone)]
pub struct ChapterLinks {
    pub base_url: String,
    /// Content-hash path segment for this chapter's files
    pub hash: String,
    /// Full quality page file names
    pub data: Vec<String>,
    /// Reduced quality variants of the same pages
    pub data_saver: Vec<String>,
}

impl ChapterLinks {
    /// URL prefix the page file names are appended to
    pub fn page_url_prefix(&self, data_saver: bool) -> String {
        let quality = if data_saver { "data-saver" } else { "data" };
        format!("{}/{}/{}/", self.base_url, quality, self.hash)
    }

    /// Page file names for the chosen quality
    pub fn links(&self, data_saver: bool) -> &[String] {
        if data_saver {
            &self.data_saver
        } else {
            &self.data
        }
    }
}
