//! Chapter download engine.
//!
//! Page bodies land in a scratch directory first and overwrite the
//! destination on success. A page whose recorded hash still matches the
//! file on disk is skipped without a request, which is what makes re-runs
//! cheap and interrupted chapters resumable.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::hash;
use crate::helpers::{link_extension, sanitize_filename};
use crate::http_client::HttpClient;
use crate::models::{Chapter, Manga, Page, Volume};
use crate::sources::MangaSource;

/// Downloads chapters through a catalog provider into a local directory
/// tree laid out as `<root>/<volume>/<chapter>/<page>`.
pub struct Downloader<'a> {
    source: &'a dyn MangaSource,
    http: HttpClient,
    root: PathBuf,
}

impl<'a> Downloader<'a> {
    pub fn new(source: &'a dyn MangaSource, http: HttpClient, root: impl Into<PathBuf>) -> Self {
        Self {
            source,
            http,
            root: root.into(),
        }
    }

    /// Download every page of one chapter, named `0001.<ext>` onward.
    /// Pages whose recorded hash matches the file already on disk are
    /// skipped; the first unrecoverable page error aborts the chapter.
    pub async fn download_chapter(&self, chapter: &mut Chapter, data_saver: bool) -> Result<()> {
        let links = self.source.fetch_chapter_links(&chapter.id).await?;
        let url_prefix = links.page_url_prefix(data_saver);
        let page_links = links.links(data_saver);

        let chapter_dir = self
            .root
            .join(sanitize_filename(&chapter.volume))
            .join(sanitize_filename(&chapter.chapter));
        fs::create_dir_all(&chapter_dir).map_err(|e| Error::filesystem(&chapter_dir, e))?;

        // Removed on drop no matter how this function returns.
        let scratch = TempDir::new().map_err(|e| Error::filesystem(std::env::temp_dir(), e))?;

        // The declared page count is advisory; once the chapter is being
        // downloaded the link list is ground truth.
        while chapter.pages.len() < page_links.len() {
            chapter.pages.push(Page::new(chapter.pages.len()));
        }
        chapter.pages.truncate(page_links.len());

        for (i, link) in page_links.iter().enumerate() {
            let file_name = format!("{:04}{}", i + 1, link_extension(link));
            let dest = chapter_dir.join(&file_name);

            if self.page_is_current(&chapter.pages[i], &dest) {
                log::info!("Page {} of {} unchanged, skipping", file_name, chapter.chapter);
                continue;
            }

            let url = format!("{}{}", url_prefix, link);
            self.fetch_page(&url, &dest, scratch.path(), &mut chapter.pages[i], &file_name)
                .await
                .map_err(|e| {
                    Error::download_failed(format!("page {} of {}", file_name, chapter.chapter), e)
                })?;
        }

        chapter.download_path = Some(chapter_dir.to_string_lossy().into_owned());
        log::info!("Downloaded {} to {}", chapter.chapter, chapter_dir.display());
        Ok(())
    }

    /// A page is current when its record has a hash and the file on disk
    /// still hashes to it. Any read failure counts as stale.
    fn page_is_current(&self, page: &Page, dest: &Path) -> bool {
        if page.hash.is_empty() {
            return false;
        }
        match File::open(dest).and_then(hash::hash_reader) {
            Ok(found) => found == page.hash,
            Err(_) => false,
        }
    }

    async fn fetch_page(
        &self,
        url: &str,
        dest: &Path,
        scratch: &Path,
        page: &mut Page,
        file_name: &str,
    ) -> Result<()> {
        let body = self.http.download_bytes(url).await?;
        let checksum = hash::hash_bytes(&body);

        // Stage in scratch, then overwrite the destination.
        let staged = scratch.join(file_name);
        fs::write(&staged, &body).map_err(|e| Error::filesystem(&staged, e))?;
        fs::copy(&staged, dest).map_err(|e| Error::filesystem(dest, e))?;

        page.hash = checksum;
        page.file_name = file_name.to_string();
        Ok(())
    }
}

impl Chapter {
    /// Download this chapter through the given downloader.
    pub async fn download(&mut self, downloader: &Downloader<'_>, data_saver: bool) -> Result<()> {
        downloader.download_chapter(self, data_saver).await
    }
}

impl Volume {
    /// Download every chapter in order. The first failure aborts the rest.
    pub async fn download(&mut self, downloader: &Downloader<'_>) -> Result<()> {
        for chapter in &mut self.chapters {
            let label = chapter.chapter.clone();
            chapter
                .download(downloader, false)
                .await
                .map_err(|e| Error::download_failed(format!("chapter {}", label), e))?;
        }
        Ok(())
    }
}

impl Manga {
    /// Download every volume in order. The first failure aborts the rest.
    pub async fn download(&mut self, downloader: &Downloader<'_>) -> Result<()> {
        for volume in &mut self.volumes {
            let name = volume.name.clone();
            volume
                .download(downloader)
                .await
                .map_err(|e| Error::download_failed(format!("volume {}", name), e))?;
        }
        Ok(())
    }
}
