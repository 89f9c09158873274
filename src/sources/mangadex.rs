use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::CatalogConfig;
use crate::error::{Error, Result};
use crate::helpers::{normalize_chapter_label, normalize_volume_label};
use crate::http_client::HttpClient;
use crate::models::{Chapter, Manga};
use crate::sources::{ChapterLinks, MangaSource};

pub const BASE_URL: &str = "https://api.mangadex.org";

/// MangaDex catalog client
pub struct MangaDex {
    http: HttpClient,
    options: CatalogConfig,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    result: String,
    #[serde(default)]
    response: String,
    #[serde(default)]
    data: Vec<MangaData>,
}

#[derive(Deserialize)]
struct MangaData {
    id: String,
    attributes: MangaAttributes,
}

#[derive(Deserialize)]
struct MangaAttributes {
    title: HashMap<String, String>,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct FeedEnvelope {
    #[serde(default)]
    result: String,
    #[serde(default)]
    response: String,
    #[serde(default)]
    data: Vec<ChapterData>,
    #[serde(default)]
    limit: i64,
    #[serde(default)]
    offset: i64,
    #[serde(default)]
    total: usize,
}

#[derive(Deserialize)]
struct ChapterData {
    id: String,
    attributes: ChapterAttributes,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChapterAttributes {
    #[serde(default)]
    volume: Option<String>,
    #[serde(default)]
    chapter: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    translated_language: String,
    #[serde(default)]
    pages: usize,
}

#[derive(Deserialize)]
struct Relationship {
    id: String,
    #[serde(rename = "type")]
    rel_type: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AtHomeEnvelope {
    #[serde(default)]
    result: String,
    #[serde(default)]
    base_url: String,
    #[serde(default)]
    chapter: AtHomeChapter,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AtHomeChapter {
    #[serde(default)]
    hash: String,
    #[serde(default)]
    data: Vec<String>,
    #[serde(default)]
    data_saver: Vec<String>,
}

impl MangaDex {
    /// Create a provider against the production API
    pub fn new(http: HttpClient) -> Self {
        Self::with_options(http, CatalogConfig::default())
    }

    /// Create a provider with explicit catalog options
    pub fn with_options(http: HttpClient, options: CatalogConfig) -> Self {
        Self { http, options }
    }

    async fn fetch_feed_page(&self, manga_id: &str, offset: usize) -> Result<FeedEnvelope> {
        let url = format!("{}/manga/{}/feed", self.options.api_url, manga_id);
        let params = HashMap::from([
            ("offset".to_string(), offset.to_string()),
            (
                "translatedLanguage[]".to_string(),
                self.options.language.clone(),
            ),
        ]);
        let body = self.http.get_bytes(&url, &params).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Map one feed entry onto a Chapter, applying the label rules and the
    /// first-match scanlation group selection.
    fn decode_chapter(&self, manga_id: &str, data: ChapterData) -> Chapter {
        let attrs = data.attributes;
        let scanlation_group = data
            .relationships
            .iter()
            .find(|r| r.rel_type == "scanlation_group")
            .map(|r| r.id.clone());

        let mut chapter = Chapter {
            id: data.id,
            manga_id: manga_id.to_string(),
            volume: normalize_volume_label(
                attrs.volume.as_deref().unwrap_or(""),
                &self.options.empty_volume_name,
            ),
            chapter: normalize_chapter_label(attrs.chapter.as_deref().unwrap_or("")),
            title: attrs.title.unwrap_or_default(),
            translated_language: attrs.translated_language,
            pages_total: attrs.pages,
            scanlation_group,
            download_path: None,
            pages: Vec::new(),
        };
        chapter.allocate_pages();
        chapter
    }
}

#[async_trait]
impl MangaSource for MangaDex {
    fn provider(&self) -> &'static str {
        "MangaDex"
    }

    async fn search_manga(&self, title: &str) -> Result<Manga> {
        let url = format!("{}/manga", self.options.api_url);
        let params = HashMap::from([
            ("title".to_string(), title.to_string()),
            ("limit".to_string(), "1".to_string()),
        ]);
        let body = self.http.get_bytes(&url, &params).await?;
        let envelope: SearchEnvelope = serde_json::from_slice(&body)?;

        if envelope.result == "error" {
            return Err(Error::Provider(envelope.response));
        }

        let first = envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(title.to_string()))?;
        let name = first
            .attributes
            .title
            .get("en")
            .cloned()
            .unwrap_or_default();

        log::info!("Search for {:?} resolved to {:?} ({})", title, name, first.id);

        Ok(Manga {
            id: first.id,
            name,
            provider: self.provider().to_string(),
            chapters: Vec::new(),
            volumes: Vec::new(),
        })
    }

    async fn fetch_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>> {
        let mut chapters: Vec<Chapter> = Vec::new();
        // Unknown until the first envelope arrives.
        let mut total = usize::MAX;

        while chapters.len() < total {
            let feed = self.fetch_feed_page(manga_id, chapters.len()).await?;
            if feed.result == "error" {
                return Err(Error::Provider(feed.response));
            }

            if chapters.is_empty() {
                chapters.reserve(feed.total);
            }
            total = feed.total;

            if feed.data.is_empty() && chapters.len() < total {
                return Err(Error::Provider(format!(
                    "feed for {} ended early at {} of {} chapters",
                    manga_id,
                    chapters.len(),
                    total
                )));
            }

            for data in feed.data {
                chapters.push(self.decode_chapter(manga_id, data));
            }
            log::info!("Fetched {}/{} chapters for {}", chapters.len(), total, manga_id);

            if chapters.len() < total {
                self.http
                    .rate_limit_delay(self.options.feed_page_delay_ms)
                    .await;
            }
        }

        Ok(chapters)
    }

    async fn fetch_chapter_links(&self, chapter_id: &str) -> Result<ChapterLinks> {
        let url = format!("{}/at-home/server/{}", self.options.api_url, chapter_id);
        let body = self.http.get_bytes(&url, &HashMap::new()).await?;
        let envelope: AtHomeEnvelope = serde_json::from_slice(&body)?;

        if envelope.result == "error" {
            return Err(Error::Provider(format!(
                "no download server for chapter {}",
                chapter_id
            )));
        }

        Ok(ChapterLinks {
            base_url: envelope.base_url,
            hash: envelope.chapter.hash,
            data: envelope.chapter.data,
            data_saver: envelope.chapter.data_saver,
        })
    }
}
