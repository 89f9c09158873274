use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A work as returned by catalog search. Chapters are populated by a feed
/// fetch; volumes are derived from the chapter list and can be rebuilt at
/// any time. Plain data, so an external store can persist it as is.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Manga {
    pub id: String,
    pub name: String,
    /// Tag of the source that produced this record
    pub provider: String,
    pub chapters: Vec<Chapter>,
    pub volumes: Vec<Volume>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Chapter {
    pub id: String,
    /// Parent work, referenced by catalog ID rather than a back-pointer
    pub manga_id: String,
    /// Canonical volume label ("Volume 3", or the unassigned placeholder)
    pub volume: String,
    /// Canonical chapter label ("Chapter 12.5", "Prologue")
    pub chapter: String,
    pub title: String,
    pub translated_language: String,
    /// Page count declared by the catalog feed
    pub pages_total: usize,
    /// First scanlation group related to this chapter, if any
    pub scanlation_group: Option<String>,
    /// Directory this chapter was last downloaded into
    pub download_path: Option<String>,
    pub pages: Vec<Page>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Page {
    pub index: usize,
    /// CRC-32 of the file written for this page, empty until downloaded
    pub hash: String,
    pub file_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Volume {
    pub name: String,
    pub manga_id: String,
    pub chapters: Vec<Chapter>,
}

impl Page {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            hash: String::new(),
            file_name: String::new(),
        }
    }
}

impl Chapter {
    /// Pre-size the page records to the declared page count so page state
    /// can be addressed by index. Called once when the chapter is decoded.
    pub fn allocate_pages(&mut self) {
        self.pages = (0..self.pages_total).map(Page::new).collect();
    }
}

impl Manga {
    /// Merge freshly fetched chapters into the existing list. With
    /// `replace_all` the list is replaced wholesale; otherwise fresh
    /// chapters whose ID is not yet known are appended in order, and
    /// existing entries are never updated in place. An ID seen twice
    /// within `fresh` is appended only once.
    pub fn merge_chapters(&mut self, fresh: Vec<Chapter>, replace_all: bool) {
        if replace_all {
            self.chapters = fresh;
            return;
        }

        let mut known: HashSet<String> = self.chapters.iter().map(|c| c.id.clone()).collect();
        for chapter in fresh {
            if known.insert(chapter.id.clone()) {
                self.chapters.push(chapter);
            }
        }
    }

    /// Rebuild the volume grouping from the current chapter list, discarding
    /// any previous grouping.
    pub fn rebuild_volumes(&mut self) {
        self.volumes = group_by_volume(&self.chapters);
    }
}

/// Group chapters into volumes, volumes ordered by first appearance in the
/// chapter list. A chapter whose canonical label is already present in its
/// volume is dropped; the first one seen wins.
pub fn group_by_volume(chapters: &[Chapter]) -> Vec<Volume> {
    let mut volumes: Vec<Volume> = Vec::new();

    for chapter in chapters {
        match volumes.iter_mut().find(|v| v.name == chapter.volume) {
            Some(volume) => {
                if !volume.chapters.iter().any(|c| c.chapter == chapter.chapter) {
                    volume.chapters.push(chapter.clone());
                }
            }
            None => {
                volumes.push(Volume {
                    name: chapter.volume.clone(),
                    manga_id: chapter.manga_id.clone(),
                    chapters: vec![chapter.clone()],
                });
            }
        }
    }

    volumes
}
