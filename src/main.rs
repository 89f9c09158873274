use clap::Parser;
use log::{error, info};

use mangamirror::config::Config;
use mangamirror::downloader::Downloader;
use mangamirror::error::{Error, Result};
use mangamirror::models::Manga;
use mangamirror::sources::mangadex::MangaDex;
use mangamirror::sources::MangaSource;

/// Fetch a manga's chapter catalog and download its pages.
#[derive(Parser)]
#[command(name = "mangamirror", version, about)]
struct Args {
    /// Title to search the catalog for
    title: String,

    /// Print the volume and chapter tree without downloading
    #[arg(long)]
    list: bool,

    /// Restrict the download to one volume, by canonical name
    #[arg(long)]
    volume: Option<String>,

    /// Restrict the download to one chapter, by canonical label
    #[arg(long, requires = "volume")]
    chapter: Option<String>,

    /// Download reduced quality page variants
    #[arg(long, requires = "chapter")]
    data_saver: bool,

    /// Replace previously known chapters instead of appending new ones
    #[arg(long)]
    replace: bool,
}

#[tokio::main]
async fn main() {
    log4rs::init_file("log4rs.yml", Default::default()).unwrap();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("{}", error_chain(&e));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let cfg = Config::load();
    let http = cfg.network.create_http_client()?;
    let source = MangaDex::with_options(http.clone(), cfg.catalog.clone());

    let mut manga = source.search_manga(&args.title).await?;
    info!("Fetching chapters for {} ({})", manga.name, manga.id);

    let fresh = source.fetch_chapters(&manga.id).await?;
    manga.merge_chapters(fresh, args.replace);
    manga.rebuild_volumes();

    if args.list {
        print_tree(&manga);
        return Ok(());
    }

    let downloader = Downloader::new(&source, http, &cfg.download_dir);

    match (&args.volume, &args.chapter) {
        (Some(volume), Some(chapter)) => {
            let target = manga
                .volumes
                .iter_mut()
                .find(|v| v.name == *volume)
                .and_then(|v| v.chapters.iter_mut().find(|c| c.chapter == *chapter))
                .ok_or_else(|| Error::NotFound(format!("{} / {}", volume, chapter)))?;
            target.download(&downloader, args.data_saver).await
        }
        (Some(volume), None) => {
            let target = manga
                .volumes
                .iter_mut()
                .find(|v| v.name == *volume)
                .ok_or_else(|| Error::NotFound(format!("volume {}", volume)))?;
            target.download(&downloader).await
        }
        _ => {
            info!(
                "Downloading {} volumes of {}",
                manga.volumes.len(),
                manga.name
            );
            manga.download(&downloader).await
        }
    }
}

fn print_tree(manga: &Manga) {
    println!(
        "{} [{}] ({} chapters)",
        manga.name,
        manga.provider,
        manga.chapters.len()
    );
    for volume in &manga.volumes {
        println!("  {}", volume.name);
        for chapter in &volume.chapters {
            if chapter.title.is_empty() {
                println!("    {}", chapter.chapter);
            } else {
                println!("    {} - {}", chapter.chapter, chapter.title);
            }
        }
    }
}

fn error_chain(e: &dyn std::error::Error) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
