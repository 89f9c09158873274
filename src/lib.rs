// Library interface for mangamirror
// This allows tests and external crates to use the pipeline components

pub mod config;
pub mod downloader;
pub mod error;
pub mod hash;
pub mod helpers;
pub mod http_client;
pub mod models;
pub mod sources;
