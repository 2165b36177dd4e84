//! The default command: one indexing run over the configured media dirs.

use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use super::IndexArgs;
use crate::config::Config;
use crate::db;
use crate::enrichment::{LastFmClient, MetadataEnricher};
use crate::error::Error;
use crate::library::{IndexOptions, IndexReport, Indexer};

/// Index every configured media dir and print what was added
pub fn cmd_index(rt: &Runtime, args: &IndexArgs, config: &Config, db_url: &str) -> anyhow::Result<()> {
    // Resolve credentials before touching the database or the filesystem
    let enricher = build_enricher(args, config)?;

    let report = rt.block_on(async {
        let pool = db::init_db(db_url).await?;
        info!(db = db_url, "Database ready");

        let options = IndexOptions {
            extract_metadata: !args.nometadata,
            accepted_formats: config.library.accepted_formats.clone(),
        };
        Indexer::new(pool, options, enricher)
            .run(&config.library.media_dirs)
            .await
    })?;

    print_report(&report);
    Ok(())
}

fn build_enricher(
    args: &IndexArgs,
    config: &Config,
) -> Result<Option<Arc<dyn MetadataEnricher>>, Error> {
    if !args.lastfm {
        return Ok(None);
    }
    if args.nometadata {
        warn!("--nometadata disables --lastfm enrichment");
        return Ok(None);
    }

    let api_key = args
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or(config.lastfm_api_key())
        .ok_or_else(|| {
            Error::config(
                "--lastfm needs a Last.fm API key: set [credentials] lastfm_api_key or LASTFM_API_KEY",
            )
        })?;

    let timeout = Duration::from_secs(config.enrichment.timeout_secs);
    let client = LastFmClient::new(api_key, timeout)?;
    Ok(Some(Arc::new(client)))
}

fn print_report(report: &IndexReport) {
    println!(
        "Indexed {} tracks, {} albums, {} artists.",
        report.tracks_added, report.albums_added, report.artists_added
    );
    if report.already_indexed > 0 {
        println!("Skipped {} already indexed files.", report.already_indexed);
    }
    if report.failed > 0 {
        println!("Failed to read {} files (see warnings).", report.failed);
    }
}
