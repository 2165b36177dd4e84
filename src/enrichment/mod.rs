//! Remote metadata enrichment for artists and albums.
//!
//! # Architecture
//!
//! - **Domain** (`domain.rs`) - [`AlbumInfo`] and [`EnrichmentError`], the only
//!   types the resolver sees
//! - **Trait** (`traits.rs`) - [`MetadataEnricher`], the injectable seam; tests
//!   substitute an offline stub
//! - **Last.fm** (`lastfm/`) - DTOs, adapter and HTTP client for the
//!   Last.fm web service
//!
//! Enrichment is strictly optional. Callers treat every [`EnrichmentError`]
//! as "no data" and carry on with local tags.
//!
//! # Usage
//!
//! ```ignore
//! use music_indexer::enrichment::{LastFmClient, MetadataEnricher};
//!
//! let client = LastFmClient::new("api-key", Duration::from_secs(10))?;
//! let info = client.fetch_album_info("Cher", "Believe").await?;
//! println!("Year: {:?}", info.release_year());
//! ```

pub mod domain;
pub mod lastfm;
pub mod traits;

pub use domain::{AlbumInfo, EnrichmentError, RELEASE_DATE_FORMAT, parse_release_year};
pub use lastfm::LastFmClient;
pub use traits::MetadataEnricher;
