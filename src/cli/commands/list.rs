//! Print the stored library.

use tokio::runtime::Runtime;

use crate::db;

/// List all tracks in the database
pub fn cmd_list(rt: &Runtime, db_url: &str) -> anyhow::Result<()> {
    rt.block_on(async {
        let pool = db::init_db(db_url).await?;
        let tracks = db::get_all_tracks(&pool).await?;
        for track in &tracks {
            println!("{} - {}", track.title.as_deref().unwrap_or("(untagged)"), track.path);
        }
        println!("{} tracks.", tracks.len());
        Ok::<(), anyhow::Error>(())
    })
}
