//! devicesync CLI — thin shell over the sync engine, for inspecting an
//! index and exercising the hashing pipeline from a terminal.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use devicesync::cli::{Cli, Command, LogLevel};
use devicesync::{DeviceLibrary, LocalAssetStore, MediaIndex};

fn init_tracing(level: LogLevel) {
    let default_directive = match level {
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Error => "error",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn format_timestamp(secs: i64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let index = Arc::new(MediaIndex::open(&cli.index)?);
    let library = DeviceLibrary::new(Arc::clone(&index));

    match cli.command {
        Command::Albums => {
            let albums = library.list_albums()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&albums)?);
            } else {
                for album in &albums {
                    println!(
                        "{}  {}  ({} assets, modified {})",
                        album.id,
                        album.display_name,
                        album.asset_count,
                        format_timestamp(album.last_modified_at)
                    );
                }
            }
        }
        Command::Ids { album_id } => {
            let ids = library.asset_ids_for_album(&album_id)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&ids)?);
            } else {
                for id in ids {
                    println!("{id}");
                }
            }
        }
        Command::Assets { album_id, since } => {
            let assets = library.assets_for_album(&album_id, since)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&assets)?);
            } else {
                for asset in &assets {
                    println!(
                        "{}  {}  {}x{}  {}  modified {}",
                        asset.id,
                        asset.display_name,
                        asset.width,
                        asset.height,
                        asset.playback_style.as_str(),
                        format_timestamp(asset.modified_at)
                    );
                }
            }
        }
        Command::Count { album_id, since } => {
            println!("{}", library.assets_count_since(&album_id, since)?);
        }
        Command::Hash { ids } => {
            let store = LocalAssetStore::new(index);
            let results = store.hash_assets(&ids).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for result in &results {
                    match (&result.fingerprint, &result.error_message) {
                        (Some(fingerprint), _) => println!("{}  {}", result.id, fingerprint),
                        (None, Some(message)) => println!("{}  error: {}", result.id, message),
                        (None, None) => println!("{}  <no result>", result.id),
                    }
                }
            }
        }
    }

    Ok(())
}
