//! mapmark - command-line frontend for the place store.
//!
//! Drives every store operation end-to-end: list, add, update, delete,
//! export, plus the district-boundary reader and app-key management.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mapmark_core::auth::SecretStore;
use mapmark_core::cache::CacheManager;
use mapmark_core::config::Config;
use mapmark_core::geo;
use mapmark_core::models::{Place, PlaceDraft, DEFAULT_COLOR};
use mapmark_core::{ApiClient, PlaceStore, RefreshOutcome};

/// Default export file name
const EXPORT_FILE: &str = "places.json";

/// Fallback boundary file tried when the configured one fails to load
const FALLBACK_BOUNDARY_FILE: &str = "districts.geojson";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "list" => cmd_list().await,
        "add" => cmd_add(&args[1..]).await,
        "update" => cmd_update(&args[1..]).await,
        "delete" => cmd_delete(&args[1..]).await,
        "export" => cmd_export(&args[1..]).await,
        "districts" => cmd_districts(&args[1..]),
        "key" => cmd_key(&args[1..]),
        _ => {
            print_usage();
            bail!("unknown command: {}", command)
        }
    }
}

fn print_usage() {
    println!("mapmark - place store frontend");
    println!();
    println!("Usage:");
    println!("  mapmark list");
    println!("  mapmark add NAME LAT LNG [ADDRESS] [COLOR]");
    println!("  mapmark update ID NAME LAT LNG [ADDRESS] [COLOR]");
    println!("  mapmark delete ID");
    println!("  mapmark export [PATH]");
    println!("  mapmark districts [PATH]");
    println!("  mapmark key set KEY | key clear");
}

/// Build a store from config, env, and the keychain, with the place list
/// loaded (from the remote, or the cache when the remote is down).
async fn open_store() -> Result<(PlaceStore<ApiClient>, RefreshOutcome)> {
    let config = Config::load()?;
    let api_url = config.api_url.clone().context(
        "No endpoint configured: set MAPMARK_API_URL or api_url in config.json",
    )?;
    let app_key = SecretStore::app_key()?;

    let cache = CacheManager::new(config.cache_dir()?)?;
    let api = ApiClient::new(api_url, app_key)?;

    let mut store = PlaceStore::new(api, cache);
    let outcome = store.refresh().await;
    Ok((store, outcome))
}

fn report_source(outcome: &RefreshOutcome) {
    if let RefreshOutcome::CacheFallback(err) = outcome {
        warn!(error = %err, "Remote unavailable, showing cached places");
        eprintln!("remote unavailable ({}), showing cached places", err);
    }
}

fn print_place(place: &Place) {
    let address = place.address.as_deref().unwrap_or("-");
    println!(
        "{}  {}  ({:.5}, {:.5})  {}  {}",
        place.id, place.name, place.lat, place.lng, place.color, address
    );
}

async fn cmd_list() -> Result<()> {
    let (store, outcome) = open_store().await?;
    report_source(&outcome);

    if store.places().is_empty() {
        println!("no places");
        return Ok(());
    }
    for place in store.places() {
        print_place(place);
    }
    println!("{} places", store.places().len());
    Ok(())
}

fn parse_coord(value: &str, what: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .with_context(|| format!("invalid {}: {}", what, value))
}

async fn cmd_add(args: &[String]) -> Result<()> {
    let [name, lat, lng, rest @ ..] = args else {
        bail!("usage: mapmark add NAME LAT LNG [ADDRESS] [COLOR]");
    };

    let mut draft = PlaceDraft::new(
        name.clone(),
        parse_coord(lat, "latitude")?,
        parse_coord(lng, "longitude")?,
    );
    draft.address = rest.first().cloned();
    if let Some(color) = rest.get(1) {
        draft.color = color.clone();
    }

    let (mut store, _) = open_store().await?;
    let created = store.create(draft).await?;
    println!("created {}", created.id);
    Ok(())
}

async fn cmd_update(args: &[String]) -> Result<()> {
    let [id, name, lat, lng, rest @ ..] = args else {
        bail!("usage: mapmark update ID NAME LAT LNG [ADDRESS] [COLOR]");
    };

    let (mut store, _) = open_store().await?;

    // Carry fields forward from the existing record where the caller did
    // not supply them.
    let existing = store.find_by_id(id);
    let address = rest
        .first()
        .cloned()
        .or_else(|| existing.and_then(|p| p.address.clone()));
    let color = rest
        .get(1)
        .cloned()
        .or_else(|| existing.map(|p| p.color.clone()))
        .unwrap_or_else(|| DEFAULT_COLOR.to_string());

    let place = Place {
        id: id.clone(),
        name: name.clone(),
        address,
        lat: parse_coord(lat, "latitude")?,
        lng: parse_coord(lng, "longitude")?,
        color,
        timestamp: None,
    };

    store.update(place).await?;
    println!("updated {}", id);
    Ok(())
}

async fn cmd_delete(args: &[String]) -> Result<()> {
    let [id] = args else {
        bail!("usage: mapmark delete ID");
    };

    let (mut store, _) = open_store().await?;
    store.delete(id).await?;
    println!("deleted {}", id);
    Ok(())
}

async fn cmd_export(args: &[String]) -> Result<()> {
    let path = args
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(EXPORT_FILE));

    let (store, outcome) = open_store().await?;
    report_source(&outcome);

    let json = store.export_json()?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    println!("exported {} places to {}", store.places().len(), path.display());
    Ok(())
}

fn cmd_districts(args: &[String]) -> Result<()> {
    let config = Config::load()?;
    let primary = args
        .first()
        .map(PathBuf::from)
        .or(config.boundary_file)
        .context("no boundary file: pass a path or set boundary_file in config.json")?;

    let districts = match geo::load_districts(&primary) {
        Ok(districts) => districts,
        Err(err) => {
            warn!(error = %err, "Primary boundary file failed, trying fallback");
            geo::load_districts(Path::new(FALLBACK_BOUNDARY_FILE))?
        }
    };

    for district in &districts {
        println!(
            "{}  ({:.4}, {:.4})",
            district.name, district.center_lat, district.center_lng
        );
    }
    println!("{} districts", districts.len());
    Ok(())
}

fn cmd_key(args: &[String]) -> Result<()> {
    match args {
        [action, key] if action == "set" => {
            SecretStore::store(key)?;
            println!("app key stored in keychain");
            Ok(())
        }
        [action] if action == "clear" => {
            SecretStore::delete()?;
            println!("app key removed from keychain");
            Ok(())
        }
        _ => bail!("usage: mapmark key set KEY | mapmark key clear"),
    }
}
