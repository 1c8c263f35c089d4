use std::{path::Path, sync::Arc, time::Duration};

use clap::{Parser, Subcommand};
use nearby_core::{
    model::{CommunityPlaceSource, Coordinates, DiscoveryError, Place, PlaceCategory},
    ops::format_distance,
};
use serde::{Deserialize, Serialize};

use super::{AppConfig, AppError};
use crate::model::{
    curated::CuratedPlaceStore,
    discovery::{DiscoveryController, DiscoveryView, LiveMode},
    geo::StaticPositionProvider,
};

pub const DEFAULT_WAIT_SECS: u64 = 60;

/// Command line tool for discovering curated and OpenStreetMap places near a position
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct NearbyApp {
    #[command(subcommand)]
    pub op: NearbyOperation,
}

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum NearbyOperation {
    /// merged, distance-ranked list of curated and community places around a position
    Discover {
        /// configuration file for the curated backend, overpass and discovery settings
        #[arg(short, long)]
        configuration_file: String,

        /// latitude of the user position, in decimal degrees
        #[arg(long, allow_hyphen_values(true))]
        lat: f64,

        /// longitude of the user position, in decimal degrees
        #[arg(long, allow_hyphen_values(true))]
        lon: f64,

        /// search radius in kilometers, overrides the configuration file
        #[arg(short, long)]
        radius_km: Option<f64>,

        /// only show places of this category, e.g. "temple" or "hidden_spot"
        #[arg(long)]
        category: Option<PlaceCategory>,

        /// seconds to wait for both sources to respond
        #[arg(short, long)]
        wait_secs: Option<u64>,
    },
    /// case-insensitive search over curated place names and descriptions
    Search {
        /// configuration file for the curated backend
        #[arg(short, long)]
        configuration_file: String,

        /// text to find in a place name or description
        term: String,
    },
}

impl NearbyOperation {
    pub fn run(&self) -> Result<(), AppError> {
        match self {
            NearbyOperation::Discover {
                configuration_file,
                lat,
                lon,
                radius_km,
                category,
                wait_secs,
            } => {
                let config = AppConfig::try_from(Path::new(configuration_file))?;
                let center = Coordinates::try_new(*lat, *lon).ok_or_else(|| {
                    AppError::InvalidUserInput(format!("({lat}, {lon}) is not a valid position"))
                })?;
                let wait = Duration::from_secs(wait_secs.unwrap_or(DEFAULT_WAIT_SECS));
                let runtime = runtime()?;
                let places =
                    runtime.block_on(discover(&config, center, *radius_km, *category, wait))?;
                for place in places.iter() {
                    let distance = place
                        .distance_from_user_km
                        .map(format_distance)
                        .unwrap_or_default();
                    log::info!(
                        "{} ({}, {}) {distance}",
                        place.name,
                        place.category,
                        place.source
                    );
                }
                print_places(&places)
            }
            NearbyOperation::Search {
                configuration_file,
                term,
            } => {
                let config = AppConfig::try_from(Path::new(configuration_file))?;
                let store = CuratedPlaceStore::new(config.curated.build()?);
                let runtime = runtime()?;
                let snapshot = runtime.block_on(store.search(term));
                if let Some(error) = snapshot.error {
                    return Err(AppError::Discovery(error));
                }
                log::info!("found {} curated places matching '{term}'", snapshot.places.len());
                print_places(&snapshot.places)
            }
        }
    }
}

/// run live discovery at a fixed position until the first fetch cycle settles
async fn discover(
    config: &AppConfig,
    center: Coordinates,
    radius_km: Option<f64>,
    category: Option<PlaceCategory>,
    wait: Duration,
) -> Result<Vec<Place>, AppError> {
    let mut discovery = config.discovery.clone();
    if radius_km.is_some() {
        discovery.radius_km = radius_km;
    }
    if category.is_some() {
        discovery.category = category;
    }
    let settings = discovery.build()?;
    let store = Arc::new(CuratedPlaceStore::new(config.curated.build()?));
    let community: Arc<dyn CommunityPlaceSource> = Arc::new(config.overpass.build()?);
    let provider = Arc::new(StaticPositionProvider::new(vec![center]));

    let (controller, handle) = DiscoveryController::new(settings, provider, store, community);
    let task = tokio::spawn(controller.run());
    handle.enable_live();

    let mut views = handle.subscribe();
    let settled = |v: &DiscoveryView| match v.mode {
        LiveMode::Live => !v.pending,
        LiveMode::Off => matches!(v.last_error, Some(DiscoveryError::PositionUnavailable(_))),
        LiveMode::Acquiring => false,
    };
    let view = match tokio::time::timeout(wait, views.wait_for(settled)).await {
        Ok(Ok(view)) => view.clone(),
        Ok(Err(_)) => {
            return Err(AppError::InternalError(String::from(
                "discovery controller stopped unexpectedly",
            )))
        }
        Err(_) => return Err(AppError::Timeout(wait)),
    };
    handle.shutdown();
    task.await
        .map_err(|e| AppError::InternalError(format!("discovery controller failed: {e}")))?;

    if view.mode == LiveMode::Off {
        if let Some(error) = view.last_error {
            return Err(AppError::Discovery(error));
        }
    }
    if let Some(error) = view.last_error.as_ref() {
        log::warn!("discovery finished with error: {error}");
    }
    Ok(view.places)
}

fn runtime() -> Result<tokio::runtime::Runtime, AppError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::TokioError(format!("failure creating async rust tokio runtime: {e}")))
}

fn print_places(places: &[Place]) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(places)
        .map_err(|e| AppError::SerializationError(e.to_string()))?;
    println!("{json}");
    Ok(())
}
