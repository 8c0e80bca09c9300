use formats::{FeatureCollection, SimulationResponse};
use futures::future::LocalBoxFuture;
use layers::terrain::TerrainTileset;

use crate::error::SourceError;

/// Supplies simulation frames and flood extents for a session.
pub trait SimulationSource {
    fn frames<'a>(&'a self, session_id: &'a str) -> LocalBoxFuture<'a, Result<SimulationResponse, SourceError>>;

    fn flood_extent<'a>(&'a self, session_id: &'a str) -> LocalBoxFuture<'a, Result<FeatureCollection, SourceError>>;
}

/// A terrain tileset together with the URL it was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTerrain {
    pub url: String,
    pub tileset: TerrainTileset,
}

pub trait TerrainSource {
    /// Where the tileset descriptor is fetched from.
    fn tileset_url(&self) -> String;

    fn load_terrain(&self) -> LocalBoxFuture<'_, Result<LoadedTerrain, SourceError>>;
}
