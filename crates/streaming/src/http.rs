//! HTTP-backed sources for the simulation API and terrain tileset.

use std::time::Duration;

use formats::{FeatureCollection, SimulationResponse};
use futures::future::LocalBoxFuture;
use layers::terrain::TerrainTileset;
use serde::de::DeserializeOwned;

use crate::error::SourceError;
use crate::source::{LoadedTerrain, SimulationSource, TerrainSource};

/// GETs against the simulation API. Every request is bounded by the
/// configured timeout; in the browser a request that outlives it is
/// abandoned and reported as a transport error.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    #[cfg(not(target_arch = "wasm32"))]
    client: reqwest::Client,
    #[cfg(target_arch = "wasm32")]
    timeout_ms: u32,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        #[cfg(not(target_arch = "wasm32"))]
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport {
                url: base_url.clone(),
                reason: e.to_string(),
            })?;
        #[cfg(target_arch = "wasm32")]
        let timeout_ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        Ok(Self {
            base_url,
            #[cfg(not(target_arch = "wasm32"))]
            client,
            #[cfg(target_arch = "wasm32")]
            timeout_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn frames_url(&self, session_id: &str) -> String {
        format!("{}/simulations/{}", self.base_url, session_id)
    }

    pub fn extent_url(&self, session_id: &str) -> String {
        format!("{}/simulations/{}/export?format=geojson", self.base_url, session_id)
    }

    pub fn terrain_url(&self) -> String {
        format!("{}/terrain/tileset.json", self.base_url)
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn fetch_text(&self, url: &str) -> Result<String, SourceError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(url, e))?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        resp.text().await.map_err(|e| transport(url, e))
    }

    #[cfg(target_arch = "wasm32")]
    async fn fetch_text(&self, url: &str) -> Result<String, SourceError> {
        use futures::future::{Either, select};

        let request = Box::pin(Self::browser_get(url));
        let deadline = Box::pin(gloo_timers::future::TimeoutFuture::new(self.timeout_ms));
        match select(request, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(transport(url, format!("timed out after {} ms", self.timeout_ms))),
        }
    }

    #[cfg(target_arch = "wasm32")]
    async fn browser_get(url: &str) -> Result<String, SourceError> {
        let resp = gloo_net::http::Request::get(url)
            .send()
            .await
            .map_err(|e| transport(url, e))?;
        if resp.status() == 404 {
            return Err(SourceError::NotFound(url.to_string()));
        }
        if !resp.ok() {
            return Err(SourceError::Http {
                status: resp.status(),
                url: url.to_string(),
            });
        }
        resp.text().await.map_err(|e| transport(url, e))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str, what: &'static str) -> Result<T, SourceError> {
        let text = self.fetch_text(url).await?;
        tracing::debug!(url, bytes = text.len(), "fetched {what}");
        decode(&text, what)
    }
}

fn transport(url: &str, err: impl std::fmt::Display) -> SourceError {
    SourceError::Transport {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

fn decode<T: DeserializeOwned>(text: &str, what: &'static str) -> Result<T, SourceError> {
    serde_json::from_str(text).map_err(|e| SourceError::Decode {
        what,
        reason: e.to_string(),
    })
}

impl SimulationSource for HttpSource {
    fn frames<'a>(&'a self, session_id: &'a str) -> LocalBoxFuture<'a, Result<SimulationResponse, SourceError>> {
        Box::pin(async move {
            let url = self.frames_url(session_id);
            self.fetch_json(&url, "simulation frames").await
        })
    }

    fn flood_extent<'a>(&'a self, session_id: &'a str) -> LocalBoxFuture<'a, Result<FeatureCollection, SourceError>> {
        Box::pin(async move {
            let url = self.extent_url(session_id);
            let text = self.fetch_text(&url).await?;
            Ok(FeatureCollection::from_geojson_str(&text)?)
        })
    }
}

impl TerrainSource for HttpSource {
    fn tileset_url(&self) -> String {
        self.terrain_url()
    }

    fn load_terrain(&self) -> LocalBoxFuture<'_, Result<LoadedTerrain, SourceError>> {
        Box::pin(async move {
            let url = self.tileset_url();
            let tileset: TerrainTileset = self.fetch_json(&url, "terrain tileset").await?;
            tileset.validate().map_err(|e| SourceError::Decode {
                what: "terrain tileset",
                reason: e.to_string(),
            })?;
            Ok(LoadedTerrain { url, tileset })
        })
    }
}
