//! Vehicle model asset
//!
//! The browser build fetches the model as glTF JSON and hands the text here.
//! Only the document header is checked; geometry stays opaque to the game.

use serde::Deserialize;
use thiserror::Error;

/// Where the front end fetches the vehicle model from
pub const VEHICLE_MODEL_URL: &str = "assets/models/car.gltf";

/// Vehicle model load failure
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("no window")]
    NoWindow,
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("server answered {0}")]
    Status(u16),
    #[error("malformed model: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported model: {0}")]
    Unsupported(String),
}

#[derive(Debug, Deserialize)]
struct GltfHeader {
    asset: GltfAsset,
    #[serde(default)]
    meshes: Vec<serde_json::Value>,
    #[serde(default)]
    nodes: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GltfAsset {
    version: String,
}

/// A loaded vehicle model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleModel {
    pub meshes: usize,
    pub nodes: usize,
}

/// Validate a glTF 2.0 document holding at least one mesh
pub fn parse_vehicle_model(json: &str) -> Result<VehicleModel, AssetError> {
    let header: GltfHeader = serde_json::from_str(json)?;

    if !header.asset.version.starts_with("2.") {
        return Err(AssetError::Unsupported(format!(
            "glTF version {}",
            header.asset.version
        )));
    }
    if header.meshes.is_empty() {
        return Err(AssetError::Unsupported("no meshes".into()));
    }

    Ok(VehicleModel {
        meshes: header.meshes.len(),
        nodes: header.nodes.len(),
    })
}
