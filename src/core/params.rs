use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Index;

/// Processing parameters suitable for config files and batch presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingParams {
    /// Indices to write; all nine by default
    pub indices: Vec<Index>,
    /// Render an 8-bit grayscale JPEG of NDVI next to its GeoTIFF
    pub browse: bool,
    /// Target long side of the browse image in pixels; None means original size
    pub browse_size: Option<usize>,
    /// Copy the input granule's `{id}.jpg` to the output as `HLS-VI.{...}.jpg`
    pub copy_browse: bool,
    /// Write a JSON sidecar with georeferencing and provenance next to the browse
    pub sidecar: bool,
}

impl Default for ProcessingParams {
    fn default() -> Self {
        Self {
            indices: Index::ALL.to_vec(),
            browse: true,
            browse_size: None,
            copy_browse: true,
            sidecar: true,
        }
    }
}

impl ProcessingParams {
    /// Load parameters from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Reject parameter combinations that cannot produce any output
    pub fn validate(&self) -> Result<()> {
        if self.browse_size == Some(0) {
            return Err(Error::InvalidArgument {
                arg: "browse_size",
                value: "0".to_string(),
            });
        }
        if self.indices.is_empty() && !self.browse {
            return Err(Error::InvalidArgument {
                arg: "indices",
                value: "[]".to_string(),
            });
        }
        Ok(())
    }

    /// Selected indices in request order, without duplicates
    pub fn selected_indices(&self) -> Vec<Index> {
        let mut seen = Vec::with_capacity(self.indices.len());
        for &index in &self.indices {
            if !seen.contains(&index) {
                seen.push(index);
            }
        }
        seen
    }
}
