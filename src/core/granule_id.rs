//! HLS granule identifiers of the form
//! `HLS.{instrument}.{tile_id}.{acquisition_date}.{version}`.
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Instrument;

const PREFIX: &str = "HLS";
const VI_PREFIX: &str = "HLS-VI";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GranuleIdError {
    #[error("Invalid granule ID: {0}")]
    InvalidFormat(String),
    #[error("Invalid instrument name: {0}")]
    UnknownInstrument(String),
}

/// Parsed granule identifier. The version absorbs every remaining segment,
/// so `v2.0` survives a parse/display round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GranuleId {
    pub instrument: Instrument,
    pub tile_id: String,
    pub acquisition_date: String,
    pub version: String,
}

impl GranuleId {
    pub fn parse(text: &str) -> Result<Self, GranuleIdError> {
        let invalid = || GranuleIdError::InvalidFormat(text.to_string());

        let mut parts = text.splitn(5, '.');
        let prefix = parts.next().ok_or_else(invalid)?;
        if prefix != PREFIX {
            return Err(invalid());
        }
        let mut field = || {
            parts
                .next()
                .filter(|s| !s.is_empty())
                .ok_or_else(invalid)
        };
        let instrument = field()?;
        let tile_id = field()?;
        let acquisition_date = field()?;
        let version = field()?;

        let instrument = Instrument::named(instrument)
            .ok_or_else(|| GranuleIdError::UnknownInstrument(instrument.to_string()))?;

        Ok(GranuleId {
            instrument,
            tile_id: tile_id.to_string(),
            acquisition_date: acquisition_date.to_string(),
            version: version.to_string(),
        })
    }

    /// Identifier of the derived product, `HLS-VI.{instrument}.{tile}.{date}.{version}`.
    pub fn vi_name(&self) -> String {
        self.join(VI_PREFIX)
    }

    fn join(&self, prefix: &str) -> String {
        [
            prefix,
            self.instrument.name(),
            &self.tile_id,
            &self.acquisition_date,
            &self.version,
        ]
        .join(".")
    }
}

impl FromStr for GranuleId {
    type Err = GranuleIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GranuleId::parse(s)
    }
}

impl std::fmt::Display for GranuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.join(PREFIX))
    }
}
