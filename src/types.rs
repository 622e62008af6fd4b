//! Shared types and enums used across HLS-VI.
//! Includes the harmonized `Band` vocabulary, the source `Instrument` with its
//! band-code table, and the closed set of spectral `Index` products.
use std::collections::HashMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Common spectral channels that every instrument's bands are mapped onto.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Band {
    B,
    G,
    R,
    Nir,
    Swir1,
    Swir2,
}

impl Band {
    /// All harmonized bands, in the positional order of every instrument table.
    pub const ALL: [Band; 6] = [
        Band::B,
        Band::G,
        Band::R,
        Band::Nir,
        Band::Swir1,
        Band::Swir2,
    ];

    pub fn position(self) -> usize {
        match self {
            Band::B => 0,
            Band::G => 1,
            Band::R => 2,
            Band::Nir => 3,
            Band::Swir1 => 4,
            Band::Swir2 => 5,
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Band::B => "B",
            Band::G => "G",
            Band::R => "R",
            Band::Nir => "NIR",
            Band::Swir1 => "SWIR1",
            Band::Swir2 => "SWIR2",
        };
        write!(f, "{}", s)
    }
}

/// HLS source product: Landsat 8/9 OLI (`L30`) or Sentinel-2 MSI (`S30`).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Instrument {
    L30,
    S30,
}

const L30_BANDS: [&str; 6] = ["B02", "B03", "B04", "B05", "B06", "B07"];
const S30_BANDS: [&str; 6] = ["B02", "B03", "B04", "B8A", "B11", "B12"];

impl Instrument {
    /// Look up an instrument by its exact name (`"L30"` or `"S30"`).
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "L30" => Some(Instrument::L30),
            "S30" => Some(Instrument::S30),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Instrument::L30 => "L30",
            Instrument::S30 => "S30",
        }
    }

    /// Instrument band codes, positionally aligned with [`Band::ALL`].
    pub fn band_codes(self) -> &'static [&'static str; 6] {
        match self {
            Instrument::L30 => &L30_BANDS,
            Instrument::S30 => &S30_BANDS,
        }
    }

    /// Pairs of (instrument band code, harmonized band).
    pub fn bands(self) -> impl Iterator<Item = (&'static str, Band)> {
        self.band_codes().iter().copied().zip(Band::ALL)
    }

    /// Instrument band code carrying the given harmonized band.
    pub fn band_code(self, band: Band) -> &'static str {
        self.band_codes()[band.position()]
    }

    /// Derive the satellite name from the source raster tags.
    ///
    /// - `L30`: `LANDSAT_PRODUCT_ID` such as `LC08_L1TP_069014_...` gives `L8`.
    /// - `S30`: `PRODUCT_URI` such as `S2B_MSIL1C_...` gives `S2B`.
    pub fn satellite(self, tags: &HashMap<String, String>) -> Option<String> {
        match self {
            Instrument::L30 => {
                let product_id = tags.get("LANDSAT_PRODUCT_ID")?;
                let number: u32 = product_id.get(2..4)?.parse().ok()?;
                Some(format!("L{}", number))
            }
            Instrument::S30 => {
                let uri = tags.get("PRODUCT_URI")?;
                uri.split('_')
                    .next()
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            }
        }
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Spectral indices produced for every granule.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Index {
    Evi,
    Msavi,
    Nbr,
    Nbr2,
    Ndmi,
    Ndvi,
    Ndwi,
    Savi,
    Tvi,
}

impl Index {
    pub const ALL: [Index; 9] = [
        Index::Evi,
        Index::Msavi,
        Index::Nbr,
        Index::Nbr2,
        Index::Ndmi,
        Index::Ndvi,
        Index::Ndwi,
        Index::Savi,
        Index::Tvi,
    ];

    /// Short product name used in output filenames (e.g. `NDVI`).
    pub fn name(self) -> &'static str {
        match self {
            Index::Evi => "EVI",
            Index::Msavi => "MSAVI",
            Index::Nbr => "NBR",
            Index::Nbr2 => "NBR2",
            Index::Ndmi => "NDMI",
            Index::Ndvi => "NDVI",
            Index::Ndwi => "NDWI",
            Index::Savi => "SAVI",
            Index::Tvi => "TVI",
        }
    }
}

impl std::fmt::Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
