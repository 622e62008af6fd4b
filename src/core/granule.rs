//! In-memory granule: harmonized, quality-masked band data plus the
//! georeferencing and provenance tags shared by every band.
use std::collections::{BTreeMap, HashMap};

use crate::core::granule_id::GranuleId;
use crate::core::masked::MaskedArray;
use crate::types::Band;

/// Provenance tags carried onto every output raster. `None` marks a tag that
/// was absent from the source raster.
pub type Tags = BTreeMap<String, Option<String>>;

/// Source raster tags propagated to the index rasters.
pub const FIXED_TAGS: [&str; 17] = [
    "add_offset",
    "ACCODE",
    "AREA_OR_POINT",
    "cloud_coverage",
    "HORIZONTAL_CS_NAME",
    "MEAN_SUN_AZIMUTH_ANGLE",
    "MEAN_SUN_ZENITH_ANGLE",
    "MEAN_VIEW_AZIMUTH_ANGLE",
    "MEAN_VIEW_ZENITH_ANGLE",
    "NBAR_SOLAR_ZENITH",
    "NCOLS",
    "NROWS",
    "SENSING_TIME",
    "spatial_coverage",
    "SPATIAL_RESOLUTION",
    "ULX",
    "ULY",
];

pub const TILE_ID_TAG: &str = "MGRS_TILE_ID";
pub const SATELLITE_TAG: &str = "SATELLITE";
pub const SENSING_TIME_TAG: &str = "SENSING_TIME";

/// Project the allow-listed tags out of a band's full tag set and add the
/// tile identifier and satellite name derived from the granule ID.
pub fn select_tags(id: &GranuleId, tags: &HashMap<String, String>) -> Tags {
    let mut selected: Tags = FIXED_TAGS
        .iter()
        .map(|&key| (key.to_string(), tags.get(key).cloned()))
        .collect();
    selected.insert(TILE_ID_TAG.to_string(), Some(id.tile_id.clone()));
    selected.insert(SATELLITE_TAG.to_string(), id.instrument.satellite(tags));
    selected
}

/// The six harmonized bands of one granule, all of the same shape.
#[derive(Debug, Clone)]
pub struct BandData {
    bands: [MaskedArray; 6],
}

impl BandData {
    /// Build from arrays ordered as [`Band::ALL`]. Returns `None` when the
    /// shapes disagree.
    pub fn new(bands: [MaskedArray; 6]) -> Option<Self> {
        let dim = bands[0].dim();
        if bands.iter().any(|b| b.dim() != dim) {
            return None;
        }
        Some(Self { bands })
    }

    pub fn dim(&self) -> (usize, usize) {
        self.bands[0].dim()
    }

    pub fn get(&self, band: Band) -> &MaskedArray {
        &self.bands[band.position()]
    }
}

impl std::ops::Index<Band> for BandData {
    type Output = MaskedArray;

    fn index(&self, band: Band) -> &MaskedArray {
        self.get(band)
    }
}

/// One granule, ready for index computation.
#[derive(Debug, Clone)]
pub struct Granule {
    pub id: GranuleId,
    /// Projection as WKT (or an `EPSG:` code when that is all the source declared).
    pub crs: String,
    /// GDAL-ordered affine geotransform.
    pub transform: [f64; 6],
    pub tags: Tags,
    pub data: BandData,
}

impl Granule {
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Tags with a value, in key order.
    pub fn present_tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }
}
