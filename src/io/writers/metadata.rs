use chrono::{DateTime, Utc};
use gdal::Dataset;
use gdal::Metadata;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::granule::{Granule, SENSING_TIME_TAG};
use crate::core::sensing::parse_sensing_time;
use crate::types::Index;

pub const LONG_NAME_TAG: &str = "long_name";
pub const SCALE_FACTOR_TAG: &str = "scale_factor";
pub const PROCESSING_TIME_TAG: &str = "HLS_VI_PROCESSING_TIME";
pub const FILL_VALUE_TAG: &str = "_FillValue";

/// Format of `HLS_VI_PROCESSING_TIME`, e.g. `2024-05-01T12:00:00.123456Z`.
pub const PROCESSING_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

pub fn processing_timestamp(now: DateTime<Utc>) -> String {
    now.format(PROCESSING_TIME_FORMAT).to_string()
}

/// All tags written onto an index raster: the granule's provenance tags plus
/// the index description, scale and fill value, and the processing time
pub fn index_metadata_fields(
    granule: &Granule,
    index: Index,
    processing_time: &str,
) -> BTreeMap<String, String> {
    let mut metadata: BTreeMap<String, String> = granule
        .present_tags()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    metadata.insert(LONG_NAME_TAG.to_string(), index.long_name().to_string());
    metadata.insert(SCALE_FACTOR_TAG.to_string(), index.scale_factor().to_string());
    metadata.insert(PROCESSING_TIME_TAG.to_string(), processing_time.to_string());
    metadata.insert(FILL_VALUE_TAG.to_string(), index.fill_value().to_string());

    metadata
}

/// Embed metadata fields into a GeoTIFF dataset (default domain)
pub fn embed_tiff_metadata(
    ds: &mut Dataset,
    metadata: &BTreeMap<String, String>,
) -> Result<(), Box<dyn std::error::Error>> {
    for (key, value) in metadata {
        ds.set_metadata_item(key, value, "")?;
    }
    Ok(())
}

/// Convert metadata to JSON values, lowercasing keys and keeping numeric
/// strings as numbers
pub fn convert_metadata_to_json(
    metadata: &BTreeMap<String, String>,
) -> HashMap<String, serde_json::Value> {
    let mut json_metadata = HashMap::new();

    for (key, value) in metadata {
        let json_key = key.to_lowercase();
        let json_value = value
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(value.clone()));
        json_metadata.insert(json_key, json_value);
    }

    json_metadata
}

/// Georeferencing and temporal fields that need structured JSON values
pub fn add_special_json_fields(
    json_metadata: &mut HashMap<String, serde_json::Value>,
    granule: &Granule,
    geotransform: [f64; 6],
) {
    json_metadata.insert(
        "granule_id".to_string(),
        serde_json::Value::String(granule.id.to_string()),
    );
    json_metadata.insert(
        "geotransform".to_string(),
        serde_json::Value::Array(
            geotransform
                .iter()
                .filter_map(|&v| serde_json::Number::from_f64(v))
                .map(serde_json::Value::Number)
                .collect(),
        ),
    );
    if !granule.crs.is_empty() {
        json_metadata.insert(
            "crs".to_string(),
            serde_json::Value::String(granule.crs.clone()),
        );
    }
    let sensing = granule
        .tags
        .get(SENSING_TIME_TAG)
        .and_then(|v| v.as_deref())
        .and_then(parse_sensing_time);
    if let Some((start, end)) = sensing {
        json_metadata.insert("sensing_start".to_string(), serde_json::Value::String(start));
        json_metadata.insert("sensing_end".to_string(), serde_json::Value::String(end));
    }
}

/// Write a JSON sidecar next to an image with its provenance and georeferencing
pub fn create_metadata_sidecar(
    output_path: &Path,
    granule: &Granule,
    metadata: &BTreeMap<String, String>,
    geotransform: [f64; 6],
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut json_metadata = convert_metadata_to_json(metadata);
    add_special_json_fields(&mut json_metadata, granule, geotransform);
    // Stable key order in the file
    let ordered: BTreeMap<_, _> = json_metadata.into_iter().collect();

    let sidecar_path = output_path.with_extension("json");
    let json_string = serde_json::to_string_pretty(&ordered)?;
    std::fs::write(&sidecar_path, json_string)?;

    info!("Created metadata sidecar: {:?}", sidecar_path);
    Ok(sidecar_path)
}
