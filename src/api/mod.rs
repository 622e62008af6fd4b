//! High-level library API: read an HLS granule directory, write one GeoTIFF per
//! vegetation index with provenance tags, render the NDVI browse image, and batch
//! helpers for directories of granules. Prefer these entrypoints over the
//! low-level `core` and `io` modules when integrating HLS-VI.
use std::path::{Path, PathBuf};

use chrono::Utc;
use ndarray::Array2;
use tracing::{info, warn};

use crate::core::granule::Granule;
use crate::core::granule_id::GranuleId;
use crate::core::indices::FILL_VALUE;
use crate::core::params::ProcessingParams;
use crate::core::processing::browse::stretch_to_u8;
use crate::core::processing::resize::resize_to_long_side;
use crate::error::{Error, Result};
use crate::io::HlsReader;
use crate::io::writers::jpeg::write_gray_jpeg;
use crate::io::writers::metadata::{
    create_metadata_sidecar, embed_tiff_metadata, index_metadata_fields, processing_timestamp,
};
use crate::io::writers::tiff::{BandLayout, write_tiff_i16};
use crate::io::writers::worldfile::{write_prj_file, write_world_file};
use crate::types::Index;

/// Files produced for one granule
#[derive(Debug, Clone)]
pub struct GranuleOutputs {
    pub id: GranuleId,
    pub indices: Vec<PathBuf>,
    pub browse: Option<PathBuf>,
    pub companion_browse: Option<PathBuf>,
}

/// File name of an index raster, e.g. `HLS-VI.L30.T06WVS.2024120T211159.v2.0.NDVI.tif`
pub fn index_file_name(id: &GranuleId, index: Index) -> String {
    format!("{}.{}.tif", id.vi_name(), index)
}

/// File name of the NDVI browse image
pub fn browse_file_name(id: &GranuleId) -> String {
    format!("{}.{}.jpg", id.vi_name(), Index::Ndvi)
}

/// Read, scale and mask the six bands of a granule directory.
/// Without `id`, the directory's basename is parsed as the granule ID.
pub fn read_granule(input_dir: &Path, id: Option<&str>) -> Result<Granule> {
    let reader = HlsReader::open(input_dir, id)?;
    Ok(reader.read_granule()?)
}

/// Compute one index and write it as a tagged `i16` GeoTIFF under `output_dir`.
/// Returns the written path together with the stored values.
pub fn write_granule_index(
    output_dir: &Path,
    granule: &Granule,
    index: Index,
    processing_time: &str,
) -> Result<(PathBuf, Array2<i16>)> {
    let stored = index.compute(&granule.data);
    let (rows, cols) = stored.dim();
    let output = output_dir.join(index_file_name(&granule.id, index));

    let layout = BandLayout {
        geotransform: granule.transform,
        projection: &granule.crs,
        nodata: index.fill_value() as f64,
        scale: index.scale_factor(),
        offset: 0.0,
    };
    let values: Vec<i16> = stored.iter().copied().collect();
    let mut ds = write_tiff_i16(&output, cols, rows, &values, &layout).map_err(Error::external)?;
    let fields = index_metadata_fields(granule, index, processing_time);
    embed_tiff_metadata(&mut ds, &fields).map_err(Error::external)?;
    drop(ds);

    info!("Wrote {} to {:?}", index, output);
    Ok((output, stored))
}

/// Write every index selected in `params` for a granule already in memory.
pub fn write_granule_indices(
    output_dir: &Path,
    granule: &Granule,
    params: &ProcessingParams,
    processing_time: &str,
) -> Result<GranuleOutputs> {
    std::fs::create_dir_all(output_dir)?;

    let mut outputs = GranuleOutputs {
        id: granule.id.clone(),
        indices: Vec::with_capacity(params.indices.len()),
        browse: None,
        companion_browse: None,
    };
    if params.indices.is_empty() {
        warn!("No indices selected for {}", granule.id);
    }

    let mut ndvi = None;
    for index in params.selected_indices() {
        let (path, stored) = write_granule_index(output_dir, granule, index, processing_time)?;
        outputs.indices.push(path);
        if index == Index::Ndvi {
            ndvi = Some(stored);
        }
    }

    if params.browse {
        let ndvi = ndvi.unwrap_or_else(|| Index::Ndvi.compute(&granule.data));
        let path = write_ndvi_browse(output_dir, granule, &ndvi, params, processing_time)?;
        outputs.browse = Some(path);
    }

    Ok(outputs)
}

/// Render stored NDVI values as a grayscale JPEG with world, projection and
/// (optionally) JSON sidecar files.
pub fn write_ndvi_browse(
    output_dir: &Path,
    granule: &Granule,
    ndvi: &Array2<i16>,
    params: &ProcessingParams,
    processing_time: &str,
) -> Result<PathBuf> {
    let (rows, cols) = ndvi.dim();
    let gray = stretch_to_u8(ndvi, FILL_VALUE);
    let (new_cols, new_rows, gray) =
        resize_to_long_side(&gray, cols, rows, params.browse_size).map_err(Error::external)?;

    let output = output_dir.join(browse_file_name(&granule.id));
    write_gray_jpeg(&output, new_cols, new_rows, &gray).map_err(Error::external)?;

    let mut geotransform = granule.transform;
    geotransform[1] *= cols as f64 / new_cols as f64;
    geotransform[5] *= rows as f64 / new_rows as f64;
    write_world_file(&output, geotransform).map_err(Error::external)?;
    if !granule.crs.is_empty() {
        write_prj_file(&output, &granule.crs).map_err(Error::external)?;
    }
    if params.sidecar {
        let fields = index_metadata_fields(granule, Index::Ndvi, processing_time);
        create_metadata_sidecar(&output, granule, &fields, geotransform)
            .map_err(Error::external)?;
    }

    info!("Wrote NDVI browse {}x{} to {:?}", new_cols, new_rows, output);
    Ok(output)
}

/// Copy the browse image delivered with the granule, renamed to the VI product
/// name. Returns `None` when the granule has no browse image.
pub fn copy_companion_browse(
    reader: &HlsReader,
    output_dir: &Path,
) -> Result<Option<PathBuf>> {
    let source = reader.browse_path();
    if !source.is_file() {
        warn!("No companion browse image at {:?}", source);
        return Ok(None);
    }
    let target = output_dir.join(format!("{}.jpg", reader.id.vi_name()));
    std::fs::copy(&source, &target)?;
    info!("Copied browse image to {:?}", target);
    Ok(Some(target))
}

/// Generate all selected vegetation indices for one granule directory.
pub fn generate_vi_granule(
    input_dir: &Path,
    output_dir: &Path,
    id: Option<&str>,
    params: &ProcessingParams,
) -> Result<GranuleOutputs> {
    params.validate()?;
    let reader = HlsReader::open(input_dir, id)?;
    let granule = reader.read_granule()?;
    let processing_time = processing_timestamp(Utc::now());

    let mut outputs = write_granule_indices(output_dir, &granule, params, &processing_time)?;
    if params.copy_browse {
        outputs.companion_browse = copy_companion_browse(&reader, output_dir)?;
    }

    let (rows, cols) = granule.dim();
    info!(
        "Granule {} ({}x{}): wrote {} index rasters to {:?}",
        granule.id,
        cols,
        rows,
        outputs.indices.len(),
        output_dir
    );
    Ok(outputs)
}

/// Batch processing report
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Immediate subdirectories of `input_dir` (candidate granule directories), sorted by name
pub fn iterate_granule_dirs(input_dir: &Path) -> Result<std::vec::IntoIter<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs.into_iter())
}

/// Process every granule subdirectory of `input_dir` into
/// `{output_dir}/{HLS-VI name}/`. Subdirectories whose name is not a granule ID
/// are skipped. If `continue_on_error` is true, failures are counted in the
/// report and processing continues; otherwise the first error is returned.
pub fn process_directory_to_path(
    input_dir: &Path,
    output_dir: &Path,
    params: &ProcessingParams,
    continue_on_error: bool,
) -> Result<BatchReport> {
    params.validate()?;
    std::fs::create_dir_all(output_dir)?;

    let mut report = BatchReport::default();
    for path in iterate_granule_dirs(input_dir)? {
        let Some(id) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| GranuleId::parse(n).ok())
        else {
            warn!("Skipping {:?}: not a granule directory", path);
            report.skipped += 1;
            continue;
        };

        let granule_output = output_dir.join(id.vi_name());
        match generate_vi_granule(&path, &granule_output, None, params) {
            Ok(_) => report.processed += 1,
            Err(e) => {
                report.errors += 1;
                warn!("Failed to process {}: {}", id, e);
                if !continue_on_error {
                    return Err(e);
                }
            }
        }
    }

    info!(
        "Batch complete: {} processed, {} skipped, {} errors",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}
