//! I/O layer for reading HLS granules and GDAL-backed rasters.
//! Provides the `hls` granule reader, `gdal` adapters, and `writers`
//! for GeoTIFF/JPEG outputs and metadata embedding/sidecars.
pub mod hls;
pub use hls::{HlsError, HlsReader};

pub mod gdal;
pub use gdal::{GdalError, GdalMetadata, GdalRasterReader};

pub mod writers;
