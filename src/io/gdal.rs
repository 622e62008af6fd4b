use gdal::raster::GdalType;
use gdal::{Dataset, Metadata, errors::GdalError as GdalCrateError};
use ndarray::Array2;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors encountered when reading a raster through GDAL
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported raster: {0}")]
    UnsupportedFormat(String),
    #[error("Pixel buffer holds {got} values, expected {rows}x{cols}")]
    DimensionMismatch { rows: usize, cols: usize, got: usize },
}

/// Georeferencing, nodata and tags of one raster file
#[derive(Debug, Clone)]
pub struct GdalMetadata {
    /// Width (pixels) of the raster
    pub size_x: usize,
    /// Height (lines) of the raster
    pub size_y: usize,
    pub bands: usize,
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    /// Projection in WKT format, empty when the raster has none
    pub projection: String,
    /// Nodata sentinel declared on the first band
    pub nodata: Option<f64>,
    /// Dataset-level tags (default domain)
    pub tags: HashMap<String, String>,
}

/// Reader for the single-band GeoTIFFs of a granule
pub struct GdalRasterReader {
    pub dataset: Dataset,
    pub metadata: GdalMetadata,
}

/// Extract an `EPSG:XXXX` label from the outermost WKT authority tag
pub fn parse_epsg(wkt: &str) -> Option<String> {
    const KEY: &str = "AUTHORITY[\"EPSG\",\"";
    let start = wkt.rfind(KEY)? + KEY.len();
    let end = wkt[start..].find('"')?;
    Some(format!("EPSG:{}", &wkt[start..start + end]))
}

fn default_domain_tags(dataset: &Dataset) -> HashMap<String, String> {
    dataset
        .metadata_domain("")
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| entry.split_once('='))
        .map(|(key, val)| (key.to_string(), val.to_string()))
        .collect()
}

impl GdalRasterReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GdalError> {
        let dataset = Dataset::open(path.as_ref())?;
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat(format!(
                "{} has no raster bands",
                path.as_ref().display()
            )));
        }
        let (size_x, size_y) = dataset.raster_size();
        // Rasters without georeferencing fall back to the identity transform
        let geotransform = dataset
            .geo_transform()
            .unwrap_or([0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let metadata = GdalMetadata {
            size_x: size_x as usize,
            size_y: size_y as usize,
            bands,
            geotransform,
            projection: dataset.projection(),
            nodata: dataset.rasterband(1)?.no_data_value(),
            tags: default_domain_tags(&dataset),
        };
        Ok(GdalRasterReader { dataset, metadata })
    }

    /// Read a band (1-based index) as an array of shape (rows, cols)
    pub fn read_band<T: GdalType + Copy>(&self, index: usize) -> Result<Array2<T>, GdalError> {
        if index == 0 || index > self.metadata.bands {
            return Err(GdalError::UnsupportedFormat(format!(
                "band {} out of range 1..={}",
                index, self.metadata.bands
            )));
        }
        let (rows, cols) = self.shape();
        let band = self.dataset.rasterband(index)?;
        let buf = band.read_as::<T>((0, 0), (cols, rows), (cols, rows), None)?;
        let values = buf.data().to_vec();
        let got = values.len();
        Array2::from_shape_vec((rows, cols), values)
            .map_err(|_| GdalError::DimensionMismatch { rows, cols, got })
    }

    /// Rows and columns of the raster, in ndarray order
    pub fn shape(&self) -> (usize, usize) {
        (self.metadata.size_y, self.metadata.size_x)
    }
}
