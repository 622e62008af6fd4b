use gdal::raster::{Buffer, ColorInterpretation, RasterCreationOptions};
use gdal::{Dataset, DriverManager};
use std::path::Path;

/// Georeferencing and storage attributes of a single-band output raster
#[derive(Debug, Clone, Copy)]
pub struct BandLayout<'a> {
    pub geotransform: [f64; 6],
    pub projection: &'a str,
    pub nodata: f64,
    pub scale: f64,
    pub offset: f64,
}

/// Write a deflate-compressed single-band `i16` GeoTIFF. The returned dataset
/// stays open so callers can attach metadata before it is flushed on drop.
pub fn write_tiff_i16(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[i16],
    layout: &BandLayout<'_>,
) -> Result<Dataset, Box<dyn std::error::Error>> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let options = RasterCreationOptions::from_iter(["COMPRESS=DEFLATE"]);
    let mut ds = driver.create_with_band_type_with_options::<i16, _>(output, cols, rows, 1, &options)?;

    ds.set_geo_transform(&layout.geotransform)?;
    if !layout.projection.is_empty() {
        ds.set_projection(layout.projection)?;
    }

    let mut band = ds.rasterband(1)?;
    band.set_color_interpretation(ColorInterpretation::GrayIndex)?;
    band.set_no_data_value(Some(layout.nodata))?;
    band.set_scale(layout.scale)?;
    band.set_offset(layout.offset)?;
    let mut buf = Buffer::new((cols, rows), data.to_vec());
    band.write((0, 0), (cols, rows), &mut buf)?;

    Ok(ds)
}
