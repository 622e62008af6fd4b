use ndarray::Array2;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::granule::{BandData, Granule, select_tags};
use crate::core::granule_id::{GranuleId, GranuleIdError};
use crate::core::masked::{MaskedArray, union_of_masks};
use crate::io::gdal::{GdalError, GdalRasterReader, parse_epsg};

/// Digital numbers per unit reflectance.
pub const REFLECTANCE_SCALE: f64 = 10_000.0;

/// Fmask bits that invalidate a pixel: cloud (1), adjacent to cloud/shadow (2)
/// and cloud shadow (3). Aerosol bits (6, 7) and the rest are ignored.
pub const CLOUD_LIKE_BITS: u8 = 0b0000_1110;

/// Errors encountered when reading an HLS granule directory
#[derive(Debug, Error)]
pub enum HlsError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalError),
    #[error(transparent)]
    GranuleId(#[from] GranuleIdError),
    #[error("Missing {kind} file: {}", .path.display())]
    MissingFile { kind: String, path: PathBuf },
    #[error("Shape mismatch in {}: expected {expected:?}, got {actual:?}", .path.display())]
    ShapeMismatch {
        path: PathBuf,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("Expected 6 reflectance bands, read {0}")]
    BandCount(usize),
    #[error("Cannot derive a granule ID from directory: {}", .0.display())]
    InvalidDirectory(PathBuf),
}

/// Reader for one HLS granule directory holding `{id}.{band}.tif` reflectance
/// rasters and an `{id}.Fmask.tif` quality raster
#[derive(Debug, Clone)]
pub struct HlsReader {
    pub base_path: PathBuf,
    pub id: GranuleId,
}

impl HlsReader {
    /// Open a granule directory. Without an explicit `id`, the directory's
    /// basename must be the granule ID.
    pub fn open<P: AsRef<Path>>(granule_dir: P, id: Option<&str>) -> Result<Self, HlsError> {
        let base = granule_dir.as_ref().to_path_buf();
        let id = match id {
            Some(id) => GranuleId::parse(id)?,
            None => {
                let name = base
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| HlsError::InvalidDirectory(base.clone()))?;
                GranuleId::parse(name)?
            }
        };
        info!("Opened granule {} at {:?}", id, base);
        Ok(HlsReader { base_path: base, id })
    }

    pub fn band_path(&self, band_code: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}.tif", self.id, band_code))
    }

    pub fn fmask_path(&self) -> PathBuf {
        self.base_path.join(format!("{}.Fmask.tif", self.id))
    }

    /// Companion browse image delivered with the granule, if any
    pub fn browse_path(&self) -> PathBuf {
        self.base_path.join(format!("{}.jpg", self.id))
    }

    /// Load, scale and mask all six bands into a [`Granule`].
    pub fn read_granule(&self) -> Result<Granule, HlsError> {
        let fmask_path = self.fmask_path();
        let fmask_reader = open_existing(&fmask_path, "Fmask")?;
        let fmask: Array2<u8> = fmask_reader.read_band(1)?;
        let expected = fmask.dim();
        debug!(
            "Fmask flags {} of {} pixels as cloud-like",
            cloud_mask(&fmask).iter().filter(|&&c| c).count(),
            fmask.len()
        );

        let mut bands = Vec::with_capacity(6);
        let mut first_meta = None;
        for (code, band) in self.id.instrument.bands() {
            let path = self.band_path(code);
            info!("Loading {} ({}) from {:?}", band, code, path);
            let reader = open_existing(&path, code)?;
            if reader.shape() != expected {
                return Err(HlsError::ShapeMismatch {
                    path,
                    expected,
                    actual: reader.shape(),
                });
            }
            let raw: Array2<f64> = reader.read_band(1)?;
            let mut data = reflectance_from_dn(raw, reader.metadata.nodata);
            apply_fmask(&mut data, &fmask);
            debug!("{}: {} masked pixels", band, data.count_masked());
            bands.push(data);
            // Every band shares CRS, transform and tags; keep the first band's
            if first_meta.is_none() {
                first_meta = Some(reader.metadata);
            }
        }

        union_of_masks(&mut bands);
        let count = bands.len();
        let bands: [MaskedArray; 6] = bands.try_into().map_err(|_| HlsError::BandCount(count))?;
        let data = BandData::new(bands).ok_or(HlsError::BandCount(count))?;
        let meta = first_meta.ok_or(HlsError::BandCount(0))?;

        info!(
            "Granule {}: {}x{} pixels, CRS {}",
            self.id,
            meta.size_x,
            meta.size_y,
            parse_epsg(&meta.projection).unwrap_or_else(|| "unknown".to_string())
        );

        Ok(Granule {
            tags: select_tags(&self.id, &meta.tags),
            id: self.id.clone(),
            crs: meta.projection,
            transform: meta.geotransform,
            data,
        })
    }
}

fn open_existing(path: &Path, kind: &str) -> Result<GdalRasterReader, HlsError> {
    if !path.is_file() {
        return Err(HlsError::MissingFile {
            kind: kind.to_string(),
            path: path.to_path_buf(),
        });
    }
    Ok(GdalRasterReader::open(path)?)
}

/// Convert digital numbers to reflectance.
///
/// Pixels equal to `nodata` are masked and keep their raw value. Pixels with
/// reflectance <= 0 or a non-finite value are masked; reflectance above 1.0 is
/// kept as valid.
pub fn reflectance_from_dn(raw: Array2<f64>, nodata: Option<f64>) -> MaskedArray {
    let is_nodata = |v: f64| nodata.is_some_and(|nd| v == nd || (nd.is_nan() && v.is_nan()));
    let nodata_mask = raw.mapv(is_nodata);
    let mut band = MaskedArray::valid(raw.mapv(|v| if is_nodata(v) { v } else { v / REFLECTANCE_SCALE }));
    band.or_mask(&nodata_mask);
    band.mask_where(|v| !v.is_finite() || v <= 0.0);
    band
}

/// Cloud-like pixels of an Fmask raster.
pub fn cloud_mask(fmask: &Array2<u8>) -> Array2<bool> {
    fmask.mapv(|flags| flags & CLOUD_LIKE_BITS != 0)
}

/// OR the Fmask cloud-like flags into a band's mask.
pub fn apply_fmask(band: &mut MaskedArray, fmask: &Array2<u8>) {
    band.or_mask(&cloud_mask(fmask));
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_reflectance_scaling_and_masking() {
        let raw = array![[42.0, -9999.0, -1.0, 0.0, 10_001.0]];
        let band = reflectance_from_dn(raw, Some(-9999.0));
        assert_eq!(band.mask, array![[false, true, true, true, false]]);
        assert_eq!(band.data[[0, 0]], 0.0042);
        // nodata keeps its raw value
        assert_eq!(band.data[[0, 1]], -9999.0);
        assert_eq!(band.data[[0, 2]], -0.0001);
        assert_eq!(band.data[[0, 4]], 1.0001);
    }

    #[test]
    fn test_reflectance_without_nodata() {
        let band = reflectance_from_dn(array![[-9999.0, 5.0]], None);
        assert_eq!(band.mask, array![[true, false]]);
        assert_eq!(band.data[[0, 0]], -0.9999);
    }

    #[test]
    fn test_non_finite_values_are_masked() {
        let band = reflectance_from_dn(array![[f64::NAN, f64::INFINITY, 42.0]], None);
        assert_eq!(band.mask, array![[true, true, false]]);

        // A NaN nodata sentinel matches NaN pixels and keeps them raw
        let band = reflectance_from_dn(array![[f64::NAN, 42.0]], Some(f64::NAN));
        assert_eq!(band.mask, array![[true, false]]);
        assert!(band.data[[0, 0]].is_nan());
    }

    #[test]
    fn test_nan_band_spreads_through_union() {
        let mut bands = vec![
            reflectance_from_dn(array![[f64::NAN, 42.0]], Some(-9999.0)),
            reflectance_from_dn(array![[42.0, 42.0]], Some(-9999.0)),
        ];
        union_of_masks(&mut bands);
        assert_eq!(bands[1].mask, array![[true, false]]);
    }

    #[test]
    fn test_fmask_bits() {
        let fmask = array![[0b0000_0000u8, 0b0000_0010, 0b0000_0100, 0b0000_1000, 0b0000_1110, 0b1100_0000, 0b0011_0001]];
        assert_eq!(
            cloud_mask(&fmask),
            array![[false, true, true, true, true, false, false]]
        );

        let mut band = MaskedArray::valid(Array2::from_elem((1, 7), 0.0042));
        apply_fmask(&mut band, &fmask);
        assert_eq!(band.mask, cloud_mask(&fmask));
    }

    #[test]
    fn test_open_derives_id_from_directory_name() {
        let reader = HlsReader::open("/data/HLS.S30.T01GEL.2024288T213749.v2.0", None).unwrap();
        assert_eq!(reader.id.tile_id, "T01GEL");
        assert_eq!(
            reader.band_path("B8A"),
            PathBuf::from("/data/HLS.S30.T01GEL.2024288T213749.v2.0/HLS.S30.T01GEL.2024288T213749.v2.0.B8A.tif")
        );
        assert!(reader.fmask_path().ends_with("HLS.S30.T01GEL.2024288T213749.v2.0.Fmask.tif"));
    }

    #[test]
    fn test_open_rejects_bad_directory_name() {
        let err = HlsReader::open("/data/not-a-granule", None).unwrap_err();
        assert!(matches!(err, HlsError::GranuleId(_)));
    }

    #[test]
    fn test_missing_fmask_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let reader = HlsReader::open(dir.path(), Some("HLS.L30.T06WVS.2024120T211159.v2.0")).unwrap();
        match reader.read_granule() {
            Err(HlsError::MissingFile { kind, path }) => {
                assert_eq!(kind, "Fmask");
                assert_eq!(path, reader.fmask_path());
            }
            other => panic!("expected missing Fmask, got {other:?}"),
        }
    }
}
