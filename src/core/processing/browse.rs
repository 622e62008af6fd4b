use ndarray::Array2;

/// Stretch stored index values to 8-bit grayscale for a browse image.
///
/// Valid values are mapped linearly from their min..max onto 1..=255; fill
/// pixels become 0. A constant image maps to 255.
pub fn stretch_to_u8(stored: &Array2<i16>, fill_value: i16) -> Vec<u8> {
    let valid = stored.iter().copied().filter(|&v| v != fill_value);
    let (min, max) = valid.fold((i16::MAX, i16::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = max as f64 - min as f64;

    stored
        .iter()
        .map(|&v| {
            if v == fill_value {
                0
            } else if span <= 0.0 {
                255
            } else {
                let t = (v as f64 - min as f64) / span;
                (1.0 + t * 254.0).round() as u8
            }
        })
        .collect()
}
