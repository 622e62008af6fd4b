use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use tracing::warn;

/// Dimensions that bring the long side to `target_size`, keeping aspect ratio.
/// Images already smaller than the target keep their size.
pub fn calculate_resize_dimensions(
    original_cols: usize,
    original_rows: usize,
    target_size: usize,
) -> (usize, usize) {
    let short_side = original_rows.min(original_cols);
    let long_side = original_rows.max(original_cols);

    if target_size >= long_side {
        if target_size > long_side {
            warn!(
                "Browse size {} exceeds long side {}; keeping {}x{}",
                target_size, long_side, original_cols, original_rows
            );
        }
        return (original_cols, original_rows);
    }

    let scale_factor = target_size as f64 / long_side as f64;
    let new_short_side = ((short_side as f64 * scale_factor).round() as usize).max(1);

    if original_cols > original_rows {
        (target_size, new_short_side)
    } else {
        (new_short_side, target_size)
    }
}

pub fn resize_u8_image(
    data: &[u8],
    original_cols: usize,
    original_rows: usize,
    target_cols: usize,
    target_rows: usize,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let resize_options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));
    let mut resizer = Resizer::new();

    let src_image = Image::from_vec_u8(
        original_cols as u32,
        original_rows as u32,
        data.to_vec(),
        PixelType::U8,
    )?;
    let mut dst_image = Image::new(target_cols as u32, target_rows as u32, PixelType::U8);
    resizer.resize(&src_image, &mut dst_image, &resize_options)?;

    Ok(dst_image.into_vec())
}

/// Resize a grayscale image to `target_size` on its long side.
///
/// Returns the new (cols, rows, pixels). `None` or a target at least as large as
/// the image leaves it untouched.
pub fn resize_to_long_side(
    data: &[u8],
    cols: usize,
    rows: usize,
    target_size: Option<usize>,
) -> Result<(usize, usize, Vec<u8>), Box<dyn std::error::Error>> {
    let Some(target) = target_size else {
        return Ok((cols, rows, data.to_vec()));
    };
    let (new_cols, new_rows) = calculate_resize_dimensions(cols, rows, target);
    if (new_cols, new_rows) == (cols, rows) {
        return Ok((cols, rows, data.to_vec()));
    }
    let resized = resize_u8_image(data, cols, rows, new_cols, new_rows)?;
    Ok((new_cols, new_rows, resized))
}
