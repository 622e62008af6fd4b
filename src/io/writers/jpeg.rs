use jpeg_encoder::{ColorType, Encoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub fn write_gray_jpeg(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let width = u16::try_from(cols)?;
    let height = u16::try_from(rows)?;
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, 100);
    encoder.encode(data, width, height, ColorType::Luma)?;
    Ok(())
}
