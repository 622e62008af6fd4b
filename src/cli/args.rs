use clap::Parser;
use std::path::PathBuf;

use hls_vi::Index;

#[derive(Parser)]
#[command(
    name = "hls-vi",
    version,
    about = "Generate vegetation index GeoTIFFs from HLS granules"
)]
pub struct CliArgs {
    /// Granule directory holding the band and Fmask GeoTIFFs (single granule mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory to write the index GeoTIFFs to (single granule mode)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Granule ID, e.g. HLS.L30.T06WVS.2024120T211159.v2.0.
    /// Defaults to the basename of --input
    #[arg(short = 's', long = "id")]
    pub id: Option<String>,

    /// Directory containing granule subdirectories (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output root for batch processing; each granule gets its own subdirectory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// JSON file with processing parameters; command-line flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Comma-separated indices to write (default: all)
    #[arg(long, value_enum, value_delimiter = ',', ignore_case = true)]
    pub indices: Option<Vec<Index>>,

    /// Skip the NDVI browse image
    #[arg(long, default_value_t = false)]
    pub no_browse: bool,

    /// Long side of the NDVI browse image in pixels, or "original"
    #[arg(long)]
    pub browse_size: Option<String>,

    /// Do not copy the granule's own browse JPEG to the output
    #[arg(long, default_value_t = false)]
    pub no_copy_browse: bool,

    /// Do not write the JSON sidecar next to the browse image
    #[arg(long, default_value_t = false)]
    pub no_sidecar: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Batch mode: continue with other granules when one fails
    #[arg(long, default_value_t = false)]
    pub batch: bool,
}
