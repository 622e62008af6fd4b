use tracing::info;
use tracing_subscriber::EnvFilter;

use hls_vi::ProcessingParams;
use hls_vi::api::{generate_vi_granule, process_directory_to_path};

use super::args::CliArgs;
use super::errors::AppError;

fn parse_browse_size(size: &str) -> Result<Option<usize>, AppError> {
    if size.eq_ignore_ascii_case("original") {
        return Ok(None);
    }
    let parsed = size.parse::<usize>().map_err(|_| AppError::InvalidSize {
        size: size.to_string(),
    })?;
    if parsed == 0 {
        return Err(AppError::ZeroSize { size: parsed });
    }
    Ok(Some(parsed))
}

/// Config file (if any) overlaid with command-line flags
fn build_params(args: &CliArgs) -> Result<ProcessingParams, AppError> {
    let mut params = match &args.config {
        Some(path) => ProcessingParams::from_json_file(path)?,
        None => ProcessingParams::default(),
    };
    if let Some(indices) = &args.indices {
        params.indices = indices.clone();
    }
    if let Some(size) = &args.browse_size {
        params.browse_size = parse_browse_size(size)?;
    }
    if args.no_browse {
        params.browse = false;
    }
    if args.no_copy_browse {
        params.copy_browse = false;
    }
    if args.no_sidecar {
        params.sidecar = false;
    }
    Ok(params)
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let params = build_params(&args)?;
    let batch_mode = args.batch || args.input_dir.is_some();

    if batch_mode {
        let input_dir = args.input_dir.ok_or(AppError::MissingArgument {
            arg: "--input-dir".to_string(),
        })?;
        let output_dir = args.output_dir.ok_or(AppError::MissingArgument {
            arg: "--output-dir".to_string(),
        })?;

        info!("Starting batch processing from directory: {:?}", input_dir);
        info!("Output directory: {:?}", output_dir);

        let report = process_directory_to_path(&input_dir, &output_dir, &params, args.batch)
            .map_err(AppError::from)?;
        if report.errors > 0 {
            return Err(AppError::BatchFailures {
                errors: report.errors,
            }
            .into());
        }
    } else {
        let input = args.input.ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        let output = args.output.ok_or(AppError::MissingArgument {
            arg: "--output".to_string(),
        })?;

        let outputs = generate_vi_granule(&input, &output, args.id.as_deref(), &params)
            .map_err(AppError::from)?;
        info!(
            "Successfully processed: {} -> {:?} ({} indices)",
            outputs.id,
            output,
            outputs.indices.len()
        );
    }

    Ok(())
}
