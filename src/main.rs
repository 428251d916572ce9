mod args;
mod config;
mod doppler;
mod emitter;
mod error;
mod framer;
mod ifile;
mod integrator;
mod logging;
mod pipeline;
mod plot;
mod spectral;
mod utils;
mod xcf;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use clap::Parser;
use tracing::{info, warn};

use args::Args;
use config::CorrelatorConfig;
use doppler::frequency_for_velocity_hz;
use emitter::{Emitter, FrequencyAxis};
use error::{CorrelatorError, DynError};
use ifile::read_center_frequency;
use logging::init_logging;
use pipeline::Correlator;
use spectral::DirectDft;
use utils::advise_file_sequential;

const INPUT_BUFFER_BYTES: usize = 1 << 20;

fn open_input(path: &Path) -> Result<File, CorrelatorError> {
    let file = File::open(path).map_err(|source| CorrelatorError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    advise_file_sequential(&file);
    Ok(file)
}

fn create_output(path: &Path) -> Result<BufWriter<File>, CorrelatorError> {
    let file = File::create(path).map_err(|source| CorrelatorError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

fn build_correlator(backend: &str, config: CorrelatorConfig) -> Result<Correlator, CorrelatorError> {
    match backend {
        "rustfft" => Correlator::with_rustfft(config),
        "direct" => {
            let len = config.out_complex;
            Correlator::new(config, Box::new(DirectDft::new(len)))
        }
        other => Err(CorrelatorError::InvalidConfig(format!(
            "unknown transform backend '{other}'"
        ))),
    }
}

/// Center frequency in the configured unit, from `--velocity` or the side file.
fn resolve_center_frequency(args: &Args, config: &CorrelatorConfig) -> Result<f64, CorrelatorError> {
    match args.velocity {
        Some(velocity_kms) => {
            let hz = frequency_for_velocity_hz(velocity_kms);
            info!(velocity_kms, center_hz = hz, "center frequency derived from HI velocity");
            Ok(config.frequency_unit.from_hz(hz))
        }
        None => read_center_frequency(&args.freq_file),
    }
}

fn main() -> Result<(), DynError> {
    let args = Args::parse();
    init_logging(&args.log_config()?);

    let config = args.to_config()?;
    let input = open_input(&args.input)?;
    let center = resolve_center_frequency(&args, &config)?;
    let power_out = create_output(&args.power_out)?;
    let fft_out = create_output(&args.fft_out)?;

    let axis = FrequencyAxis::for_config(&config, center);
    let unit = config.frequency_unit;

    info!(
        input = %args.input.display(),
        power_out = %args.power_out.display(),
        fft_out = %args.fft_out.display(),
        "starting cross-correlation"
    );
    info!(
        samples_per_channel = config.out_complex,
        block_bytes = config.block_bytes(),
        window_blocks = config.window_blocks(),
        integration_s = config.integration_seconds,
        sample_rate_hz = config.sample_rate_hz,
        "framing"
    );
    info!(
        center = %format!("{:.6} {}", axis.center(), unit),
        bin_spacing = %format!("{} {}", axis.spacing(), unit),
        order = %config.spectrum_order,
        "frequency axis"
    );

    let mut emitter = Emitter::new(power_out, fft_out, axis);
    let mut correlator =
        build_correlator(&args.backend, config.clone())?.retain_history(args.plot);
    info!(backend = correlator.transform_name(), "spectral transform ready");

    let reader = BufReader::with_capacity(INPUT_BUFFER_BYTES, input);
    let summary = correlator.run(reader, &mut emitter)?;

    info!(
        blocks = summary.blocks,
        windows = summary.windows,
        rows = emitter.rows_written(),
        elapsed_s = summary.elapsed_seconds,
        discarded_blocks = summary.discarded_blocks,
        trailing_bytes = summary.trailing_bytes,
        "processing finished"
    );
    if summary.windows == 0 {
        warn!(
            needed_blocks = correlator.config().window_blocks(),
            got_blocks = summary.blocks,
            "input shorter than one integration window; no rows written"
        );
    }

    if args.plot {
        if summary.history.is_empty() {
            warn!("no completed windows; skipping plots");
        } else {
            let axis_hz: Vec<f64> = emitter
                .axis()
                .values()
                .iter()
                .map(|&f| unit.to_hz(f))
                .collect();
            let center_hz = unit.to_hz(emitter.axis().center());

            let power_png = args.plot_dir.join("power.png");
            plot::plot_power_series(&summary.history, &power_png)?;
            info!(path = %power_png.display(), "wrote power plot");

            let spectrum_png = args.plot_dir.join("spectrum.png");
            plot::plot_spectrum_stack(&summary.history, &axis_hz, center_hz, &spectrum_png)?;
            info!(path = %spectrum_png.display(), "wrote spectrum plot");
        }
    }

    Ok(())
}
