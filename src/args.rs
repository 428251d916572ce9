use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    CorrelatorConfig, FrequencyUnit, SpectrumOrder, DEFAULT_BLOCKS_PER_SECOND,
    DEFAULT_INTEGRATION_SECONDS, DEFAULT_OUT_COMPLEX, DEFAULT_SAMPLE_RATE_HZ,
};
use crate::error::{CorrelatorError, Result};
use crate::logging::{LogConfig, LogFormat};

pub const DEFAULT_INPUT: &str = "RX_AB.dat";
pub const DEFAULT_FREQ_FILE: &str = "freq.dat";
pub const DEFAULT_POWER_OUT: &str = "power.dat";
pub const DEFAULT_FFT_OUT: &str = "fft.dat";

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Two-channel cross-power and cross-spectrum integrator",
    long_about = None,
    after_help = "Examples:\n  xspec\n  xspec --input obs/RX_AB.dat --freq-file obs/freq.dat --power-out obs/power.dat --fft-out obs/fft.dat\n  xspec --velocity 35.2 --integ 10 --plot\n  xspec --fft 512 --blocks-per-second 1953 --order natural\n"
)]
pub struct Args {
    /// Raw capture: little-endian f32, channel A then channel B per block
    #[arg(long, short = 'i', default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Text file holding the center frequency (first number in the file)
    #[arg(long = "freq-file", visible_alias = "freq", default_value = DEFAULT_FREQ_FILE)]
    pub freq_file: PathBuf,

    /// Output for the integrated power time series
    #[arg(long = "power-out", default_value = DEFAULT_POWER_OUT)]
    pub power_out: PathBuf,

    /// Output for the integrated spectrum time series
    #[arg(long = "fft-out", default_value = DEFAULT_FFT_OUT)]
    pub fft_out: PathBuf,

    /// Complex samples per channel per block (also the DFT length)
    #[arg(long, default_value_t = DEFAULT_OUT_COMPLEX)]
    pub fft: usize,

    /// Blocks delivered per second by the capture
    #[arg(long = "blocks-per-second", default_value_t = DEFAULT_BLOCKS_PER_SECOND)]
    pub blocks_per_second: usize,

    /// Integration time per output row in seconds
    #[arg(long, visible_alias = "integration", default_value_t = DEFAULT_INTEGRATION_SECONDS)]
    pub integ: u32,

    /// Sample rate of the capture in MHz
    #[arg(long = "sampling", visible_alias = "fs", default_value_t = DEFAULT_SAMPLE_RATE_HZ / 1.0e6)]
    pub sampling: f64,

    /// Column order of the spectrum output
    #[arg(
        long,
        default_value = "centered",
        value_parser = clap::builder::PossibleValuesParser::new(["centered", "natural"])
    )]
    pub order: String,

    /// Unit of the center frequency and of the spectrum header
    #[arg(
        long = "freq-unit",
        default_value = "hz",
        value_parser = clap::builder::PossibleValuesParser::new(["hz", "mhz"])
    )]
    pub freq_unit: String,

    /// Spectral transform backend
    #[arg(
        long,
        default_value = "rustfft",
        value_parser = clap::builder::PossibleValuesParser::new(["rustfft", "direct"])
    )]
    pub backend: String,

    /// HI recession velocity in km/s; derives the center frequency instead of reading --freq-file
    #[arg(long, allow_hyphen_values = true)]
    pub velocity: Option<f64>,

    /// Render power.png and spectrum.png after the run
    #[arg(long)]
    pub plot: bool,

    /// Directory for rendered plots
    #[arg(long = "plot-dir", default_value = ".")]
    pub plot_dir: PathBuf,

    /// Log layout
    #[arg(
        long = "log-format",
        default_value = "compact",
        value_parser = clap::builder::PossibleValuesParser::new(["compact", "pretty"])
    )]
    pub log_format: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn to_config(&self) -> Result<CorrelatorConfig> {
        let config = CorrelatorConfig {
            out_complex: self.fft,
            blocks_per_second: self.blocks_per_second,
            integration_seconds: self.integ,
            sample_rate_hz: self.sampling * 1.0e6,
            spectrum_order: SpectrumOrder::parse(&self.order)?,
            frequency_unit: FrequencyUnit::parse(&self.freq_unit)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn log_config(&self) -> Result<LogConfig> {
        let format = LogFormat::parse(&self.log_format).ok_or_else(|| {
            CorrelatorError::InvalidConfig(format!("unknown log format '{}'", self.log_format))
        })?;
        Ok(LogConfig::from_verbosity(self.verbose, format))
    }
}
