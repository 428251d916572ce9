use std::fmt;
use std::mem::size_of;

use crate::error::{CorrelatorError, Result};

/// Complex samples per channel in one block.
pub const DEFAULT_OUT_COMPLEX: usize = 256;
/// Blocks delivered per second at 2 MS/s with 512 complex samples per block.
pub const DEFAULT_BLOCKS_PER_SECOND: usize = 3906;
pub const DEFAULT_INTEGRATION_SECONDS: u32 = 4;
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 2.0e6;

/// Number of channels multiplexed in each block.
pub const CHANNELS: usize = 2;
/// Real values per complex sample (I, Q).
pub const FLOATS_PER_COMPLEX: usize = 2;

/// Column order of the emitted spectrum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpectrumOrder {
    /// DC in column `N/2`, negative frequencies to the left.
    #[default]
    Centered,
    /// Raw DFT order: DC in column 0, negative frequencies in the upper half.
    Natural,
}

impl SpectrumOrder {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "centered" | "centred" | "shifted" => Ok(Self::Centered),
            "natural" | "raw" => Ok(Self::Natural),
            other => Err(CorrelatorError::InvalidConfig(format!(
                "unknown spectrum order '{other}' (expected centered or natural)"
            ))),
        }
    }
}

impl fmt::Display for SpectrumOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpectrumOrder::Centered => write!(f, "centered"),
            SpectrumOrder::Natural => write!(f, "natural"),
        }
    }
}

/// Unit shared by the center frequency, the header labels and the bin spacing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrequencyUnit {
    #[default]
    Hz,
    MHz,
}

impl FrequencyUnit {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hz" => Ok(Self::Hz),
            "mhz" => Ok(Self::MHz),
            other => Err(CorrelatorError::InvalidConfig(format!(
                "unknown frequency unit '{other}' (expected hz or mhz)"
            ))),
        }
    }

    pub fn hz_per_unit(self) -> f64 {
        match self {
            FrequencyUnit::Hz => 1.0,
            FrequencyUnit::MHz => 1.0e6,
        }
    }

    pub fn from_hz(self, hz: f64) -> f64 {
        hz / self.hz_per_unit()
    }

    pub fn to_hz(self, value: f64) -> f64 {
        value * self.hz_per_unit()
    }
}

impl fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrequencyUnit::Hz => write!(f, "Hz"),
            FrequencyUnit::MHz => write!(f, "MHz"),
        }
    }
}

/// Framing and integration parameters for one correlation run.
///
/// Built once (from the command line or [`Default`]) and validated before the
/// pipeline is constructed; every block size and window length downstream is
/// derived from it.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelatorConfig {
    pub out_complex: usize,
    pub blocks_per_second: usize,
    pub integration_seconds: u32,
    pub sample_rate_hz: f64,
    pub spectrum_order: SpectrumOrder,
    pub frequency_unit: FrequencyUnit,
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            out_complex: DEFAULT_OUT_COMPLEX,
            blocks_per_second: DEFAULT_BLOCKS_PER_SECOND,
            integration_seconds: DEFAULT_INTEGRATION_SECONDS,
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            spectrum_order: SpectrumOrder::default(),
            frequency_unit: FrequencyUnit::default(),
        }
    }
}

impl CorrelatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.out_complex == 0 {
            return Err(CorrelatorError::InvalidConfig(
                "complex samples per channel must be positive".into(),
            ));
        }
        if self.blocks_per_second == 0 {
            return Err(CorrelatorError::InvalidConfig(
                "blocks per second must be positive".into(),
            ));
        }
        if self.integration_seconds == 0 {
            return Err(CorrelatorError::InvalidConfig(
                "integration time must be at least one second".into(),
            ));
        }
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(CorrelatorError::InvalidConfig(format!(
                "sample rate must be positive and finite, got {}",
                self.sample_rate_hz
            )));
        }
        self.out_complex
            .checked_mul(CHANNELS * FLOATS_PER_COMPLEX * size_of::<f32>())
            .ok_or_else(|| {
                CorrelatorError::InvalidConfig(format!(
                    "block of {} complex samples per channel overflows",
                    self.out_complex
                ))
            })?;
        self.blocks_per_second
            .checked_mul(self.integration_seconds as usize)
            .ok_or_else(|| {
                CorrelatorError::InvalidConfig(format!(
                    "window of {} s at {} blocks/s overflows",
                    self.integration_seconds, self.blocks_per_second
                ))
            })?;
        Ok(())
    }

    /// Real values per block: two channels of interleaved I/Q.
    pub fn block_floats(&self) -> usize {
        self.out_complex * CHANNELS * FLOATS_PER_COMPLEX
    }

    pub fn block_bytes(&self) -> usize {
        self.block_floats() * size_of::<f32>()
    }

    /// Blocks integrated into one emitted row.
    pub fn window_blocks(&self) -> usize {
        self.blocks_per_second * self.integration_seconds as usize
    }

    pub fn integration_seconds_f64(&self) -> f64 {
        f64::from(self.integration_seconds)
    }

    /// Width of one DFT bin in [`Self::frequency_unit`].
    pub fn bin_spacing(&self) -> f64 {
        self.frequency_unit
            .from_hz(self.sample_rate_hz / self.out_complex as f64)
    }
}
