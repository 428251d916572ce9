use std::io::Write;

use crate::config::{CorrelatorConfig, SpectrumOrder};
use crate::error::Result;
use crate::integrator::WindowSummary;
use crate::utils::natural_bin_offset;

/// Frequency label of every spectrum column, fixed for the whole run.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyAxis {
    center: f64,
    spacing: f64,
    values: Vec<f64>,
}

impl FrequencyAxis {
    /// Labels `bins` columns laid out in `order` around `center`.
    ///
    /// Centered: `center + (k - bins/2) * spacing`.
    /// Natural: `center + k * spacing` for the lower half, wrapping to
    /// negative offsets in the upper half.
    pub fn new(center: f64, spacing: f64, bins: usize, order: SpectrumOrder) -> Self {
        let half = (bins / 2) as isize;
        let values = (0..bins)
            .map(|k| {
                let offset = match order {
                    SpectrumOrder::Centered => k as isize - half,
                    SpectrumOrder::Natural => natural_bin_offset(k, bins),
                };
                center + offset as f64 * spacing
            })
            .collect();
        Self {
            center,
            spacing,
            values,
        }
    }

    pub fn for_config(config: &CorrelatorConfig, center: f64) -> Self {
        Self::new(
            center,
            config.bin_spacing(),
            config.out_complex,
            config.spectrum_order,
        )
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Writes the power and spectrum time series.
///
/// Power rows are `"{t:.2} {p:.8}"`. The spectrum stream starts with a single
/// `time,f0,f1,...` header and then carries `"{t:.2},{v0:.8},..."` rows.
pub struct Emitter<P: Write, S: Write> {
    power: P,
    spectrum: S,
    axis: FrequencyAxis,
    header_written: bool,
    rows_written: u64,
}

impl<P: Write, S: Write> Emitter<P, S> {
    pub fn new(power: P, spectrum: S, axis: FrequencyAxis) -> Self {
        Self {
            power,
            spectrum,
            axis,
            header_written: false,
            rows_written: 0,
        }
    }

    pub fn axis(&self) -> &FrequencyAxis {
        &self.axis
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Writes the frequency header once; later calls are no-ops.
    pub fn write_header(&mut self) -> Result<()> {
        if self.header_written {
            return Ok(());
        }
        write!(self.spectrum, "time")?;
        for freq in self.axis.values() {
            write!(self.spectrum, ",{:.6}", freq)?;
        }
        writeln!(self.spectrum)?;
        self.header_written = true;
        Ok(())
    }

    pub fn write_window(&mut self, window: &WindowSummary) -> Result<()> {
        debug_assert_eq!(window.rms_spectrum.len(), self.axis.len());
        self.write_header()?;

        writeln!(
            self.power,
            "{:.2} {:.8}",
            window.elapsed_seconds, window.rms_power
        )?;

        write!(self.spectrum, "{:.2}", window.elapsed_seconds)?;
        for value in &window.rms_spectrum {
            write!(self.spectrum, ",{:.8}", value)?;
        }
        writeln!(self.spectrum)?;

        self.rows_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.power.flush()?;
        self.spectrum.flush()?;
        Ok(())
    }

    /// Flushes both streams and hands the writers back.
    #[allow(dead_code)]
    pub fn into_inner(mut self) -> Result<(P, S)> {
        self.flush()?;
        Ok((self.power, self.spectrum))
    }
}
