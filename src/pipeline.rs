use std::io::{Read, Write};

use num_complex::Complex;
use tracing::{debug, warn};

use crate::config::CorrelatorConfig;
use crate::emitter::Emitter;
use crate::error::{CorrelatorError, Result};
use crate::framer::SampleFramer;
use crate::integrator::{Integrator, WindowSummary};
use crate::spectral::{RustFftTransform, SpectralTransform};
use crate::xcf::cross_multiply;

/// Outcome of one pass over the input stream.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    pub blocks: u64,
    pub windows: u64,
    /// Blocks of the final, incomplete window that produced no row.
    pub discarded_blocks: usize,
    /// Bytes after the last complete block.
    pub trailing_bytes: usize,
    pub elapsed_seconds: f64,
    /// Emitted windows, kept only when history retention is enabled.
    pub history: Vec<WindowSummary>,
}

/// Single-threaded streaming correlator: frame, cross-multiply, transform,
/// integrate, and emit a row at every window boundary.
pub struct Correlator {
    config: CorrelatorConfig,
    transform: Box<dyn SpectralTransform>,
    retain_history: bool,
}

impl Correlator {
    pub fn new(config: CorrelatorConfig, transform: Box<dyn SpectralTransform>) -> Result<Self> {
        config.validate()?;
        if transform.len() != config.out_complex {
            return Err(CorrelatorError::InvalidConfig(format!(
                "{} transform has length {} but blocks carry {} samples per channel",
                transform.name(),
                transform.len(),
                config.out_complex
            )));
        }
        Ok(Self {
            config,
            transform,
            retain_history: false,
        })
    }

    pub fn with_rustfft(config: CorrelatorConfig) -> Result<Self> {
        let transform = Box::new(RustFftTransform::new(config.out_complex));
        Self::new(config, transform)
    }

    /// Keep every emitted window in [`RunSummary::history`].
    pub fn retain_history(mut self, retain: bool) -> Self {
        self.retain_history = retain;
        self
    }

    pub fn config(&self) -> &CorrelatorConfig {
        &self.config
    }

    pub fn transform_name(&self) -> &'static str {
        self.transform.name()
    }

    pub fn run<R, P, S>(&mut self, reader: R, emitter: &mut Emitter<P, S>) -> Result<RunSummary>
    where
        R: Read,
        P: Write,
        S: Write,
    {
        let n = self.config.out_complex;
        let mut framer = SampleFramer::new(reader, self.config.block_floats());
        let mut integrator = Integrator::new(&self.config);

        let mut chan_a = vec![Complex::new(0.0f32, 0.0); n];
        let mut chan_b = vec![Complex::new(0.0f32, 0.0); n];
        let mut z = vec![Complex::new(0.0f32, 0.0); n];
        let mut spectrum = vec![Complex::new(0.0f32, 0.0); n];
        let mut history = Vec::new();

        emitter.write_header()?;

        while let Some(block) = framer.next_block()? {
            block.split_channels(&mut chan_a, &mut chan_b);
            cross_multiply(&chan_a, &chan_b, &mut z);
            spectrum.copy_from_slice(&z);
            self.transform.forward(&mut spectrum)?;

            if let Some(window) = integrator.accumulate(&z, &spectrum) {
                emitter.write_window(&window)?;
                debug!(
                    window = window.index,
                    bins = window.rms_spectrum.len(),
                    elapsed_s = window.elapsed_seconds,
                    rms_power = window.rms_power,
                    "wrote window"
                );
                if self.retain_history {
                    history.push(window);
                }
            }
        }

        debug!(
            pending_blocks = integrator.pending_blocks(),
            blocks = framer.blocks_read(),
            "input exhausted"
        );
        let discarded_blocks = integrator.discard_partial();
        let trailing_bytes = framer.trailing_bytes();
        if discarded_blocks > 0 || trailing_bytes > 0 {
            warn!(
                discarded_blocks,
                window_blocks = self.config.window_blocks(),
                trailing_bytes,
                "input ended inside an integration window; partial data dropped"
            );
        }
        emitter.flush()?;

        Ok(RunSummary {
            blocks: framer.blocks_read(),
            windows: integrator.windows_emitted(),
            discarded_blocks,
            trailing_bytes,
            elapsed_seconds: integrator.elapsed_seconds(),
            history,
        })
    }
}
