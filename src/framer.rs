use std::io::{self, Read};
use std::mem::size_of;

use num_complex::Complex;

use crate::config::{CHANNELS, FLOATS_PER_COMPLEX};
use crate::utils::read_block_partial;

/// One block of interleaved `I, Q` floats: channel A fills the first half,
/// channel B the second half, each as consecutive `(re, im)` pairs.
#[derive(Clone, Debug)]
pub struct SampleBlock {
    samples: Vec<f32>,
}

impl SampleBlock {
    /// `samples.len()` must be a multiple of four (two channels of I/Q pairs).
    pub fn from_floats(samples: Vec<f32>) -> Self {
        debug_assert_eq!(samples.len() % (CHANNELS * FLOATS_PER_COMPLEX), 0);
        Self { samples }
    }

    #[allow(dead_code)]
    pub fn as_floats(&self) -> &[f32] {
        &self.samples
    }

    /// Complex samples per channel.
    pub fn per_channel(&self) -> usize {
        self.samples.len() / (CHANNELS * FLOATS_PER_COMPLEX)
    }

    /// Copies the two channel vectors out of the block. Both outputs must hold
    /// exactly [`Self::per_channel`] values.
    pub fn split_channels(&self, chan_a: &mut [Complex<f32>], chan_b: &mut [Complex<f32>]) {
        let half = self.samples.len() / CHANNELS;
        debug_assert_eq!(chan_a.len(), self.per_channel());
        debug_assert_eq!(chan_b.len(), self.per_channel());
        let (raw_a, raw_b) = self.samples.split_at(half);
        for (dst, pair) in chan_a.iter_mut().zip(raw_a.chunks_exact(FLOATS_PER_COMPLEX)) {
            *dst = Complex::new(pair[0], pair[1]);
        }
        for (dst, pair) in chan_b.iter_mut().zip(raw_b.chunks_exact(FLOATS_PER_COMPLEX)) {
            *dst = Complex::new(pair[0], pair[1]);
        }
    }
}

/// Cuts a byte stream of little-endian `f32` into fixed-size [`SampleBlock`]s.
///
/// The block buffer is reused between calls. A short or empty read ends the
/// stream; the leftover byte count is kept for the run summary and never
/// decoded.
pub struct SampleFramer<R> {
    reader: R,
    raw: Vec<u8>,
    block: SampleBlock,
    blocks_read: u64,
    trailing_bytes: usize,
    exhausted: bool,
}

impl<R: Read> SampleFramer<R> {
    pub fn new(reader: R, block_floats: usize) -> Self {
        Self {
            reader,
            raw: vec![0u8; block_floats * size_of::<f32>()],
            block: SampleBlock::from_floats(vec![0.0; block_floats]),
            blocks_read: 0,
            trailing_bytes: 0,
            exhausted: false,
        }
    }

    pub fn next_block(&mut self) -> io::Result<Option<&SampleBlock>> {
        if self.exhausted {
            return Ok(None);
        }
        let filled = read_block_partial(&mut self.reader, &mut self.raw)?;
        if filled < self.raw.len() {
            self.exhausted = true;
            self.trailing_bytes = filled;
            return Ok(None);
        }
        for (dst, bytes) in self
            .block
            .samples
            .iter_mut()
            .zip(self.raw.chunks_exact(size_of::<f32>()))
        {
            *dst = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        self.blocks_read += 1;
        Ok(Some(&self.block))
    }

    pub fn blocks_read(&self) -> u64 {
        self.blocks_read
    }

    /// Bytes of an incomplete final block, valid once the stream has ended.
    pub fn trailing_bytes(&self) -> usize {
        self.trailing_bytes
    }
}
