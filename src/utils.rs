use std::fs::File;
use std::io::{self, ErrorKind, Read};
#[cfg(target_family = "unix")]
use std::os::fd::AsRawFd;

use num_complex::Complex;

/// Adds the per-bin power `|z|^2` of `src` into the running sums in `dest`.
/// Squares are taken in double precision so long windows do not lose low bits.
pub fn accumulate_power_add(dest: &mut [f64], src: &[Complex<f32>]) {
    debug_assert_eq!(dest.len(), src.len());
    for (acc, value) in dest.iter_mut().zip(src.iter()) {
        let re = f64::from(value.re);
        let im = f64::from(value.im);
        *acc += re * re + im * im;
    }
}

/// Total energy `sum |z|^2` of one vector.
pub fn block_energy(src: &[Complex<f32>]) -> f64 {
    src.iter()
        .map(|value| {
            let re = f64::from(value.re);
            let im = f64::from(value.im);
            re * re + im * im
        })
        .sum()
}

/// Reorders a natural-order spectrum so DC lands at index `len / 2`.
pub fn fft_shift<T: Copy>(natural: &[T]) -> Vec<T> {
    let len = natural.len();
    let split = len - len / 2;
    natural[split..]
        .iter()
        .chain(natural[..split].iter())
        .copied()
        .collect()
}

/// Signed bin offset from DC for natural DFT order.
pub fn natural_bin_offset(bin: usize, len: usize) -> isize {
    if bin < len - len / 2 {
        bin as isize
    } else {
        bin as isize - len as isize
    }
}

/// Fills `buffer` from `reader`, retrying interrupted reads. Returns the number
/// of bytes actually placed; anything short of `buffer.len()` means the stream
/// ran dry.
pub fn read_block_partial<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut total_read = 0usize;
    while total_read < buffer.len() {
        match reader.read(&mut buffer[total_read..]) {
            Ok(0) => break,
            Ok(n) => total_read += n,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total_read)
}

#[cfg(target_family = "unix")]
pub fn advise_file_sequential(file: &File) {
    let fd = file.as_raw_fd();
    unsafe {
        let _ = libc::posix_fadvise(fd, 0, 0, libc::POSIX_FADV_SEQUENTIAL);
    }
}

#[cfg(not(target_family = "unix"))]
pub fn advise_file_sequential(_file: &File) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Hands out at most `step` bytes per call and fails once with `Interrupted`.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
        interrupted: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn power_accumulates_in_double_precision() {
        let mut acc = vec![0.0f64; 2];
        let src = [Complex::new(3.0f32, 4.0), Complex::new(-1.0, 0.5)];
        accumulate_power_add(&mut acc, &src);
        accumulate_power_add(&mut acc, &src);
        assert!((acc[0] - 50.0).abs() < 1e-12);
        assert!((acc[1] - 2.5).abs() < 1e-12);
        assert!((block_energy(&src) - 26.25).abs() < 1e-12);
    }

    #[test]
    fn fft_shift_puts_dc_in_the_middle() {
        assert_eq!(fft_shift(&[0, 1, 2, 3]), vec![2, 3, 0, 1]);
        assert_eq!(fft_shift(&[0, 1, 2, 3, 4]), vec![3, 4, 0, 1, 2]);
        assert_eq!(fft_shift::<i32>(&[]), Vec::<i32>::new());
    }

    #[test]
    fn natural_offsets_wrap_to_negative_half() {
        let even: Vec<isize> = (0..4).map(|k| natural_bin_offset(k, 4)).collect();
        assert_eq!(even, vec![0, 1, -2, -1]);
        let odd: Vec<isize> = (0..5).map(|k| natural_bin_offset(k, 5)).collect();
        assert_eq!(odd, vec![0, 1, 2, -2, -1]);
    }

    #[test]
    fn partial_reads_are_stitched_together() {
        let mut reader = Trickle {
            data: (0u8..10).collect(),
            pos: 0,
            step: 3,
            interrupted: false,
        };
        let mut buf = [0u8; 8];
        assert_eq!(read_block_partial(&mut reader, &mut buf).unwrap(), 8);
        assert_eq!(buf, [0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(read_block_partial(&mut reader, &mut buf).unwrap(), 2);
    }

    #[test]
    fn empty_stream_reads_nothing() {
        let mut reader = Cursor::new(Vec::<u8>::new());
        let mut buf = [0u8; 4];
        assert_eq!(read_block_partial(&mut reader, &mut buf).unwrap(), 0);
    }
}
