use std::io;

/// Strips Annex-B emulation-prevention bytes from the underlying reader as it is consumed.
///
/// Whenever two consecutive zero bytes have just been read and the next byte
/// is `0x03`, that `0x03` is dropped and counted in [`EmulationPreventionIo::epb_count`]
/// instead of being handed to the caller. This can only trigger once at least
/// two bytes have already been produced, which is exactly the "offset >= 24 bits
/// into the current NAL" condition once the two leading zero bytes and the
/// elided byte itself are accounted for.
pub struct EmulationPreventionIo<I> {
    inner: I,
    zero_run: u8,
    epb_count: u64,
}

impl<I> EmulationPreventionIo<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            zero_run: 0,
            epb_count: 0,
        }
    }

    /// Number of emulation-prevention bytes elided so far.
    pub fn epb_count(&self) -> u64 {
        self.epb_count
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: io::Read> io::Read for EmulationPreventionIo<I> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut one = [0u8; 1];
        for (written, slot) in buf.iter_mut().enumerate() {
            loop {
                let n = self.inner.read(&mut one)?;
                if n == 0 {
                    return Ok(written);
                }

                if self.zero_run >= 2 && one[0] == 0x03 {
                    self.epb_count += 1;
                    self.zero_run = 0;
                    continue;
                }

                self.zero_run = if one[0] == 0x00 { self.zero_run + 1 } else { 0 };
                *slot = one[0];
                break;
            }
        }
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn elides_single_epb() {
        let mut io = EmulationPreventionIo::new(&[0x00u8, 0x00, 0x03, 0x41][..]);
        let mut out = [0u8; 3];
        io.read_exact(&mut out).unwrap();
        assert_eq!(out, [0x00, 0x00, 0x41]);
        assert_eq!(io.epb_count(), 1);
    }

    #[test]
    fn leaves_short_runs_alone() {
        let mut io = EmulationPreventionIo::new(&[0x00u8, 0x03, 0x01][..]);
        let mut out = [0u8; 3];
        io.read_exact(&mut out).unwrap();
        assert_eq!(out, [0x00, 0x03, 0x01]);
        assert_eq!(io.epb_count(), 0);
    }

    #[test]
    fn does_not_elide_real_0x03_after_reset_run() {
        // 00 00 03 00 00 03 -> both 0x03s are emulation prevention bytes.
        let mut io = EmulationPreventionIo::new(&[0x00u8, 0x00, 0x03, 0x00, 0x00, 0x03, 0x05][..]);
        let mut out = [0u8; 5];
        io.read_exact(&mut out).unwrap();
        assert_eq!(out, [0x00, 0x00, 0x00, 0x00, 0x05]);
        assert_eq!(io.epb_count(), 2);
    }
}
