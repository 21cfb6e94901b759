//! Exponential-Golomb coding for [`scuffle_bytes_util::BitReader`]/[`scuffle_bytes_util::BitWriter`].
//!
//! <https://en.wikipedia.org/wiki/Exponential-Golomb_coding>

use std::io;

use scuffle_bytes_util::{BitReader, BitWriter};

/// Extension trait adding unsigned/signed exp-Golomb reads to any [`BitReader`].
pub trait BitReaderExpGolombExt {
    /// Reads an unsigned exp-Golomb code (`ue(v)`).
    fn read_exp_golomb(&mut self) -> io::Result<u64>;

    /// Reads a signed exp-Golomb code (`se(v)`): `ue=0 -> 0`, `1 -> 1`, `2 -> -1`, `3 -> 2`, ...
    fn read_signed_exp_golomb(&mut self) -> io::Result<i64>;
}

impl<R: io::Read> BitReaderExpGolombExt for BitReader<R> {
    fn read_exp_golomb(&mut self) -> io::Result<u64> {
        let mut leading_zeros = 0u32;
        while !self.read_bit()? {
            leading_zeros += 1;
            if leading_zeros >= 63 {
                return Err(io::Error::new(io::ErrorKind::InvalidData, "exp-golomb code too long"));
            }
        }

        if leading_zeros == 0 {
            return Ok(0);
        }

        let suffix = self.read_bits(leading_zeros)?;
        Ok((1u64 << leading_zeros) - 1 + suffix)
    }

    fn read_signed_exp_golomb(&mut self) -> io::Result<i64> {
        let code = self.read_exp_golomb()?;
        let magnitude = ((code + 1) / 2) as i64;
        if code % 2 == 1 { Ok(magnitude) } else { Ok(-magnitude) }
    }
}

/// Extension trait adding unsigned/signed exp-Golomb writes to any [`BitWriter`].
pub trait BitWriterExpGolombExt {
    fn write_exp_golomb(&mut self, value: u64) -> io::Result<()>;
    fn write_signed_exp_golomb(&mut self, value: i64) -> io::Result<()>;
}

impl<W: io::Write> BitWriterExpGolombExt for BitWriter<W> {
    fn write_exp_golomb(&mut self, value: u64) -> io::Result<()> {
        let code_num = value + 1;
        let leading_zeros = 63 - code_num.leading_zeros();
        for _ in 0..leading_zeros {
            self.write_bit(false)?;
        }
        self.write_bits(code_num, leading_zeros + 1)
    }

    fn write_signed_exp_golomb(&mut self, value: i64) -> io::Result<()> {
        let code = if value <= 0 {
            (-value as u64) * 2
        } else {
            (value as u64) * 2 - 1
        };
        self.write_exp_golomb(code)
    }
}

/// Returns the number of bits `ue(value)` occupies.
pub fn size_of_exp_golomb(value: u64) -> u64 {
    let code_num = value + 1;
    let leading_zeros = 63 - code_num.leading_zeros() as u64;
    2 * leading_zeros + 1
}

/// Returns the number of bits `se(value)` occupies.
pub fn size_of_signed_exp_golomb(value: i64) -> u64 {
    let code = if value <= 0 {
        (-value as u64) * 2
    } else {
        (value as u64) * 2 - 1
    };
    size_of_exp_golomb(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_unsigned() {
        for value in [0u64, 1, 2, 3, 7, 8, 255, 1_000_000] {
            let mut buf = Vec::new();
            {
                let mut writer = BitWriter::new(&mut buf);
                writer.write_exp_golomb(value).unwrap();
                writer.align().unwrap();
            }
            let mut reader = BitReader::new(&buf[..]);
            assert_eq!(reader.read_exp_golomb().unwrap(), value);
        }
    }

    #[test]
    fn size_of_matches_encoded_bit_length() {
        for value in [0u64, 1, 7, 255, 1_000_000] {
            let mut buf = Vec::new();
            let bits_before_align = {
                let mut writer = BitWriter::new(&mut buf);
                writer.write_exp_golomb(value).unwrap();
                writer.align().unwrap();
                size_of_exp_golomb(value)
            };
            assert_eq!(bits_before_align, size_of_exp_golomb(value));
        }
    }

    #[test]
    fn round_trips_signed() {
        for value in [0i64, 1, -1, 2, -2, 3, -3, 1000, -1000] {
            let mut buf = Vec::new();
            {
                let mut writer = BitWriter::new(&mut buf);
                writer.write_signed_exp_golomb(value).unwrap();
                writer.align().unwrap();
            }
            let mut reader = BitReader::new(&buf[..]);
            assert_eq!(reader.read_signed_exp_golomb().unwrap(), value);
        }
    }

    #[test]
    fn canonical_mapping_matches_spec() {
        // se=0 -> 0, 1 -> 1, 2 -> -1, 3 -> 2, ...
        let cases = [(0u64, 0i64), (1, 1), (2, -1), (3, 2), (4, -2)];
        for (ue, expected) in cases {
            let mut buf = Vec::new();
            {
                let mut writer = BitWriter::new(&mut buf);
                writer.write_exp_golomb(ue).unwrap();
                writer.align().unwrap();
            }
            let mut reader = BitReader::new(&buf[..]);
            assert_eq!(reader.read_signed_exp_golomb().unwrap(), expected);
        }
    }
}
