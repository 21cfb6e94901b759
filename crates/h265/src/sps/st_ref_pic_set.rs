use std::io;

use scuffle_bytes_util::BitReader;
use scuffle_expgolomb::BitReaderExpGolombExt;

/// One `short_term_ref_pic_set()` entry, restricted to the single-negative-reference shape
/// this client's accelerator contract requires: exactly one negative-direction reference
/// picture, used by the current picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortTermRefPicSet {
    /// `delta_poc_s0_minus1` of the lone negative reference; actual POC delta is `-(value + 1)`.
    pub delta_poc_s0_minus1: u64,
}

/// All `short_term_ref_pic_set()` entries signalled directly in the SPS.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShortTermRefPicSets {
    pub sets: Vec<ShortTermRefPicSet>,
}

impl ShortTermRefPicSets {
    pub fn parse<R: io::Read>(bit_reader: &mut BitReader<R>, num_short_term_ref_pic_sets: usize) -> io::Result<Self> {
        let mut sets = Vec::with_capacity(num_short_term_ref_pic_sets);

        for st_rps_idx in 0..num_short_term_ref_pic_sets {
            if st_rps_idx != 0 {
                let inter_ref_pic_set_prediction_flag = bit_reader.read_bit()?;
                if inter_ref_pic_set_prediction_flag {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "inter-RPS prediction is not supported by the restricted profile",
                    ));
                }
            }

            let num_negative_pics = bit_reader.read_exp_golomb()?;
            let num_positive_pics = bit_reader.read_exp_golomb()?;
            if num_negative_pics != 1 || num_positive_pics != 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "short_term_ref_pic_set must have exactly one negative and zero positive references, got {num_negative_pics} negative, {num_positive_pics} positive"
                    ),
                ));
            }

            let delta_poc_s0_minus1 = bit_reader.read_exp_golomb()?;
            if delta_poc_s0_minus1 != 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "the sole negative reference of a short_term_ref_pic_set must have delta_poc_s0_minus1 == 0",
                ));
            }

            let used_by_curr_pic_s0_flag = bit_reader.read_bit()?;
            if !used_by_curr_pic_s0_flag {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "the sole negative reference of a short_term_ref_pic_set must be used_by_curr_pic",
                ));
            }

            sets.push(ShortTermRefPicSet { delta_poc_s0_minus1 });
        }

        Ok(Self { sets })
    }
}

#[cfg(test)]
mod tests {
    use scuffle_bytes_util::BitWriter;
    use scuffle_expgolomb::BitWriterExpGolombExt;

    use super::*;

    #[test]
    fn parses_single_negative_reference() {
        let mut buf = Vec::new();
        {
            let mut writer = BitWriter::new(&mut buf);
            writer.write_exp_golomb(1).unwrap(); // num_negative_pics
            writer.write_exp_golomb(0).unwrap(); // num_positive_pics
            writer.write_exp_golomb(0).unwrap(); // delta_poc_s0_minus1
            writer.write_bit(true).unwrap(); // used_by_curr_pic_s0_flag
            writer.align().unwrap();
        }
        let mut reader = BitReader::new(&buf[..]);
        let sets = ShortTermRefPicSets::parse(&mut reader, 1).unwrap();
        assert_eq!(sets.sets.len(), 1);
        assert_eq!(sets.sets[0].delta_poc_s0_minus1, 0);
    }

    #[test]
    fn rejects_multiple_negative_references() {
        let mut buf = Vec::new();
        {
            let mut writer = BitWriter::new(&mut buf);
            writer.write_exp_golomb(2).unwrap();
            writer.write_exp_golomb(0).unwrap();
            writer.align().unwrap();
        }
        let mut reader = BitReader::new(&buf[..]);
        assert!(ShortTermRefPicSets::parse(&mut reader, 1).is_err());
    }

    #[test]
    fn rejects_nonzero_delta() {
        let mut buf = Vec::new();
        {
            let mut writer = BitWriter::new(&mut buf);
            writer.write_exp_golomb(1).unwrap(); // num_negative_pics
            writer.write_exp_golomb(0).unwrap(); // num_positive_pics
            writer.write_exp_golomb(1).unwrap(); // delta_poc_s0_minus1 = 1 (POC delta -2)
            writer.write_bit(true).unwrap();
            writer.align().unwrap();
        }
        let mut reader = BitReader::new(&buf[..]);
        assert!(ShortTermRefPicSets::parse(&mut reader, 1).is_err());
    }
}
