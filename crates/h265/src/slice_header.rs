use std::io;

use scuffle_bytes_util::{BitReader, EmulationPreventionIo};
use scuffle_expgolomb::BitReaderExpGolombExt;

use crate::NALUnitType;
use crate::nal_unit_header::NALUnitHeader;
use crate::pps::Pps;
use crate::sps::Sps;

/// `slice_type` values this profile accepts; HEVC's `B` (0) slice type is unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceType {
    P,
    I,
}

/// How the active short-term reference-picture-set was signalled for this slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortTermRefPicSetRef {
    /// `short_term_ref_pic_set_sps_flag == 0`: the set was signalled inline. The bit length
    /// is what the acceleration API needs to locate the following syntax elements.
    Explicit { bit_length: u64 },
    /// `short_term_ref_pic_set_sps_flag == 1`: selects one of the SPS's sets by index.
    ByIndex { idx: u64 },
}

/// Per-slice override of the PPS's default active reference counts, read only for P slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefIdxActiveOverride {
    pub num_ref_idx_l0_active_minus1: u64,
}

/// The restricted-profile slice segment header this client's accelerator contract supports.
///
/// Only independent (non-dependent) P and I slice segments covering the whole picture are
/// accepted: `first_slice_segment_in_pic_flag` must be 1, and B slices are rejected.
///
/// ISO/IEC 23008-2 - 7.3.6.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceSegmentHeader {
    pub nal_unit_header: NALUnitHeader,
    pub slice_pic_parameter_set_id: u64,
    pub slice_type: SliceType,
    /// Absent for IDR pictures, whose POC is always 0.
    pub pic_order_cnt_lsb: Option<u32>,
    /// Absent for IDR pictures, which carry no reference-picture set.
    pub short_term_ref_pic_set: Option<ShortTermRefPicSetRef>,
    pub slice_temporal_mvp_enabled_flag: bool,
    pub slice_sao_luma_flag: bool,
    pub slice_sao_chroma_flag: bool,
    pub ref_idx_active_override: Option<RefIdxActiveOverride>,
    pub cabac_init_flag: bool,
    pub five_minus_max_num_merge_cand: Option<u64>,
    pub slice_qp_delta: i64,
    pub slice_deblocking_filter_disabled_flag: bool,
    pub slice_beta_offset_div2: i64,
    pub slice_tc_offset_div2: i64,
    pub slice_loop_filter_across_slices_enabled_flag: bool,
    /// Byte offset of the slice data within the NAL unit, post-alignment, with elided
    /// emulation prevention bytes already subtracted back out.
    pub slice_data_byte_offset: u64,
    /// Count of emulation-prevention bytes elided from this NAL unit up to the slice
    /// data. Carried alongside `slice_data_byte_offset` for the acceleration API's
    /// slice parameter block, per the parameter-state data model.
    pub epb_count: u64,
}

impl SliceSegmentHeader {
    /// Fixed `collocated_from_l0_flag` the accelerator expects: this profile never signals
    /// B slices, so the syntax element collocated_from_l0_flag is never present in the
    /// bitstream and this default is used unconditionally.
    pub const COLLOCATED_FROM_L0_FLAG: bool = true;
    /// Fixed `collocated_ref_idx` the accelerator expects, since this profile always has
    /// exactly one active reference and never signals the syntax element.
    pub const COLLOCATED_REF_IDX: u8 = 0xff;

    pub fn parse<R: io::Read>(
        reader: &mut BitReader<EmulationPreventionIo<R>>,
        sps: &Sps,
        pps: &Pps,
    ) -> io::Result<Self> {
        let nal_unit_header = NALUnitHeader::parse(reader)?;
        if !nal_unit_header.nal_unit_type.is_slice_segment() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "nal_unit_type is not a supported slice segment type",
            ));
        }

        let first_slice_segment_in_pic_flag = reader.read_bit()?;
        if !first_slice_segment_in_pic_flag {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "only single-slice-segment pictures are supported",
            ));
        }

        if nal_unit_header.nal_unit_type.is_irap() {
            let no_output_of_prior_pics_flag = reader.read_bit()?;
            if no_output_of_prior_pics_flag {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "no_output_of_prior_pics_flag must be 0",
                ));
            }
        }

        let slice_pic_parameter_set_id = reader.read_exp_golomb()?;

        let slice_type_code = reader.read_exp_golomb()?;
        let slice_type = match slice_type_code {
            1 => SliceType::P,
            2 => SliceType::I,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unsupported slice_type {other}, only P (1) and I (2) are supported"),
                ));
            }
        };

        let is_idr = nal_unit_header.nal_unit_type.is_idr();

        let mut pic_order_cnt_lsb = None;
        let mut short_term_ref_pic_set = None;

        if !is_idr {
            let poc_bits = sps.log2_max_pic_order_cnt_lsb_minus4 as u32 + 4;
            pic_order_cnt_lsb = Some(reader.read_bits(poc_bits)? as u32);

            let short_term_ref_pic_set_sps_flag = reader.read_bit()?;
            short_term_ref_pic_set = Some(if short_term_ref_pic_set_sps_flag {
                let num_sets = sps.short_term_ref_pic_sets.sets.len() as u64;
                let idx = if num_sets > 1 {
                    reader.read_bits(ceil_log2(num_sets))?
                } else {
                    0
                };
                ShortTermRefPicSetRef::ByIndex { idx }
            } else {
                let start = reader.bit_position();
                parse_inline_short_term_ref_pic_set(reader)?;
                let bit_length = reader.bit_position() - start;
                ShortTermRefPicSetRef::Explicit { bit_length }
            });
        }

        let slice_temporal_mvp_enabled_flag = if !is_idr { reader.read_bit()? } else { false };

        let slice_sao_luma_flag = reader.read_bit()?;
        let slice_sao_chroma_flag = reader.read_bit()?;
        if !slice_sao_luma_flag || !slice_sao_chroma_flag {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "slice_sao_luma_flag and slice_sao_chroma_flag must both be 1",
            ));
        }

        let mut ref_idx_active_override = None;
        let mut cabac_init_flag = false;
        let mut five_minus_max_num_merge_cand = None;

        if matches!(slice_type, SliceType::P) {
            let num_ref_idx_active_override_flag = reader.read_bit()?;
            if num_ref_idx_active_override_flag {
                let num_ref_idx_l0_active_minus1 = reader.read_exp_golomb()?;
                ref_idx_active_override = Some(RefIdxActiveOverride {
                    num_ref_idx_l0_active_minus1,
                });
            }

            cabac_init_flag = if pps.cabac_init_present_flag { reader.read_bit()? } else { false };

            if slice_temporal_mvp_enabled_flag {
                // collocated_from_l0_flag / collocated_ref_idx are only signalled for B
                // slices, or for P slices with more than one active reference; this
                // profile never has more than one, so neither is read here.
            }

            five_minus_max_num_merge_cand = Some(reader.read_exp_golomb()?);
        }

        let slice_qp_delta = reader.read_signed_exp_golomb()?;

        let mut slice_deblocking_filter_disabled_flag = pps
            .deblocking_filter_control
            .map(|d| d.pps_deblocking_filter_disabled_flag)
            .unwrap_or(false);
        let mut slice_beta_offset_div2 = pps.deblocking_filter_control.map(|d| d.pps_beta_offset_div2).unwrap_or(0);
        let mut slice_tc_offset_div2 = pps.deblocking_filter_control.map(|d| d.pps_tc_offset_div2).unwrap_or(0);

        let deblocking_overridable = pps
            .deblocking_filter_control
            .is_some_and(|d| d.deblocking_filter_override_enabled_flag);
        if deblocking_overridable {
            let deblocking_filter_override_flag = reader.read_bit()?;
            if deblocking_filter_override_flag {
                slice_deblocking_filter_disabled_flag = reader.read_bit()?;
                if !slice_deblocking_filter_disabled_flag {
                    slice_beta_offset_div2 = reader.read_signed_exp_golomb()?;
                    slice_tc_offset_div2 = reader.read_signed_exp_golomb()?;
                }
            }
        }

        let slice_loop_filter_across_slices_enabled_flag = if pps.pps_loop_filter_across_slices_enabled_flag
            && (slice_sao_luma_flag || slice_sao_chroma_flag || !slice_deblocking_filter_disabled_flag)
        {
            reader.read_bit()?
        } else {
            pps.pps_loop_filter_across_slices_enabled_flag
        };

        reader.align();
        // `bit_position()` counts bits in the EPB-elided view the bit reader actually sees, but
        // this offset indexes into the raw (non-elided) NAL buffer the slice data is sliced out
        // of, which is one byte longer per elided emulation-prevention byte. Add epb_count back
        // rather than subtracting it.
        let epb_count = reader.get_ref().epb_count();
        let slice_data_byte_offset = reader.bit_position() / 8 + epb_count;

        Ok(Self {
            nal_unit_header,
            slice_pic_parameter_set_id,
            slice_type,
            pic_order_cnt_lsb,
            short_term_ref_pic_set,
            slice_temporal_mvp_enabled_flag,
            slice_sao_luma_flag,
            slice_sao_chroma_flag,
            ref_idx_active_override,
            cabac_init_flag,
            five_minus_max_num_merge_cand,
            slice_qp_delta,
            slice_deblocking_filter_disabled_flag,
            slice_beta_offset_div2,
            slice_tc_offset_div2,
            slice_loop_filter_across_slices_enabled_flag,
            slice_data_byte_offset,
            epb_count,
        })
    }
}

/// `Ceil(Log2(n))` for `n >= 1`, the bit width HEVC uses to code `slice_rps_idx`.
fn ceil_log2(n: u64) -> u32 {
    u64::BITS - (n - 1).leading_zeros()
}

#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use scuffle_bytes_util::BitWriter;
    use scuffle_expgolomb::BitWriterExpGolombExt;

    use super::*;

    /// A minimal restricted-profile SPS (log2_max_pic_order_cnt_lsb_minus4 = 4, one
    /// short-term RPS), built the same way `sps::tests::fixture_640x480` is, just
    /// inlined here so this module doesn't depend on `sps`'s private test helpers.
    fn fixture_sps() -> Sps {
        let mut buf = Vec::new();
        {
            let mut w = BitWriter::new(&mut buf);
            w.write_bit(false).unwrap();
            w.write_bits(NALUnitType::SPS_NUT.0 as u64, 6).unwrap();
            w.write_bits(0, 6).unwrap();
            w.write_bits(1, 3).unwrap();

            w.write_bits(0, 4).unwrap();
            w.write_bits(0, 3).unwrap();
            w.write_bit(true).unwrap();

            w.write_bits(0, 2).unwrap();
            w.write_bit(false).unwrap();
            w.write_bits(1, 5).unwrap();
            w.write_bits(0, 32).unwrap();
            w.write_bits(0, 4).unwrap();
            w.write_bits(0, 43).unwrap();
            w.write_bit(false).unwrap();
            w.write_bits(120, 8).unwrap();

            w.write_exp_golomb(0).unwrap();
            w.write_exp_golomb(1).unwrap();
            w.write_exp_golomb(640).unwrap();
            w.write_exp_golomb(480).unwrap();
            w.write_bit(false).unwrap();
            w.write_exp_golomb(0).unwrap();
            w.write_exp_golomb(0).unwrap();
            w.write_exp_golomb(4).unwrap(); // log2_max_pic_order_cnt_lsb_minus4 = 4 -> 8-bit POC LSB

            w.write_bit(false).unwrap();
            w.write_exp_golomb(4).unwrap();
            w.write_exp_golomb(0).unwrap();
            w.write_exp_golomb(0).unwrap();

            w.write_exp_golomb(0).unwrap();
            w.write_exp_golomb(3).unwrap();
            w.write_exp_golomb(0).unwrap();
            w.write_exp_golomb(3).unwrap();
            w.write_exp_golomb(0).unwrap();
            w.write_exp_golomb(0).unwrap();

            w.write_bit(false).unwrap();
            w.write_bit(false).unwrap();
            w.write_bit(true).unwrap();
            w.write_bit(false).unwrap();

            w.write_exp_golomb(1).unwrap(); // num_short_term_ref_pic_sets
            w.write_exp_golomb(1).unwrap();
            w.write_exp_golomb(0).unwrap();
            w.write_exp_golomb(0).unwrap();
            w.write_bit(true).unwrap();

            w.write_bit(false).unwrap();
            w.write_bit(true).unwrap();
            w.write_bit(true).unwrap();

            w.write_bit(true).unwrap(); // vui_parameters_present_flag
            w.write_bit(false).unwrap();
            w.write_bit(false).unwrap();
            w.write_bit(true).unwrap();
            w.write_bits(5, 3).unwrap();
            w.write_bit(false).unwrap();
            w.write_bit(true).unwrap();
            w.write_bits(2, 8).unwrap();
            w.write_bits(2, 8).unwrap();
            w.write_bits(6, 8).unwrap();
            w.write_bit(false).unwrap();
            w.write_bit(false).unwrap();
            w.write_bit(false).unwrap();
            w.write_bit(false).unwrap();
            w.write_bit(false).unwrap();
            w.write_bit(false).unwrap();
            w.write_bit(true).unwrap();
            w.write_bit(false).unwrap();
            w.write_bit(true).unwrap();
            w.write_bit(true).unwrap();
            w.write_exp_golomb(0).unwrap();
            w.write_exp_golomb(0).unwrap();
            w.write_exp_golomb(0).unwrap();
            w.write_exp_golomb(15).unwrap();
            w.write_exp_golomb(15).unwrap();

            w.write_bit(false).unwrap();
            w.align().unwrap();
        }
        Sps::parse(std::io::Cursor::new(buf)).unwrap()
    }

    fn fixture_pps(cabac_init_present: bool, loop_filter_across_slices: bool) -> Pps {
        Pps {
            nal_unit_header: NALUnitHeader {
                nal_unit_type: NALUnitType::PPS_NUT,
                nuh_layer_id: 0,
                nuh_temporal_id_plus1: NonZero::new(1).unwrap(),
            },
            pps_pic_parameter_set_id: 0,
            pps_seq_parameter_set_id: 0,
            sign_data_hiding_enabled_flag: false,
            cabac_init_present_flag: cabac_init_present,
            num_ref_idx_l0_default_active_minus1: 0,
            num_ref_idx_l1_default_active_minus1: 0,
            init_qp_minus26: 0,
            constrained_intra_pred_flag: false,
            transform_skip_enabled_flag: false,
            pps_cb_qp_offset: 0,
            pps_cr_qp_offset: 0,
            pps_loop_filter_across_slices_enabled_flag: loop_filter_across_slices,
            deblocking_filter_control: None,
            log2_parallel_merge_level_minus2: 0,
        }
    }

    fn reader(data: Vec<u8>) -> BitReader<EmulationPreventionIo<std::io::Cursor<Vec<u8>>>> {
        BitReader::new(EmulationPreventionIo::new(std::io::Cursor::new(data)))
    }

    fn nal_header_bits(w: &mut BitWriter<&mut Vec<u8>>, nal_unit_type: u8) {
        w.write_bit(false).unwrap();
        w.write_bits(nal_unit_type as u64, 6).unwrap();
        w.write_bits(0, 6).unwrap();
        w.write_bits(1, 3).unwrap();
    }

    #[test]
    fn parses_idr_i_slice() {
        let sps = fixture_sps();
        let pps = fixture_pps(false, true);

        let mut buf = Vec::new();
        {
            let mut w = BitWriter::new(&mut buf);
            nal_header_bits(&mut w, NALUnitType::IDR_W_RADL.0);
            w.write_bit(true).unwrap(); // first_slice_segment_in_pic_flag
            w.write_bit(false).unwrap(); // no_output_of_prior_pics_flag (IRAP)
            w.write_exp_golomb(0).unwrap(); // slice_pic_parameter_set_id
            w.write_exp_golomb(2).unwrap(); // slice_type = I
            w.write_bit(true).unwrap(); // slice_sao_luma_flag
            w.write_bit(true).unwrap(); // slice_sao_chroma_flag
            w.write_signed_exp_golomb(0).unwrap(); // slice_qp_delta
            w.write_bit(true).unwrap(); // slice_loop_filter_across_slices_enabled_flag
            w.align().unwrap();
        }

        let header = SliceSegmentHeader::parse(&mut reader(buf), &sps, &pps).unwrap();
        assert_eq!(header.slice_type, SliceType::I);
        assert!(header.pic_order_cnt_lsb.is_none());
        assert!(header.short_term_ref_pic_set.is_none());
        assert!(header.slice_sao_luma_flag && header.slice_sao_chroma_flag);
        assert!(header.ref_idx_active_override.is_none());
        assert_eq!(header.slice_data_byte_offset, 4);
    }

    #[test]
    fn parses_p_slice_with_ref_idx_override() {
        let sps = fixture_sps();
        let pps = fixture_pps(false, true);

        let mut buf = Vec::new();
        {
            let mut w = BitWriter::new(&mut buf);
            nal_header_bits(&mut w, NALUnitType::TRAIL_R.0);
            w.write_bit(true).unwrap(); // first_slice_segment_in_pic_flag
            w.write_exp_golomb(0).unwrap(); // slice_pic_parameter_set_id
            w.write_exp_golomb(1).unwrap(); // slice_type = P
            w.write_bits(1, 8).unwrap(); // pic_order_cnt_lsb (8 bits)
            w.write_bit(true).unwrap(); // short_term_ref_pic_set_sps_flag (num_sets == 1, no idx bits)
            w.write_bit(true).unwrap(); // slice_temporal_mvp_enabled_flag
            w.write_bit(true).unwrap(); // slice_sao_luma_flag
            w.write_bit(true).unwrap(); // slice_sao_chroma_flag
            w.write_bit(true).unwrap(); // num_ref_idx_active_override_flag
            w.write_exp_golomb(2).unwrap(); // num_ref_idx_l0_active_minus1
            w.write_exp_golomb(3).unwrap(); // five_minus_max_num_merge_cand
            w.write_signed_exp_golomb(-1).unwrap(); // slice_qp_delta
            w.write_bit(true).unwrap(); // slice_loop_filter_across_slices_enabled_flag
            w.align().unwrap();
        }

        let header = SliceSegmentHeader::parse(&mut reader(buf), &sps, &pps).unwrap();
        assert_eq!(header.slice_type, SliceType::P);
        assert_eq!(header.pic_order_cnt_lsb, Some(1));
        assert!(matches!(
            header.short_term_ref_pic_set,
            Some(ShortTermRefPicSetRef::ByIndex { idx: 0 })
        ));
        assert_eq!(
            header.ref_idx_active_override,
            Some(RefIdxActiveOverride {
                num_ref_idx_l0_active_minus1: 2
            })
        );
        assert_eq!(header.slice_qp_delta, -1);
    }

    #[test]
    fn p_slice_without_override_falls_back_to_pps_default() {
        // Exercises the "Open Question -- default reference-list counts" resolution:
        // the PPS default must be visible to callers precisely when the override
        // flag is absent, since slice_header itself doesn't resolve the fallback.
        let sps = fixture_sps();
        let pps = fixture_pps(true, true);

        let mut buf = Vec::new();
        {
            let mut w = BitWriter::new(&mut buf);
            nal_header_bits(&mut w, NALUnitType::TRAIL_R.0);
            w.write_bit(true).unwrap();
            w.write_exp_golomb(0).unwrap();
            w.write_exp_golomb(1).unwrap(); // slice_type = P
            w.write_bits(1, 8).unwrap();
            w.write_bit(true).unwrap(); // short_term_ref_pic_set_sps_flag
            w.write_bit(false).unwrap(); // slice_temporal_mvp_enabled_flag
            w.write_bit(true).unwrap();
            w.write_bit(true).unwrap();
            w.write_bit(false).unwrap(); // num_ref_idx_active_override_flag = 0
            w.write_bit(true).unwrap(); // cabac_init_flag (pps.cabac_init_present_flag == true)
            w.write_exp_golomb(0).unwrap(); // five_minus_max_num_merge_cand
            w.write_signed_exp_golomb(0).unwrap();
            w.write_bit(true).unwrap();
            w.align().unwrap();
        }

        let header = SliceSegmentHeader::parse(&mut reader(buf), &sps, &pps).unwrap();
        assert!(header.ref_idx_active_override.is_none());
        assert!(header.cabac_init_flag);
    }

    #[test]
    fn rejects_non_first_slice_segment() {
        let sps = fixture_sps();
        let pps = fixture_pps(false, true);

        let mut buf = Vec::new();
        {
            let mut w = BitWriter::new(&mut buf);
            nal_header_bits(&mut w, NALUnitType::TRAIL_R.0);
            w.write_bit(false).unwrap(); // first_slice_segment_in_pic_flag = 0
            w.align().unwrap();
        }

        assert!(SliceSegmentHeader::parse(&mut reader(buf), &sps, &pps).is_err());
    }

    #[test]
    fn rejects_b_slice_type() {
        let sps = fixture_sps();
        let pps = fixture_pps(false, true);

        let mut buf = Vec::new();
        {
            let mut w = BitWriter::new(&mut buf);
            nal_header_bits(&mut w, NALUnitType::TRAIL_R.0);
            w.write_bit(true).unwrap();
            w.write_exp_golomb(0).unwrap();
            w.write_exp_golomb(0).unwrap(); // slice_type = B, unsupported
            w.align().unwrap();
        }

        assert!(SliceSegmentHeader::parse(&mut reader(buf), &sps, &pps).is_err());
    }

    #[test]
    fn slice_data_byte_offset_accounts_for_elided_epb_bytes() {
        // Isolates the byte-offset formula at the end of `parse` against a real
        // emulation-prevention byte: `bit_position()` counts bytes in the elided view
        // `BitReader` actually sees, while this offset indexes into the raw (non-elided)
        // NAL buffer, which is one byte longer per elided 0x03. Raw layout
        // 0xAB 0x00 0x00 0x03 0xCD 0xEF elides to 0xAB 0x00 0x00 0xCD 0xEF; reading the
        // first four elided bytes consumes the EPB along the way.
        let raw = [0xABu8, 0x00, 0x00, 0x03, 0xCD, 0xEF];
        let mut r = reader(raw.to_vec());
        r.read_bits(32).unwrap();
        assert_eq!(r.get_ref().epb_count(), 1);
        let offset = r.bit_position() / 8 + r.get_ref().epb_count();
        assert_eq!(offset, 5);
        assert_eq!(&raw[offset as usize..], &[0xEF]);
    }
}

/// Parses a `short_term_ref_pic_set()` signalled directly in a slice header, restricted to
/// this profile's single-negative-reference shape.
fn parse_inline_short_term_ref_pic_set<R: io::Read>(reader: &mut BitReader<EmulationPreventionIo<R>>) -> io::Result<()> {
    let inter_ref_pic_set_prediction_flag = reader.read_bit()?;
    if inter_ref_pic_set_prediction_flag {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "inter-RPS prediction is not supported by the restricted profile",
        ));
    }

    let num_negative_pics = reader.read_exp_golomb()?;
    let num_positive_pics = reader.read_exp_golomb()?;
    if num_negative_pics != 1 || num_positive_pics != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "short_term_ref_pic_set must have exactly one negative and zero positive references",
        ));
    }

    let delta_poc_s0_minus1 = reader.read_exp_golomb()?;
    if delta_poc_s0_minus1 != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "the sole negative reference must have delta_poc_s0_minus1 == 0",
        ));
    }

    let used_by_curr_pic_s0_flag = reader.read_bit()?;
    if !used_by_curr_pic_s0_flag {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "the sole negative reference must be used_by_curr_pic",
        ));
    }

    Ok(())
}
