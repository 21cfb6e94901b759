use std::io;

use scuffle_bytes_util::BitReader;
use scuffle_expgolomb::BitReaderExpGolombExt;

use crate::NALUnitType;
use crate::nal_unit_header::NALUnitHeader;
use crate::range_check::range_check;

/// Deblocking-filter override carried by a PPS when `deblocking_filter_control_present_flag`
/// is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeblockingFilterControl {
    pub deblocking_filter_override_enabled_flag: bool,
    pub pps_deblocking_filter_disabled_flag: bool,
    pub pps_beta_offset_div2: i64,
    pub pps_tc_offset_div2: i64,
}

/// The restricted-profile Picture Parameter Set this client's accelerator contract supports.
///
/// Rejects dependent slice segments, extra slice header bits, per-CU QP delta, a chroma QP
/// offset list, weighted prediction, tiles, wavefront entropy coding sync, scaling lists,
/// reference list modification, slice-segment-header extensions and PPS extensions: any of
/// those present in the bitstream fail parsing.
///
/// ISO/IEC 23008-2 - 7.3.2.3
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pps {
    pub nal_unit_header: NALUnitHeader,
    pub pps_pic_parameter_set_id: u64,
    pub pps_seq_parameter_set_id: u64,
    pub sign_data_hiding_enabled_flag: bool,
    pub cabac_init_present_flag: bool,
    pub num_ref_idx_l0_default_active_minus1: u64,
    pub num_ref_idx_l1_default_active_minus1: u64,
    pub init_qp_minus26: i64,
    pub constrained_intra_pred_flag: bool,
    pub transform_skip_enabled_flag: bool,
    pub pps_cb_qp_offset: i64,
    pub pps_cr_qp_offset: i64,
    pub pps_loop_filter_across_slices_enabled_flag: bool,
    pub deblocking_filter_control: Option<DeblockingFilterControl>,
    pub log2_parallel_merge_level_minus2: u64,
}

impl Pps {
    pub fn parse(reader: impl io::Read) -> io::Result<Self> {
        let mut bit_reader = BitReader::new(reader);

        let nal_unit_header = NALUnitHeader::parse(&mut bit_reader)?;
        if nal_unit_header.nal_unit_type != NALUnitType::PPS_NUT {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "nal_unit_type is not PPS_NUT"));
        }

        let pps_pic_parameter_set_id = bit_reader.read_exp_golomb()?;
        range_check!(pps_pic_parameter_set_id, 0, 63)?;
        let pps_seq_parameter_set_id = bit_reader.read_exp_golomb()?;
        range_check!(pps_seq_parameter_set_id, 0, 15)?;

        let dependent_slice_segments_enabled_flag = bit_reader.read_bit()?;
        if dependent_slice_segments_enabled_flag {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "dependent slice segments are not supported",
            ));
        }

        let output_flag_present_flag = bit_reader.read_bit()?;
        if output_flag_present_flag {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "per-picture pic_output_flag is not supported",
            ));
        }

        let num_extra_slice_header_bits = bit_reader.read_bits(3)?;
        if num_extra_slice_header_bits != 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "extra slice header bits are not supported"));
        }

        let sign_data_hiding_enabled_flag = bit_reader.read_bit()?;
        let cabac_init_present_flag = bit_reader.read_bit()?;

        let num_ref_idx_l0_default_active_minus1 = bit_reader.read_exp_golomb()?;
        let num_ref_idx_l1_default_active_minus1 = bit_reader.read_exp_golomb()?;
        let init_qp_minus26 = bit_reader.read_signed_exp_golomb()?;

        let constrained_intra_pred_flag = bit_reader.read_bit()?;
        let transform_skip_enabled_flag = bit_reader.read_bit()?;

        let cu_qp_delta_enabled_flag = bit_reader.read_bit()?;
        if cu_qp_delta_enabled_flag {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "cu_qp_delta is not supported"));
        }

        let pps_cb_qp_offset = bit_reader.read_signed_exp_golomb()?;
        let pps_cr_qp_offset = bit_reader.read_signed_exp_golomb()?;

        let pps_slice_chroma_qp_offsets_present_flag = bit_reader.read_bit()?;
        if pps_slice_chroma_qp_offsets_present_flag {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "per-slice chroma QP offsets are not supported",
            ));
        }

        let weighted_pred_flag = bit_reader.read_bit()?;
        let weighted_bipred_flag = bit_reader.read_bit()?;
        if weighted_pred_flag || weighted_bipred_flag {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "weighted prediction is not supported"));
        }

        let _transquant_bypass_enabled_flag = bit_reader.read_bit()?;

        let tiles_enabled_flag = bit_reader.read_bit()?;
        let entropy_coding_sync_enabled_flag = bit_reader.read_bit()?;
        if tiles_enabled_flag || entropy_coding_sync_enabled_flag {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "tiles and WPP are not supported"));
        }

        let pps_loop_filter_across_slices_enabled_flag = bit_reader.read_bit()?;

        let deblocking_filter_control_present_flag = bit_reader.read_bit()?;
        let deblocking_filter_control = if deblocking_filter_control_present_flag {
            let deblocking_filter_override_enabled_flag = bit_reader.read_bit()?;
            let pps_deblocking_filter_disabled_flag = bit_reader.read_bit()?;
            let (pps_beta_offset_div2, pps_tc_offset_div2) = if !pps_deblocking_filter_disabled_flag {
                (bit_reader.read_signed_exp_golomb()?, bit_reader.read_signed_exp_golomb()?)
            } else {
                (0, 0)
            };
            Some(DeblockingFilterControl {
                deblocking_filter_override_enabled_flag,
                pps_deblocking_filter_disabled_flag,
                pps_beta_offset_div2,
                pps_tc_offset_div2,
            })
        } else {
            None
        };

        let pps_scaling_list_data_present_flag = bit_reader.read_bit()?;
        if pps_scaling_list_data_present_flag {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "scaling lists are not supported"));
        }

        let lists_modification_present_flag = bit_reader.read_bit()?;
        if lists_modification_present_flag {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "reference list modification is not supported",
            ));
        }

        let log2_parallel_merge_level_minus2 = bit_reader.read_exp_golomb()?;

        let slice_segment_header_extension_present_flag = bit_reader.read_bit()?;
        if slice_segment_header_extension_present_flag {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "slice-segment-header extensions are not supported",
            ));
        }

        let pps_extension_present_flag = bit_reader.read_bit()?;
        if pps_extension_present_flag {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "PPS extensions are not supported"));
        }

        bit_reader.align();

        Ok(Self {
            nal_unit_header,
            pps_pic_parameter_set_id,
            pps_seq_parameter_set_id,
            sign_data_hiding_enabled_flag,
            cabac_init_present_flag,
            num_ref_idx_l0_default_active_minus1,
            num_ref_idx_l1_default_active_minus1,
            init_qp_minus26,
            constrained_intra_pred_flag,
            transform_skip_enabled_flag,
            pps_cb_qp_offset,
            pps_cr_qp_offset,
            pps_loop_filter_across_slices_enabled_flag,
            deblocking_filter_control,
            log2_parallel_merge_level_minus2,
        })
    }
}
