use std::io;

use scuffle_bytes_util::BitReader;
use scuffle_bytes_util::EmulationPreventionIo;
use scuffle_expgolomb::BitReaderExpGolombExt;

use crate::NALUnitType;
use crate::nal_unit_header::NALUnitHeader;
use crate::range_check::range_check;

mod conformance_window;
mod pcm;
mod profile_tier_level;
mod st_ref_pic_set;
mod sub_layer_ordering_info;
mod vui_parameters;

pub use conformance_window::ConformanceWindow;
pub use pcm::Pcm;
pub use profile_tier_level::ProfileTierLevel;
pub use st_ref_pic_set::{ShortTermRefPicSet, ShortTermRefPicSets};
pub use sub_layer_ordering_info::SubLayerOrderingInfo;
pub use vui_parameters::VuiParameters;

/// `chroma_format_idc` value for 4:2:0 sampling, the only format this restricted profile accepts.
const CHROMA_FORMAT_420: u8 = 1;

/// The restricted-profile Sequence Parameter Set this client's accelerator contract supports.
///
/// Unlike a general HEVC decoder, this parser rejects anything outside HEVC Main profile,
/// level 4.0, 4:2:0 chroma, a single temporal sub-layer, no scaling lists, no PCM, no
/// long-term references and no SPS extensions: any bitstream using those features fails
/// parsing rather than being silently misinterpreted.
///
/// ISO/IEC-23008-2 - 7.3.2.2
#[derive(Debug, Clone, PartialEq)]
pub struct Sps {
    pub nal_unit_header: NALUnitHeader,
    pub sps_seq_parameter_set_id: u64,
    pub pic_width_in_luma_samples: u64,
    pub pic_height_in_luma_samples: u64,
    pub conformance_window: ConformanceWindow,
    pub bit_depth_luma_minus8: u8,
    pub bit_depth_chroma_minus8: u8,
    /// `log2_max_pic_order_cnt_lsb_minus4`; `MaxPicOrderCntLsb = 1 << (value + 4)`.
    pub log2_max_pic_order_cnt_lsb_minus4: u8,
    pub sub_layer_ordering_info: SubLayerOrderingInfo,
    pub log2_min_luma_coding_block_size_minus3: u64,
    pub log2_diff_max_min_luma_coding_block_size: u64,
    pub log2_min_luma_transform_block_size_minus2: u64,
    pub log2_diff_max_min_luma_transform_block_size: u64,
    pub max_transform_hierarchy_depth_inter: u64,
    pub max_transform_hierarchy_depth_intra: u64,
    pub amp_enabled_flag: bool,
    pub sample_adaptive_offset_enabled_flag: bool,
    pub short_term_ref_pic_sets: ShortTermRefPicSets,
    pub sps_temporal_mvp_enabled_flag: bool,
    pub strong_intra_smoothing_enabled_flag: bool,
    pub vui_parameters: VuiParameters,

    min_cb_log2_size_y: u64,
    ctb_log2_size_y: u64,
    min_tb_log2_size_y: u64,
}

impl Sps {
    /// Parses an SPS already stripped of Annex-B emulation prevention bytes.
    pub fn parse(reader: impl io::Read) -> io::Result<Self> {
        let mut bit_reader = BitReader::new(reader);

        let nal_unit_header = NALUnitHeader::parse(&mut bit_reader)?;
        if nal_unit_header.nal_unit_type != NALUnitType::SPS_NUT {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "nal_unit_type is not SPS_NUT"));
        }

        let sps_video_parameter_set_id = bit_reader.read_bits(4)? as u8;
        if sps_video_parameter_set_id != 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "sps_video_parameter_set_id must be 0"));
        }

        let sps_max_sub_layers_minus1 = bit_reader.read_bits(3)? as u8;
        if sps_max_sub_layers_minus1 != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "sps_max_sub_layers_minus1 must be 0 (single temporal layer)",
            ));
        }

        let sps_temporal_id_nesting_flag = bit_reader.read_bit()?;
        if !sps_temporal_id_nesting_flag {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "sps_temporal_id_nesting_flag must be 1 when sps_max_sub_layers_minus1 is 0",
            ));
        }

        let _profile_tier_level = ProfileTierLevel::parse(&mut bit_reader, sps_max_sub_layers_minus1)?;

        let sps_seq_parameter_set_id = bit_reader.read_exp_golomb()?;
        range_check!(sps_seq_parameter_set_id, 0, 15)?;

        let chroma_format_idc = bit_reader.read_exp_golomb()?;
        if chroma_format_idc != CHROMA_FORMAT_420 as u64 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "only 4:2:0 chroma sampling is supported"));
        }

        let pic_width_in_luma_samples = bit_reader.read_exp_golomb()?;
        if pic_width_in_luma_samples == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "pic_width_in_luma_samples must not be 0",
            ));
        }

        let pic_height_in_luma_samples = bit_reader.read_exp_golomb()?;
        if pic_height_in_luma_samples == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "pic_height_in_luma_samples must not be 0",
            ));
        }

        let conformance_window_flag = bit_reader.read_bit()?;
        let conformance_window = conformance_window_flag
            .then(|| ConformanceWindow::parse(&mut bit_reader))
            .transpose()?
            .unwrap_or_default();

        let bit_depth_luma_minus8 = bit_reader.read_exp_golomb()?;
        range_check!(bit_depth_luma_minus8, 0, 8)?;
        let bit_depth_luma_minus8 = bit_depth_luma_minus8 as u8;

        let bit_depth_chroma_minus8 = bit_reader.read_exp_golomb()?;
        range_check!(bit_depth_chroma_minus8, 0, 8)?;
        let bit_depth_chroma_minus8 = bit_depth_chroma_minus8 as u8;

        let log2_max_pic_order_cnt_lsb_minus4 = bit_reader.read_exp_golomb()?;
        range_check!(log2_max_pic_order_cnt_lsb_minus4, 0, 12)?;
        let log2_max_pic_order_cnt_lsb_minus4 = log2_max_pic_order_cnt_lsb_minus4 as u8;

        let sps_sub_layer_ordering_info_present_flag = bit_reader.read_bit()?;
        let sub_layer_ordering_info = SubLayerOrderingInfo::parse(
            &mut bit_reader,
            sps_sub_layer_ordering_info_present_flag,
            sps_max_sub_layers_minus1,
        )?;

        let log2_min_luma_coding_block_size_minus3 = bit_reader.read_exp_golomb()?;
        let log2_diff_max_min_luma_coding_block_size = bit_reader.read_exp_golomb()?;
        let min_cb_log2_size_y = log2_min_luma_coding_block_size_minus3 + 3;
        let ctb_log2_size_y = min_cb_log2_size_y + log2_diff_max_min_luma_coding_block_size;

        let log2_min_luma_transform_block_size_minus2 = bit_reader.read_exp_golomb()?;
        let min_tb_log2_size_y = log2_min_luma_transform_block_size_minus2 + 2;
        let log2_diff_max_min_luma_transform_block_size = bit_reader.read_exp_golomb()?;

        let max_transform_hierarchy_depth_inter = bit_reader.read_exp_golomb()?;
        range_check!(max_transform_hierarchy_depth_inter, 0, ctb_log2_size_y - min_tb_log2_size_y)?;
        let max_transform_hierarchy_depth_intra = bit_reader.read_exp_golomb()?;
        range_check!(max_transform_hierarchy_depth_intra, 0, ctb_log2_size_y - min_tb_log2_size_y)?;

        let scaling_list_enabled_flag = bit_reader.read_bit()?;
        if scaling_list_enabled_flag {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "scaling lists are not supported"));
        }

        let amp_enabled_flag = bit_reader.read_bit()?;
        let sample_adaptive_offset_enabled_flag = bit_reader.read_bit()?;
        if !sample_adaptive_offset_enabled_flag {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "sample_adaptive_offset_enabled_flag must be 1",
            ));
        }

        let pcm_enabled_flag = bit_reader.read_bit()?;
        if pcm_enabled_flag {
            // still need to skip the pcm() syntax element to remain byte-accurate, even
            // though this profile never forwards PCM data to the accelerator.
            let _ = Pcm::parse(&mut bit_reader)?;
        }

        let num_short_term_ref_pic_sets = bit_reader.read_exp_golomb()?;
        range_check!(num_short_term_ref_pic_sets, 0, 64)?;
        let short_term_ref_pic_sets = ShortTermRefPicSets::parse(&mut bit_reader, num_short_term_ref_pic_sets as usize)?;

        let long_term_ref_pics_present_flag = bit_reader.read_bit()?;
        if long_term_ref_pics_present_flag {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "long-term reference pictures are not supported",
            ));
        }

        let sps_temporal_mvp_enabled_flag = bit_reader.read_bit()?;
        let strong_intra_smoothing_enabled_flag = bit_reader.read_bit()?;

        let vui_parameters_present_flag = bit_reader.read_bit()?;
        if !vui_parameters_present_flag {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "vui_parameters is mandatory for this profile",
            ));
        }
        let vui_parameters = VuiParameters::parse(&mut bit_reader, sps_max_sub_layers_minus1)?;
        vui_parameters.validate_restricted()?;

        let sps_extension_flag = bit_reader.read_bit()?;
        if sps_extension_flag {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "SPS extensions are not supported"));
        }

        bit_reader.align();

        Ok(Sps {
            nal_unit_header,
            sps_seq_parameter_set_id,
            pic_width_in_luma_samples,
            pic_height_in_luma_samples,
            conformance_window,
            bit_depth_luma_minus8,
            bit_depth_chroma_minus8,
            log2_max_pic_order_cnt_lsb_minus4,
            sub_layer_ordering_info,
            log2_min_luma_coding_block_size_minus3,
            log2_diff_max_min_luma_coding_block_size,
            log2_min_luma_transform_block_size_minus2,
            log2_diff_max_min_luma_transform_block_size,
            max_transform_hierarchy_depth_inter,
            max_transform_hierarchy_depth_intra,
            amp_enabled_flag,
            sample_adaptive_offset_enabled_flag,
            short_term_ref_pic_sets,
            sps_temporal_mvp_enabled_flag,
            strong_intra_smoothing_enabled_flag,
            vui_parameters,
            min_cb_log2_size_y,
            ctb_log2_size_y,
            min_tb_log2_size_y,
        })
    }

    pub fn parse_with_emulation_prevention(reader: impl io::Read) -> io::Result<Self> {
        Self::parse(EmulationPreventionIo::new(reader))
    }

    /// Cropped output width, `pic_width_in_luma_samples` minus the conformance window.
    pub fn width(&self) -> u64 {
        self.pic_width_in_luma_samples
            - self.sub_width_c() as u64
                * (self.conformance_window.conf_win_left_offset + self.conformance_window.conf_win_right_offset)
    }

    /// Cropped output height, `pic_height_in_luma_samples` minus the conformance window.
    pub fn height(&self) -> u64 {
        self.pic_height_in_luma_samples
            - self.sub_height_c() as u64
                * (self.conformance_window.conf_win_top_offset + self.conformance_window.conf_win_bottom_offset)
    }

    /// Always 2: this profile only accepts 4:2:0 chroma sampling.
    pub fn sub_width_c(&self) -> u8 {
        2
    }

    /// Always 2: this profile only accepts 4:2:0 chroma sampling.
    pub fn sub_height_c(&self) -> u8 {
        2
    }

    pub fn bit_depth_y(&self) -> u8 {
        8 + self.bit_depth_luma_minus8
    }

    pub fn bit_depth_c(&self) -> u8 {
        8 + self.bit_depth_chroma_minus8
    }

    pub fn max_pic_order_cnt_lsb(&self) -> u32 {
        1u32 << (self.log2_max_pic_order_cnt_lsb_minus4 as u32 + 4)
    }

    /// DPB size in frames, taken from the last (only) sub-layer ordering entry.
    pub fn max_dec_pic_buffering(&self) -> u64 {
        self.sub_layer_ordering_info
            .sps_max_dec_pic_buffering_minus1
            .last()
            .copied()
            .unwrap_or(0)
            + 1
    }

    pub fn min_cb_log2_size_y(&self) -> u64 {
        self.min_cb_log2_size_y
    }

    pub fn ctb_log2_size_y(&self) -> u64 {
        self.ctb_log2_size_y
    }

    pub fn min_tb_log2_size_y(&self) -> u64 {
        self.min_tb_log2_size_y
    }

    pub fn max_tb_log2_size_y(&self) -> u64 {
        self.min_tb_log2_size_y + self.log2_diff_max_min_luma_transform_block_size
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    fn fixture_640x480() -> Vec<u8> {
        fixture_640x480_with_chroma_format_idc(1)
    }

    fn fixture_640x480_with_chroma_format_idc(chroma_format_idc: u64) -> Vec<u8> {
        // Hand-built restricted-profile SPS: 640x480, 4:2:0, 8-bit, one short-term RPS,
        // mandatory VUI with the fixed colour/bitstream_restriction contract.
        use scuffle_bytes_util::BitWriter;
        use scuffle_expgolomb::BitWriterExpGolombExt;

        let mut buf = Vec::new();
        {
            let mut w = BitWriter::new(&mut buf);
            // nal_unit_header: forbidden=0, type=33 (SPS), layer=0, temporal_id_plus1=1
            w.write_bit(false).unwrap();
            w.write_bits(NALUnitType::SPS_NUT.0 as u64, 6).unwrap();
            w.write_bits(0, 6).unwrap();
            w.write_bits(1, 3).unwrap();

            w.write_bits(0, 4).unwrap(); // sps_video_parameter_set_id
            w.write_bits(0, 3).unwrap(); // sps_max_sub_layers_minus1
            w.write_bit(true).unwrap(); // sps_temporal_id_nesting_flag

            // profile_tier_level: general_profile_space(2)=0, tier=0, profile_idc(5)=1 (Main)
            w.write_bits(0, 2).unwrap();
            w.write_bit(false).unwrap();
            w.write_bits(1, 5).unwrap();
            w.write_bits(0, 32).unwrap(); // compatibility flags
            w.write_bits(0, 4).unwrap(); // source flags
            w.write_bits(0, 43).unwrap();
            w.write_bit(false).unwrap();
            w.write_bits(120, 8).unwrap(); // level_idc = 4.0

            w.write_exp_golomb(0).unwrap(); // sps_seq_parameter_set_id
            w.write_exp_golomb(chroma_format_idc).unwrap(); // chroma_format_idc
            w.write_exp_golomb(640).unwrap(); // pic_width_in_luma_samples
            w.write_exp_golomb(480).unwrap(); // pic_height_in_luma_samples
            w.write_bit(false).unwrap(); // conformance_window_flag
            w.write_exp_golomb(0).unwrap(); // bit_depth_luma_minus8
            w.write_exp_golomb(0).unwrap(); // bit_depth_chroma_minus8
            w.write_exp_golomb(4).unwrap(); // log2_max_pic_order_cnt_lsb_minus4

            w.write_bit(false).unwrap(); // sps_sub_layer_ordering_info_present_flag
            w.write_exp_golomb(4).unwrap(); // sps_max_dec_pic_buffering_minus1
            w.write_exp_golomb(0).unwrap(); // sps_max_num_reorder_pics
            w.write_exp_golomb(0).unwrap(); // sps_max_latency_increase_plus1

            w.write_exp_golomb(0).unwrap(); // log2_min_luma_coding_block_size_minus3
            w.write_exp_golomb(3).unwrap(); // log2_diff_max_min_luma_coding_block_size
            w.write_exp_golomb(0).unwrap(); // log2_min_luma_transform_block_size_minus2
            w.write_exp_golomb(3).unwrap(); // log2_diff_max_min_luma_transform_block_size
            w.write_exp_golomb(0).unwrap(); // max_transform_hierarchy_depth_inter
            w.write_exp_golomb(0).unwrap(); // max_transform_hierarchy_depth_intra

            w.write_bit(false).unwrap(); // scaling_list_enabled_flag
            w.write_bit(false).unwrap(); // amp_enabled_flag
            w.write_bit(true).unwrap(); // sample_adaptive_offset_enabled_flag
            w.write_bit(false).unwrap(); // pcm_enabled_flag

            w.write_exp_golomb(1).unwrap(); // num_short_term_ref_pic_sets
            w.write_exp_golomb(1).unwrap(); // num_negative_pics
            w.write_exp_golomb(0).unwrap(); // num_positive_pics
            w.write_exp_golomb(0).unwrap(); // delta_poc_s0_minus1
            w.write_bit(true).unwrap(); // used_by_curr_pic_s0_flag

            w.write_bit(false).unwrap(); // long_term_ref_pics_present_flag
            w.write_bit(true).unwrap(); // sps_temporal_mvp_enabled_flag
            w.write_bit(true).unwrap(); // strong_intra_smoothing_enabled_flag

            w.write_bit(true).unwrap(); // vui_parameters_present_flag
            w.write_bit(false).unwrap(); // aspect_ratio_info_present_flag
            w.write_bit(false).unwrap(); // overscan_info_present_flag
            w.write_bit(true).unwrap(); // video_signal_type_present_flag
            w.write_bits(5, 3).unwrap(); // video_format = unspecified
            w.write_bit(false).unwrap(); // video_full_range_flag
            w.write_bit(true).unwrap(); // colour_description_present_flag
            w.write_bits(2, 8).unwrap(); // colour_primaries
            w.write_bits(2, 8).unwrap(); // transfer_characteristics
            w.write_bits(6, 8).unwrap(); // matrix_coeffs
            w.write_bit(false).unwrap(); // chroma_loc_info_present_flag
            w.write_bit(false).unwrap(); // neutral_chroma_indication_flag
            w.write_bit(false).unwrap(); // field_seq_flag
            w.write_bit(false).unwrap(); // frame_field_info_present_flag
            w.write_bit(false).unwrap(); // default_display_window_flag
            w.write_bit(false).unwrap(); // vui_timing_info_present_flag
            w.write_bit(true).unwrap(); // bitstream_restriction_flag
            w.write_bit(false).unwrap(); // tiles_fixed_structure_flag
            w.write_bit(true).unwrap(); // motion_vectors_over_pic_boundaries_flag
            w.write_bit(true).unwrap(); // restricted_ref_pic_lists_flag
            w.write_exp_golomb(0).unwrap(); // min_spatial_segmentation_idc
            w.write_exp_golomb(0).unwrap(); // max_bytes_per_pic_denom
            w.write_exp_golomb(0).unwrap(); // max_bits_per_min_cu_denom
            w.write_exp_golomb(15).unwrap(); // log2_max_mv_length_horizontal
            w.write_exp_golomb(15).unwrap(); // log2_max_mv_length_vertical

            w.write_bit(false).unwrap(); // sps_extension_flag
            w.align().unwrap();
        }
        buf
    }

    #[test]
    fn parses_restricted_sps() {
        let data = fixture_640x480();
        let sps = Sps::parse(io::Cursor::new(data)).unwrap();
        assert_eq!(sps.width(), 640);
        assert_eq!(sps.height(), 480);
        assert_eq!(sps.bit_depth_y(), 8);
        assert_eq!(sps.bit_depth_c(), 8);
        assert_eq!(sps.max_pic_order_cnt_lsb(), 256);
        assert_eq!(sps.short_term_ref_pic_sets.sets.len(), 1);
        assert_eq!(sps.short_term_ref_pic_sets.sets[0].delta_poc_s0_minus1, 0);
    }

    #[test]
    fn rejects_non_420_chroma() {
        let data = fixture_640x480_with_chroma_format_idc(2); // 4:2:2, unsupported
        let err = Sps::parse(io::Cursor::new(data)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_forbidden_zero_bit() {
        let data = [0x80];
        let err = Sps::parse(io::Cursor::new(data)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
