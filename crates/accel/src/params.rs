//! Plain-data mirrors of the VA-API HEVC decode buffer structures.
//!
//! These are deliberately *not* the FFI structs `cros_libva` sends over the
//! wire (that packing is `cros_libva`'s concern, not ours); they're a
//! convenient, fully-owned Rust shape for `scuffle-decoder` to populate from a
//! parsed [`scuffle_h265::Sps`]/[`scuffle_h265::Pps`]/[`scuffle_h265::SliceSegmentHeader`]
//! before this crate lowers them into the real buffers at submission time.

/// One entry of a `VAPictureParameterBufferHEVC`-style reference slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PictureRef {
    pub surface_id: u32,
    pub pic_order_cnt: i32,
}

impl PictureRef {
    /// The sentinel the accelerator uses for "no picture in this slot", mirroring `VA_INVALID_SURFACE`.
    pub const INVALID: Self = Self {
        surface_id: u32::MAX,
        pic_order_cnt: 0,
    };

    pub fn is_valid(&self) -> bool {
        self.surface_id != u32::MAX
    }
}

impl Default for PictureRef {
    fn default() -> Self {
        Self::INVALID
    }
}

/// The accelerator-contract PCM sample bit depth constant, `(1 << (bit_depth
/// + 8)) - 1`. This profile writes it regardless of whether PCM is actually
/// enabled in the bitstream; SPEC_FULL §4.4 calls it out by name as a
/// "fixed/weird field" that must be preserved by a re-implementation even
/// though it is never read back out of the bitstream itself.
pub fn pcm_sample_bit_depth(bit_depth_minus8: u8) -> u32 {
    let bit_depth = bit_depth_minus8 as u32 + 8;
    (1u32 << (bit_depth + 8)) - 1
}

/// `log2_min_pcm_luma_coding_block_size_minus3`'s accelerator-contract
/// sentinel for "PCM is not used by this restricted profile".
pub const LOG2_MIN_PCM_LUMA_CODING_BLOCK_SIZE_SENTINEL: u8 = 253;

/// The restricted-profile subset of `VAPictureParameterBufferHEVC` this
/// client populates. Fields this restricted profile fixes to a single value
/// (scaling lists, tiles, WPP, extended precision) aren't represented here at
/// all; the decoder session never needs to set them because the driver
/// defaults match the stream's own fixed values. SAO, PCM-sentinel and
/// loop-filter-across-tiles are accelerator-contract constants per SPEC_FULL
/// §4.4 and are represented explicitly below instead.
#[derive(Debug, Clone, Copy)]
pub struct PictureParameterHevc {
    pub curr_pic: PictureRef,
    /// Up to 15 short-term reference slots; unused slots are [`PictureRef::INVALID`].
    pub reference_frames: [PictureRef; 15],
    pub pic_width_in_luma_samples: u16,
    pub pic_height_in_luma_samples: u16,
    pub bit_depth_luma_minus8: u8,
    pub bit_depth_chroma_minus8: u8,
    pub log2_min_luma_coding_block_size_minus3: u8,
    pub log2_diff_max_min_luma_coding_block_size: u8,
    pub log2_min_transform_block_size_minus2: u8,
    pub log2_diff_max_min_transform_block_size: u8,
    pub max_transform_hierarchy_depth_inter: u8,
    pub max_transform_hierarchy_depth_intra: u8,
    pub log2_max_pic_order_cnt_lsb_minus4: u8,
    pub num_short_term_ref_pic_sets: u8,
    pub num_ref_idx_l0_default_active_minus1: u8,
    pub num_ref_idx_l1_default_active_minus1: u8,
    pub init_qp_minus26: i8,
    pub no_pic_reordering_flag: bool,
    pub no_bi_pred_flag: bool,
    pub rap_pic_flag: bool,
    pub idr_pic_flag: bool,
    pub intra_pic_flag: bool,
    pub st_rps_bits: u32,
    /// `(1 << (bit_depth_luma + 8)) - 1`; see [`pcm_sample_bit_depth`].
    pub pcm_sample_bit_depth_luma: u32,
    /// `(1 << (bit_depth_chroma + 8)) - 1`; see [`pcm_sample_bit_depth`].
    pub pcm_sample_bit_depth_chroma: u32,
    /// Fixed to [`LOG2_MIN_PCM_LUMA_CODING_BLOCK_SIZE_SENTINEL`]; this profile never enables PCM.
    pub log2_min_pcm_luma_coding_block_size_minus3: u8,
    /// Fixed to `true`; this profile always enables loop filtering across tiles.
    pub loop_filter_across_tiles_enabled_flag: bool,
    /// Fixed to `true`; SPS parsing already asserts `sample_adaptive_offset_enabled_flag == 1`.
    pub sample_adaptive_offset_enabled_flag: bool,
}

/// The restricted-profile subset of `VASliceParameterBufferHEVC`.
#[derive(Debug, Clone, Copy)]
pub struct SliceParameterHevc {
    pub slice_data_size: u32,
    pub slice_data_offset: u32,
    pub slice_data_byte_offset: u32,
    /// Count of emulation-prevention bytes elided from `slice_data_byte_offset`;
    /// carried alongside it per SPEC_FULL §3/§4.5 step 3 ("the adjusted
    /// slice-data byte offset and the EPB count").
    pub slice_data_num_emu_prevention_bytes_read: u32,
    pub slice_segment_address: u32,
    /// `RefPicList[0][i]` / `RefPicList[1][i]`: index into `reference_frames`, or `0xff` if unused.
    pub ref_pic_list: [[u8; 15]; 2],
    pub num_ref_idx_l0_active_minus1: u8,
    pub num_ref_idx_l1_active_minus1: u8,
    pub collocated_ref_idx: u8,
    pub collocated_from_l0_flag: bool,
    pub slice_qp_delta: i8,
    pub slice_type: u8,
}

impl SliceParameterHevc {
    pub const INVALID_REF_IDX: u8 = 0xff;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_picture_ref_is_invalid() {
        let r = PictureRef::default();
        assert!(!r.is_valid());
        assert_eq!(r, PictureRef::INVALID);
    }

    #[test]
    fn nonzero_surface_id_is_valid() {
        let r = PictureRef {
            surface_id: 3,
            pic_order_cnt: -2,
        };
        assert!(r.is_valid());
    }

    #[test]
    fn pcm_sample_bit_depth_matches_the_accelerator_contract_formula() {
        // This restricted profile only decodes 8-bit streams: bit_depth_minus8 = 0,
        // bit_depth = 8, so the formula gives (1 << 16) - 1.
        assert_eq!(pcm_sample_bit_depth(0), 0xFFFF);
    }
}
