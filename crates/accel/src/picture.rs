use std::rc::Rc;

use cros_libva::{Config, Context as RawContext, Picture, VAEntrypoint, VAProfile, bindings};

use crate::display::VaDisplay;
use crate::error::{AccelError, Result};
use crate::params::{PictureParameterHevc, SliceParameterHevc};
use crate::surface::{DECODE_USAGE_HINT, Surface};

/// A configured VA-API decode context: one profile/entrypoint/config/context
/// triple, created once per stream (i.e. once per SPS) and reused for every
/// picture until the stream resets.
pub struct DecoderContext {
    display: Rc<cros_libva::Display>,
    context: Rc<RawContext>,
    // Kept alive for as long as `context` is; VA-API requires the config to
    // outlive any context created from it.
    _config: Config,
}

impl DecoderContext {
    /// Creates a VA-API config + context for HEVC Main profile / VLD entrypoint
    /// at `width`x`height`, allocating `num_surfaces` NV12 decode-target
    /// surfaces up front and exporting each one's dmabuf handles.
    pub fn new(display: &VaDisplay, width: u32, height: u32, num_surfaces: usize) -> Result<(Self, Vec<Surface>)> {
        let raw_display = display.raw();

        let config = raw_display.create_config(
            None,
            VAProfile::VAProfileHEVCMain,
            VAEntrypoint::VAEntrypointVLD,
        )?;

        let raw_surfaces = raw_display.create_surfaces(
            bindings::VA_RT_FORMAT_YUV420,
            Some(bindings::VA_FOURCC_NV12),
            width,
            height,
            DECODE_USAGE_HINT,
            num_surfaces as u32,
        )?;

        let context = raw_display.create_context(&config, width as usize, height as usize, Some(&raw_surfaces), true)?;

        let surfaces = raw_surfaces
            .into_iter()
            .map(Surface::new)
            .collect::<Result<Vec<_>>>()?;

        Ok((
            Self {
                display: Rc::clone(raw_display),
                context,
                _config: config,
            },
            surfaces,
        ))
    }

    /// Runs one restricted-profile picture through the upload -> begin ->
    /// render -> end -> sync sequence. `target` is the decode destination
    /// surface; reference surfaces are named by id inside `pic_param` and
    /// must already be locked by the caller for the duration of this call.
    pub fn submit_picture(
        &self,
        target: &Surface,
        pic_param: &PictureParameterHevc,
        slice_param: &SliceParameterHevc,
        slice_data: &[u8],
    ) -> Result<()> {
        let raw_pic_param = lower_picture_parameter(pic_param);
        let raw_slice_param = lower_slice_parameter(slice_param);

        let pic_param_buffer = self
            .context
            .create_buffer(cros_libva::BufferType::PictureParameter(
                cros_libva::PictureParameter::HEVC(Box::new(raw_pic_param)),
            ))
            .map_err(AccelError::Va)?;
        let slice_param_buffer = self
            .context
            .create_buffer(cros_libva::BufferType::SliceParameter(
                cros_libva::SliceParameter::HEVC(vec![raw_slice_param]),
            ))
            .map_err(AccelError::Va)?;
        let slice_data_buffer = self
            .context
            .create_buffer(cros_libva::BufferType::SliceData(slice_data.to_vec()))
            .map_err(AccelError::Va)?;

        let mut picture = Picture::new(0, Rc::clone(&self.context), target.raw());
        picture.add_buffer(pic_param_buffer);
        picture.add_buffer(slice_param_buffer);
        picture.add_buffer(slice_data_buffer);

        let picture = picture.begin().map_err(AccelError::Va)?;
        let picture = picture.render().map_err(AccelError::Va)?;
        let picture = picture.end().map_err(AccelError::Va)?;
        picture.sync().map_err(AccelError::Va)?;

        Ok(())
    }

    pub(crate) fn display(&self) -> &Rc<cros_libva::Display> {
        &self.display
    }
}

// TODO(accel): a handful of this restricted profile's always-off flags
// (scaling lists, tiles/WPP, extended precision) live in `pic_fields`'
// bitfield union alongside the ones set below; their exact bindgen-generated
// accessor names depend on the pinned cros-libva version and aren't wired
// here. The accelerator-contract constants SPEC_FULL §4.4 calls out by name
// (PCM sample bit depths, the PCM coding-block-size sentinel,
// loop-filter-across-tiles, SAO-enabled) are plain fields / named bitfield
// setters and are populated below regardless.
fn lower_picture_parameter(p: &PictureParameterHevc) -> bindings::VAPictureParameterBufferHEVC {
    // SAFETY: a bindgen FFI struct of plain integers and bitfield unions; a
    // zeroed value is a valid (if semantically "all flags off") bit pattern
    // for every member, which is a faithful representation of this client's
    // restricted-profile defaults.
    let mut raw: bindings::VAPictureParameterBufferHEVC = unsafe { std::mem::zeroed() };

    raw.CurrPic.picture_id = p.curr_pic.surface_id;
    raw.CurrPic.pic_order_cnt = p.curr_pic.pic_order_cnt;
    for (slot, reference) in raw.ReferenceFrames.iter_mut().zip(p.reference_frames.iter()) {
        slot.picture_id = reference.surface_id;
        slot.pic_order_cnt = reference.pic_order_cnt;
    }

    raw.pic_width_in_luma_samples = p.pic_width_in_luma_samples;
    raw.pic_height_in_luma_samples = p.pic_height_in_luma_samples;
    raw.log2_min_luma_coding_block_size_minus3 = p.log2_min_luma_coding_block_size_minus3;
    raw.log2_diff_max_min_luma_coding_block_size = p.log2_diff_max_min_luma_coding_block_size;
    raw.log2_min_transform_block_size_minus2 = p.log2_min_transform_block_size_minus2;
    raw.log2_diff_max_min_transform_block_size = p.log2_diff_max_min_transform_block_size;
    raw.max_transform_hierarchy_depth_inter = p.max_transform_hierarchy_depth_inter;
    raw.max_transform_hierarchy_depth_intra = p.max_transform_hierarchy_depth_intra;
    raw.bit_depth_luma_minus8 = p.bit_depth_luma_minus8 as i32;
    raw.bit_depth_chroma_minus8 = p.bit_depth_chroma_minus8 as i32;
    raw.log2_max_pic_order_cnt_lsb_minus4 = p.log2_max_pic_order_cnt_lsb_minus4 as i32;
    raw.num_short_term_ref_pic_sets = p.num_short_term_ref_pic_sets;
    raw.num_ref_idx_l0_default_active_minus1 = p.num_ref_idx_l0_default_active_minus1;
    raw.num_ref_idx_l1_default_active_minus1 = p.num_ref_idx_l1_default_active_minus1;
    raw.init_qp_minus26 = p.init_qp_minus26 as i32;
    // Accelerator-contract constants (SPEC_FULL §4.4's "fixed/weird fields"):
    // not read back out of the bitstream, but required by the accelerator
    // regardless of whether this restricted profile actually enables PCM.
    raw.pcm_sample_bit_depth_luma_minus1 = p.pcm_sample_bit_depth_luma as u16;
    raw.pcm_sample_bit_depth_chroma_minus1 = p.pcm_sample_bit_depth_chroma as u16;
    raw.log2_min_pcm_luma_coding_block_size_minus3 = p.log2_min_pcm_luma_coding_block_size_minus3;
    raw.pic_fields
        .bits
        .set_loop_filter_across_tiles_enabled_flag(p.loop_filter_across_tiles_enabled_flag as u32);
    raw.slice_parsing_fields
        .bits
        .set_sample_adaptive_offset_enabled_flag(p.sample_adaptive_offset_enabled_flag as u32);

    raw
}

fn lower_slice_parameter(s: &SliceParameterHevc) -> bindings::VASliceParameterBufferHEVC {
    // SAFETY: see `lower_picture_parameter`.
    let mut raw: bindings::VASliceParameterBufferHEVC = unsafe { std::mem::zeroed() };

    raw.slice_data_size = s.slice_data_size;
    raw.slice_data_offset = s.slice_data_offset;
    raw.slice_data_byte_offset = s.slice_data_byte_offset;
    raw.slice_data_num_emu_prevention_bytes_read = s.slice_data_num_emu_prevention_bytes_read;
    raw.slice_segment_address = s.slice_segment_address;
    raw.num_ref_idx_l0_active_minus1 = s.num_ref_idx_l0_active_minus1;
    raw.num_ref_idx_l1_active_minus1 = s.num_ref_idx_l1_active_minus1;
    raw.collocated_ref_idx = s.collocated_ref_idx;
    raw.slice_qp_delta = s.slice_qp_delta as i32;
    for (dst, src) in raw.RefPicList[0].iter_mut().zip(s.ref_pic_list[0].iter()) {
        *dst = *src;
    }
    for (dst, src) in raw.RefPicList[1].iter_mut().zip(s.ref_pic_list[1].iter()) {
        *dst = *src;
    }

    raw
}
