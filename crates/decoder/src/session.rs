use scuffle_accel::{DecoderContext, PictureParameterHevc, PictureRef, SliceParameterHevc, VaDisplay};
use scuffle_h265::{Pps, SliceSegmentHeader, Sps};

use crate::error::{DecoderError, Result};
use crate::pool::SurfacePool;

const DEFAULT_POOL_SIZE: usize = 3;

/// A single decoded picture, ready to hand to the presenter.
#[derive(Debug, Clone, Copy)]
pub struct DecodedFrame {
    /// Index into the session's surface pool; the surface the presenter should show.
    pub surface_index: usize,
    /// Cropped output rectangle: `(left, top, width, height)`, from the active SPS's conformance window.
    pub crop: (u32, u32, u32, u32),
    pub global_counter: u64,
    pub local_counter: u64,
}

enum State {
    Uninitialised,
    SpsSeen { sps: Sps },
    Running(Running),
    Failed,
}

struct Running {
    sps: Sps,
    pps: Pps,
    context: DecoderContext,
    pool: SurfacePool,
    /// Resets to 0 on every IDR; POC of the most recently decoded picture.
    local_counter: u64,
    /// Never resets; total pictures submitted this session, also the pool index driver.
    global_counter: u64,
}

/// Owns the accelerator context and surface pool for one HEVC bitstream.
///
/// Follows *uninitialised -> header-seen -> running -> failed* exactly as
/// laid out in the decode-session design notes: initialisation is deferred
/// until both an SPS and a PPS have been parsed, since only then is the
/// picture size known and the accelerator context and surface pool can be
/// created.
pub struct DecoderSession {
    display: VaDisplay,
    pool_size: usize,
    state: State,
}

impl DecoderSession {
    pub fn new(display: VaDisplay) -> Self {
        Self::with_pool_size(display, DEFAULT_POOL_SIZE)
    }

    pub fn with_pool_size(display: VaDisplay, pool_size: usize) -> Self {
        Self {
            display,
            pool_size,
            state: State::Uninitialised,
        }
    }

    /// Records a freshly parsed SPS. Initialisation only happens once a
    /// matching PPS has also been seen; a second SPS after the session is
    /// already running is rejected rather than silently re-initialising the
    /// accelerator context mid-stream.
    pub fn on_sps(&mut self, sps: Sps) -> Result<()> {
        match &self.state {
            State::Uninitialised | State::SpsSeen { .. } => {
                self.state = State::SpsSeen { sps };
                Ok(())
            }
            State::Running(_) => Err(DecoderError::AlreadyInitialised),
            State::Failed => Err(DecoderError::Failed),
        }
    }

    /// Records a freshly parsed PPS and, once an SPS is also on hand,
    /// transitions the session to `running` by creating the accelerator
    /// context and surface pool.
    pub fn on_pps(&mut self, pps: Pps) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Failed) {
            State::SpsSeen { sps } => {
                let width = sps.pic_width_in_luma_samples as u32;
                let height = sps.pic_height_in_luma_samples as u32;
                tracing::debug!(width, height, pool_size = self.pool_size, "initialising decoder session");
                let (context, surfaces) = DecoderContext::new(&self.display, width, height, self.pool_size)?;
                self.state = State::Running(Running {
                    sps,
                    pps,
                    context,
                    pool: SurfacePool::new(surfaces),
                    local_counter: 0,
                    global_counter: 0,
                });
                Ok(())
            }
            State::Running(mut running) => {
                running.pps = pps;
                self.state = State::Running(running);
                Ok(())
            }
            State::Uninitialised => {
                self.state = State::Uninitialised;
                Err(DecoderError::HeaderNotSeen)
            }
            State::Failed => Err(DecoderError::Failed),
        }
    }

    /// Executes one picture: the upload/begin/render/end sequence described
    /// in the decode-session design notes.
    pub fn decode_slice(&mut self, header: &SliceSegmentHeader, slice_data: &[u8]) -> Result<DecodedFrame> {
        let running = match &mut self.state {
            State::Running(running) => running,
            State::Uninitialised | State::SpsSeen { .. } => return Err(DecoderError::HeaderNotSeen),
            State::Failed => return Err(DecoderError::Failed),
        };

        if header.slice_pic_parameter_set_id != running.pps.pps_pic_parameter_set_id {
            return Err(DecoderError::PpsMismatch {
                slice: header.slice_pic_parameter_set_id,
                active: running.pps.pps_pic_parameter_set_id,
            });
        }

        let is_idr = header.nal_unit_header.nal_unit_type.is_idr();
        if is_idr {
            running.local_counter = 0;
        }

        let pool_size = running.pool.len();
        let current_index = running.pool.index_for(running.global_counter);
        let current_surface_id = running.pool.get(current_index).id();

        let mut reference_frames = [PictureRef::INVALID; 15];
        let mut ref_pic_list = [[SliceParameterHevc::INVALID_REF_IDX; 15]; 2];

        if running.local_counter > 0 {
            let prev_index = (current_index + pool_size - 1) % pool_size;
            let prev_surface = running.pool.get(prev_index);
            reference_frames[0] = PictureRef {
                surface_id: prev_surface.id(),
                pic_order_cnt: (running.local_counter - 1) as i32,
            };
            ref_pic_list[0][0] = 0;
        }

        let rap_pic_flag = header.nal_unit_header.nal_unit_type.is_irap();
        let idr_pic_flag = is_idr;
        let intra_pic_flag = rap_pic_flag;

        let pic_param = PictureParameterHevc {
            curr_pic: PictureRef {
                surface_id: current_surface_id,
                pic_order_cnt: running.local_counter as i32,
            },
            reference_frames,
            pic_width_in_luma_samples: running.sps.pic_width_in_luma_samples as u16,
            pic_height_in_luma_samples: running.sps.pic_height_in_luma_samples as u16,
            bit_depth_luma_minus8: running.sps.bit_depth_luma_minus8,
            bit_depth_chroma_minus8: running.sps.bit_depth_chroma_minus8,
            log2_min_luma_coding_block_size_minus3: running.sps.log2_min_luma_coding_block_size_minus3 as u8,
            log2_diff_max_min_luma_coding_block_size: running.sps.log2_diff_max_min_luma_coding_block_size as u8,
            log2_min_transform_block_size_minus2: running.sps.log2_min_luma_transform_block_size_minus2 as u8,
            log2_diff_max_min_transform_block_size: running.sps.log2_diff_max_min_luma_transform_block_size as u8,
            max_transform_hierarchy_depth_inter: running.sps.max_transform_hierarchy_depth_inter as u8,
            max_transform_hierarchy_depth_intra: running.sps.max_transform_hierarchy_depth_intra as u8,
            log2_max_pic_order_cnt_lsb_minus4: running.sps.log2_max_pic_order_cnt_lsb_minus4,
            num_short_term_ref_pic_sets: running.sps.short_term_ref_pic_sets.sets.len() as u8,
            num_ref_idx_l0_default_active_minus1: running.pps.num_ref_idx_l0_default_active_minus1 as u8,
            num_ref_idx_l1_default_active_minus1: running.pps.num_ref_idx_l1_default_active_minus1 as u8,
            init_qp_minus26: running.pps.init_qp_minus26 as i8,
            no_pic_reordering_flag: true,
            no_bi_pred_flag: true,
            rap_pic_flag,
            idr_pic_flag,
            intra_pic_flag,
            st_rps_bits: 0,
            pcm_sample_bit_depth_luma: scuffle_accel::pcm_sample_bit_depth(running.sps.bit_depth_luma_minus8),
            pcm_sample_bit_depth_chroma: scuffle_accel::pcm_sample_bit_depth(running.sps.bit_depth_chroma_minus8),
            log2_min_pcm_luma_coding_block_size_minus3: scuffle_accel::LOG2_MIN_PCM_LUMA_CODING_BLOCK_SIZE_SENTINEL,
            loop_filter_across_tiles_enabled_flag: true,
            sample_adaptive_offset_enabled_flag: true,
        };

        let num_ref_idx_l0_active_minus1 = header
            .ref_idx_active_override
            .map(|o| o.num_ref_idx_l0_active_minus1)
            .unwrap_or(running.pps.num_ref_idx_l0_default_active_minus1) as u8;

        let slice_param = SliceParameterHevc {
            slice_data_size: slice_data.len() as u32,
            slice_data_offset: 0,
            slice_data_byte_offset: header.slice_data_byte_offset as u32,
            slice_data_num_emu_prevention_bytes_read: header.epb_count as u32,
            slice_segment_address: 0,
            ref_pic_list,
            num_ref_idx_l0_active_minus1,
            num_ref_idx_l1_active_minus1: running.pps.num_ref_idx_l1_default_active_minus1 as u8,
            collocated_ref_idx: SliceSegmentHeader::COLLOCATED_REF_IDX,
            collocated_from_l0_flag: SliceSegmentHeader::COLLOCATED_FROM_L0_FLAG,
            slice_qp_delta: header.slice_qp_delta as i8,
            slice_type: match header.slice_type {
                scuffle_h265::SliceType::P => 1,
                scuffle_h265::SliceType::I => 2,
            },
        };

        // Submitting needs a &Surface borrowed from the pool; the pool itself
        // isn't touched by the accelerator call, only read.
        let submit_result = {
            let target = running.pool.get(current_index);
            running.context.submit_picture(target, &pic_param, &slice_param, slice_data)
        };
        submit_result?;

        running.pool.lock_only(current_index);
        let shown_index = running.pool.first_locked().unwrap_or(current_index);

        running.local_counter += 1;
        running.global_counter += 1;

        let sps = &running.sps;
        let crop = (
            (sps.conformance_window.conf_win_left_offset * sps.sub_width_c() as u64) as u32,
            (sps.conformance_window.conf_win_top_offset * sps.sub_height_c() as u64) as u32,
            sps.width() as u32,
            sps.height() as u32,
        );

        Ok(DecodedFrame {
            surface_index: shown_index,
            crop,
            global_counter: running.global_counter,
            local_counter: running.local_counter,
        })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed)
    }

    pub fn pool(&self) -> Option<&SurfacePool> {
        match &self.state {
            State::Running(running) => Some(&running.pool),
            _ => None,
        }
    }

    /// The most recently parsed SPS, once at least one has been seen.
    pub fn sps(&self) -> Option<&Sps> {
        match &self.state {
            State::SpsSeen { sps } => Some(sps),
            State::Running(running) => Some(&running.sps),
            _ => None,
        }
    }

    /// The active PPS, once the session has finished initialising.
    pub fn pps(&self) -> Option<&Pps> {
        match &self.state {
            State::Running(running) => Some(&running.pps),
            _ => None,
        }
    }
}
