use scuffle_bytes_util::{BitReader, EmulationPreventionIo};
use scuffle_decoder::{DecodedFrame, DecoderSession};
use scuffle_h265::{NALUnitType, Pps, SliceSegmentHeader, Sps};

use crate::error::{ClientError, Result};

/// Splits one HEVC Annex-B access unit into NAL units and feeds each to the
/// decoder session, returning every decoded frame it produced.
///
/// Parameter-set NAL units update the session's SPS/PPS; slice NAL units are
/// parsed against whatever SPS/PPS the session currently holds and handed to
/// [`DecoderSession::decode_slice`].
pub fn feed_access_unit(session: &mut DecoderSession, payload: &[u8]) -> Result<Vec<DecodedFrame>> {
    let mut frames = Vec::new();
    for nal in scuffle_h265::AnnexBIter::new(payload) {
        if let Some(frame) = feed_nal(session, nal)? {
            frames.push(frame);
        }
    }
    Ok(frames)
}

fn feed_nal(session: &mut DecoderSession, nal: &[u8]) -> Result<Option<DecodedFrame>> {
    let Some(&first_byte) = nal.first() else {
        return Ok(None);
    };
    let nal_unit_type = NALUnitType::from((first_byte >> 1) & 0x3f);

    if nal_unit_type == NALUnitType::SPS_NUT {
        let sps = Sps::parse(EmulationPreventionIo::new(nal)).map_err(ClientError::NalParse)?;
        session.on_sps(sps)?;
        return Ok(None);
    }

    if nal_unit_type == NALUnitType::PPS_NUT {
        let pps = Pps::parse(EmulationPreventionIo::new(nal)).map_err(ClientError::NalParse)?;
        session.on_pps(pps)?;
        return Ok(None);
    }

    if !nal_unit_type.is_slice_segment() {
        tracing::trace!(nal_unit_type = nal_unit_type.0, "ignoring non-slice, non-parameter-set NAL unit");
        return Ok(None);
    }

    let sps = session.sps().cloned().ok_or(ClientError::HeaderNotSeen)?;
    let pps = session.pps().cloned().ok_or(ClientError::HeaderNotSeen)?;

    let mut bit_reader = BitReader::new(EmulationPreventionIo::new(nal));
    let header = SliceSegmentHeader::parse(&mut bit_reader, &sps, &pps).map_err(ClientError::NalParse)?;

    let slice_data_offset = (header.slice_data_byte_offset as usize).min(nal.len());
    let slice_data = &nal[slice_data_offset..];

    let frame = session.decode_slice(&header, slice_data)?;
    Ok(Some(frame))
}
