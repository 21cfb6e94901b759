use std::io;
use std::num::NonZero;

use scuffle_bytes_util::BitReader;

use crate::NALUnitType;
use crate::range_check::range_check;

/// The two-byte NAL unit header prefixing every Annex-B NAL unit, ISO/IEC 23008-2 - 7.3.1.2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NALUnitHeader {
    pub nal_unit_type: NALUnitType,

    /// Identifier of the layer a VCL NAL unit belongs to, or the layer a non-VCL NAL unit
    /// applies to. Ranges `[0, 63]`; 63 is reserved.
    pub nuh_layer_id: u8,

    /// `nuh_temporal_id_plus1`, minus one, is this NAL unit's temporal id. Cannot be zero.
    pub nuh_temporal_id_plus1: NonZero<u8>,
}

impl NALUnitHeader {
    pub fn parse<R: io::Read>(bit_reader: &mut BitReader<R>) -> io::Result<Self> {
        let forbidden_zero_bit = bit_reader.read_bit()?;
        if forbidden_zero_bit {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "forbidden_zero_bit is not zero"));
        }

        let nal_unit_type = NALUnitType::from(bit_reader.read_bits(6)? as u8);
        let nuh_layer_id = bit_reader.read_bits(6)? as u8;
        range_check!(nuh_layer_id, 0, 63)?;

        if nal_unit_type == NALUnitType::EOB_NUT && nuh_layer_id != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "nuh_layer_id must be 0 when nal_unit_type is EOB_NUT",
            ));
        }

        let nuh_temporal_id_plus1 = bit_reader.read_bits(3)? as u8;
        let nuh_temporal_id_plus1 = NonZero::new(nuh_temporal_id_plus1)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "nuh_temporal_id_plus1 cannot be 0"))?;

        let must_be_zero_temporal_id = (NALUnitType::BLA_W_LP..=NALUnitType::RSV_IRAP_VCL23).contains(&nal_unit_type)
            || nal_unit_type == NALUnitType::VPS_NUT
            || nal_unit_type == NALUnitType::SPS_NUT
            || nal_unit_type == NALUnitType::EOS_NUT
            || nal_unit_type == NALUnitType::EOB_NUT;
        if must_be_zero_temporal_id && nuh_temporal_id_plus1.get() != 1 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("TemporalId must be 0 for nal_unit_type {nal_unit_type:?}"),
            ));
        }

        Ok(Self {
            nal_unit_type,
            nuh_layer_id,
            nuh_temporal_id_plus1,
        })
    }

    /// `TemporalId` (ISO/IEC 23008-2 - 7-1).
    pub fn temporal_id(&self) -> u8 {
        self.nuh_temporal_id_plus1.get() - 1
    }
}

#[cfg(test)]
mod tests {
    use scuffle_bytes_util::BitReader;

    use super::*;

    fn encode_header(nal_unit_type: u8, layer_id: u8, temporal_id_plus1: u8) -> Vec<u8> {
        let byte0 = (nal_unit_type << 1) | (layer_id >> 5);
        let byte1 = (layer_id << 3) | temporal_id_plus1;
        vec![byte0, byte1]
    }

    #[test]
    fn parses_sps_header() {
        let bytes = encode_header(NALUnitType::SPS_NUT.0, 0, 1);
        let mut reader = BitReader::new(&bytes[..]);
        let header = NALUnitHeader::parse(&mut reader).unwrap();
        assert_eq!(header.nal_unit_type, NALUnitType::SPS_NUT);
        assert_eq!(header.temporal_id(), 0);
    }

    #[test]
    fn rejects_nonzero_temporal_id_for_sps() {
        let bytes = encode_header(NALUnitType::SPS_NUT.0, 0, 2);
        let mut reader = BitReader::new(&bytes[..]);
        assert!(NALUnitHeader::parse(&mut reader).is_err());
    }
}
