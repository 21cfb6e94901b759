use std::io;

use scuffle_bytes_util::BitReader;

/// Profile/tier/level block restricted to HEVC Main profile, level 4.0 (ISO/IEC 23008-2 - 7.3.3).
///
/// The supported subset always has `sps_max_sub_layers_minus1 == 0`, so there are never any
/// sub-layer profile/level entries to parse; this type only validates the general block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileTierLevel {
    pub general_profile_idc: u8,
    pub general_level_idc: u8,
}

/// HEVC Main profile, ISO/IEC 23008-2 - Annex A.3.2.
const MAIN_PROFILE_IDC: u8 = 1;
/// Level 4.0, encoded as `level_idc = 30 * level` (ISO/IEC 23008-2 - Table A.8).
const LEVEL_4_0: u8 = 120;

impl ProfileTierLevel {
    pub fn parse<R: io::Read>(bit_reader: &mut BitReader<R>, max_num_sub_layers_minus_1: u8) -> io::Result<Self> {
        bit_reader.read_bits(2)?; // general_profile_space, must be 0
        let general_tier_flag = bit_reader.read_bit()?;
        let general_profile_idc = bit_reader.read_bits(5)? as u8;
        bit_reader.read_bits(32)?; // general_profile_compatibility_flag[32]
        bit_reader.read_bits(4)?; // progressive/interlaced/non_packed/frame_only source flags
        bit_reader.read_bits(43)?; // general_reserved_zero_43bits
        bit_reader.read_bits(1)?; // general_inbld_flag / reserved bit
        let general_level_idc = bit_reader.read_u8()?;

        if general_profile_idc != MAIN_PROFILE_IDC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported general_profile_idc {general_profile_idc}, only HEVC Main (1) is supported"),
            ));
        }
        if general_tier_flag {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "general_tier_flag must be 0 (Main tier)"));
        }
        if general_level_idc != LEVEL_4_0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported general_level_idc {general_level_idc}, only level 4.0 (120) is supported"),
            ));
        }

        debug_assert_eq!(max_num_sub_layers_minus_1, 0, "restricted profile never has sub-layers");

        Ok(Self {
            general_profile_idc,
            general_level_idc,
        })
    }
}
