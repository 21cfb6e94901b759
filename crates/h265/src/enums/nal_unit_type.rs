/// NAL (Network Abstraction Layer) unit types as defined by ISO/IEC 23008-2 Table 7-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NALUnitType(pub u8);

impl NALUnitType {
    /// Coded slice segment of a non-TSA, non-STSA trailing picture (VCL)
    pub const TRAIL_N: Self = Self(0);
    /// Coded slice segment of a non-TSA, non-STSA trailing picture (VCL)
    pub const TRAIL_R: Self = Self(1);
    /// Coded slice segment of a TSA picture (VCL)
    pub const TSA_N: Self = Self(2);
    /// Coded slice segment of a TSA picture (VCL)
    pub const TSA_R: Self = Self(3);
    /// Coded slice segment of an STSA picture (VCL)
    pub const STSA_N: Self = Self(4);
    /// Coded slice segment of an STSA picture (VCL)
    pub const STSA_R: Self = Self(5);
    /// Coded slice segment of a RADL picture (VCL)
    pub const RADL_N: Self = Self(6);
    /// Coded slice segment of a RADL picture (VCL)
    pub const RADL_R: Self = Self(7);
    /// Coded slice segment of a RASL picture (VCL)
    pub const RASL_N: Self = Self(8);
    /// Coded slice segment of a RASL picture (VCL)
    pub const RASL_R: Self = Self(9);
    /// Coded slice segment of a BLA picture (VCL)
    pub const BLA_W_LP: Self = Self(16);
    /// Coded slice segment of a BLA picture (VCL)
    pub const BLA_W_RADL: Self = Self(17);
    /// Coded slice segment of a BLA picture (VCL)
    pub const BLA_N_LP: Self = Self(18);
    /// Coded slice segment of an IDR picture (VCL)
    pub const IDR_W_RADL: Self = Self(19);
    /// Coded slice segment of an IDR picture (VCL)
    pub const IDR_N_LP: Self = Self(20);
    /// Coded slice segment of a CRA picture (VCL)
    pub const CRA_NUT: Self = Self(21);
    /// Reserved IRAP VCL NAL unit types, inclusive upper bound used for range checks.
    pub const RSV_IRAP_VCL23: Self = Self(23);
    /// Video parameter set (non-VCL)
    pub const VPS_NUT: Self = Self(32);
    /// Sequence parameter set (non-VCL)
    pub const SPS_NUT: Self = Self(33);
    /// Picture parameter set (non-VCL)
    pub const PPS_NUT: Self = Self(34);
    /// Access unit delimiter (non-VCL)
    pub const AUD_NUT: Self = Self(35);
    /// End of sequence (non-VCL)
    pub const EOS_NUT: Self = Self(36);
    /// End of bitstream (non-VCL)
    pub const EOB_NUT: Self = Self(37);

    /// Returns `true` if the NAL unit type class is VCL (Video Coding Layer).
    ///
    /// See ISO/IEC 23008-2 - Table 7-1, NAL unit type class column.
    pub const fn is_vcl(self) -> bool {
        self.0 <= 31
    }

    /// Returns `true` for the IRAP range (16..=23): BLA, IDR and CRA picture types.
    pub const fn is_irap(self) -> bool {
        self.0 >= Self::BLA_W_LP.0 && self.0 <= Self::RSV_IRAP_VCL23.0
    }

    /// Returns `true` for an IDR picture (`IDR_W_RADL` or `IDR_N_LP`).
    pub const fn is_idr(self) -> bool {
        self.0 == Self::IDR_W_RADL.0 || self.0 == Self::IDR_N_LP.0
    }

    /// Slice-segment-header-bearing NAL unit types supported by this parser: a
    /// restricted-profile stream only ever emits trailing (P) or IDR slices.
    pub const fn is_slice_segment(self) -> bool {
        self.0 == Self::TRAIL_R.0 || self.is_idr()
    }
}

impl From<u8> for NALUnitType {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vcl_range() {
        assert!(NALUnitType::TRAIL_N.is_vcl());
        assert!(NALUnitType::RASL_R.is_vcl());
        assert!(!NALUnitType::VPS_NUT.is_vcl());
    }

    #[test]
    fn idr_and_irap() {
        assert!(NALUnitType::IDR_W_RADL.is_idr());
        assert!(NALUnitType::IDR_N_LP.is_idr());
        assert!(!NALUnitType::TRAIL_R.is_idr());
        assert!(NALUnitType::BLA_W_LP.is_irap());
        assert!(NALUnitType::CRA_NUT.is_irap());
        assert!(!NALUnitType::TRAIL_R.is_irap());
    }
}
