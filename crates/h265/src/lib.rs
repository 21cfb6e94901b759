#![deny(unsafe_code)]
#![deny(clippy::missing_const_for_fn)]

mod annex_b;
mod enums;
mod nal_unit_header;
mod pps;
mod range_check;
mod slice_header;
mod sps;

pub use self::annex_b::AnnexBIter;
pub use self::enums::{AspectRatioIdc, NALUnitType, VideoFormat};
pub use self::nal_unit_header::NALUnitHeader;
pub use self::pps::{DeblockingFilterControl, Pps};
pub use self::slice_header::{RefIdxActiveOverride, ShortTermRefPicSetRef, SliceSegmentHeader, SliceType};
pub use self::sps::{ConformanceWindow, ProfileTierLevel, ShortTermRefPicSet, ShortTermRefPicSets, Sps, VuiParameters};
