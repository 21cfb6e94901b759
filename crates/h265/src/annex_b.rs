/// Splits an Annex-B byte stream into NAL units delimited by start codes
/// (`00 00 01` or `00 00 00 01`), per ISO/IEC 23008-2 Annex B.
///
/// Each yielded slice is the NAL unit payload with its start code removed,
/// but still containing any emulation prevention bytes — callers pass it
/// through [`scuffle_bytes_util::EmulationPreventionIo`] before parsing.
pub struct AnnexBIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> AnnexBIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        let pos = find_start_code(data, 0).map(|(_, after)| after).unwrap_or(data.len());
        Self { data, pos }
    }
}

impl<'a> Iterator for AnnexBIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }

        let start = self.pos;
        let (nal, next_pos) = match find_start_code(self.data, start) {
            Some((before, after)) => (&self.data[start..before], after),
            None => (&self.data[start..], self.data.len()),
        };

        self.pos = next_pos;

        // trailing_zero_8bits may pad the end of a NAL unit; trim it so callers
        // don't have to special-case it.
        let nal = trim_trailing_zeros(nal);
        if nal.is_empty() { self.next() } else { Some(nal) }
    }
}

fn trim_trailing_zeros(mut nal: &[u8]) -> &[u8] {
    while nal.last() == Some(&0) {
        nal = &nal[..nal.len() - 1];
    }
    nal
}

/// Finds the next `00 00 01` start code at or after `from`, returning the offset where the
/// preceding NAL unit ends (stripping an optional leading zero byte of a 4-byte start code)
/// and the offset immediately following the start code.
fn find_start_code(data: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut i = from;
    while i + 2 < data.len() {
        if data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 1 {
            let before = if i > from && data[i - 1] == 0 { i - 1 } else { i };
            return Some((before, i + 3));
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_two_nal_units() {
        let data = [0x00, 0x00, 0x00, 0x01, 0xAA, 0xBB, 0x00, 0x00, 0x01, 0xCC, 0xDD, 0xEE];
        let nals: Vec<_> = AnnexBIter::new(&data).collect();
        assert_eq!(nals, vec![&[0xAA, 0xBB][..], &[0xCC, 0xDD, 0xEE][..]]);
    }

    #[test]
    fn ignores_leading_junk_before_first_start_code() {
        let data = [0xFF, 0x00, 0x00, 0x01, 0xAA];
        let nals: Vec<_> = AnnexBIter::new(&data).collect();
        assert_eq!(nals, vec![&[0xAA][..]]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(AnnexBIter::new(&[]).collect::<Vec<_>>(), Vec::<&[u8]>::new());
    }
}
