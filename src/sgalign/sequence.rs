use crate::utils::{describe_base, Result};

/// IUPAC-aware complement. Gap and placeholder symbols map to themselves.
pub fn complement(base: u8) -> Option<u8> {
    let comp = match base {
        b'A' => b'T',
        b'T' => b'A',
        b'G' => b'C',
        b'C' => b'G',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        b'S' | b'W' | b'N' | b'.' | b'-' | b'?' | b'*' => base,
        _ => return None,
    };
    Some(comp)
}

pub fn reverse_complement(seq: &[u8]) -> Result<Vec<u8>> {
    seq.iter()
        .enumerate()
        .rev()
        .map(|(pos, &base)| {
            complement(base).ok_or_else(|| {
                format!(
                    "Cannot complement base '{}' at position {}",
                    describe_base(base),
                    pos
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_complement_of_simple_sequence() {
        assert_eq!(reverse_complement(b"AACGTTG").unwrap(), b"CAACGTT".to_vec());
        assert_eq!(reverse_complement(b"").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn reverse_complement_is_an_involution() {
        let seq = b"ACGTRYKMBVDHSWN.-?*GATTACA".to_vec();
        let rc = reverse_complement(&seq).unwrap();
        assert_eq!(reverse_complement(&rc).unwrap(), seq);
    }

    #[test]
    fn unknown_symbol_reports_position() {
        let err = reverse_complement(b"ACXT").unwrap_err();
        assert!(err.contains("'X'"));
        assert!(err.contains("position 2"));
    }

    #[test]
    fn lowercase_is_not_complemented() {
        assert!(complement(b'a').is_none());
    }
}
