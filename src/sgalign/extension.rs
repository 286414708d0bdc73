use super::{alignment::SemiGlobalAlignment, orientation::Strand, sequence::complement};
use crate::utils::{describe_base, Result, ScoringScheme};
use bio::alignment::pairwise::{Aligner, MatchParams, Scoring};
use std::{fmt, str::FromStr, time::Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionSide {
    Start,
    End,
}

impl FromStr for ExtensionSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(ExtensionSide::Start),
            "end" => Ok(ExtensionSide::End),
            _ => Err(format!("Invalid extension side: {} (expected start or end)", s)),
        }
    }
}

impl fmt::Display for ExtensionSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExtensionSide::Start => write!(f, "start"),
            ExtensionSide::End => write!(f, "end"),
        }
    }
}

fn check_sequence(label: &str, seq: &[u8]) -> Result<()> {
    if seq.is_empty() {
        return Err(format!("Empty {} sequence", label));
    }
    if let Some(pos) = seq.iter().position(|&b| complement(b).is_none()) {
        return Err(format!(
            "Invalid base '{}' at position {} of the {} sequence",
            describe_base(seq[pos]),
            pos,
            label
        ));
    }
    Ok(())
}

fn extension_alignment(
    read: &[u8],
    reference: &[u8],
    scoring: &ScoringScheme,
    bio_scoring: Scoring<MatchParams>,
) -> Result<SemiGlobalAlignment> {
    scoring.validate()?;
    check_sequence("read", read)?;
    check_sequence("reference", reference)?;

    let start_time = Instant::now();
    let mut aligner = Aligner::with_capacity_and_scoring(read.len(), reference.len(), bio_scoring);
    let alignment = aligner.custom(read, reference);
    let mut result = SemiGlobalAlignment::from_bio(&alignment, Strand::Forward, "", 0, scoring)?;
    result.milliseconds = start_time.elapsed().as_millis();
    Ok(result)
}

/// Aligns the whole read to the reference, leaving any number of reference
/// bases before the alignment unpenalized.
pub fn start_extension_alignment(
    read: &[u8],
    reference: &[u8],
    scoring: &ScoringScheme,
) -> Result<SemiGlobalAlignment> {
    extension_alignment(read, reference, scoring, scoring.free_reference_prefix())
}

/// Aligns the whole read to the reference, leaving any number of reference
/// bases after the alignment unpenalized.
pub fn end_extension_alignment(
    read: &[u8],
    reference: &[u8],
    scoring: &ScoringScheme,
) -> Result<SemiGlobalAlignment> {
    extension_alignment(read, reference, scoring, scoring.free_reference_suffix())
}

pub fn extension_alignment_for_side(
    side: ExtensionSide,
    read: &[u8],
    reference: &[u8],
    scoring: &ScoringScheme,
) -> Result<SemiGlobalAlignment> {
    match side {
        ExtensionSide::Start => start_extension_alignment(read, reference, scoring),
        ExtensionSide::End => end_extension_alignment(read, reference, scoring),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_extension_skips_leading_reference() {
        let scoring = ScoringScheme::default();
        let aln = start_extension_alignment(b"ACGTTGCA", b"GGGGACGTTGCA", &scoring).unwrap();
        assert_eq!((aln.read_start, aln.read_end), (0, 8));
        assert_eq!((aln.ref_start, aln.ref_end), (4, 12));
        assert_eq!(aln.raw_score, 24);
        assert_eq!(aln.cigar, "8M");
        assert!(aln.full_string().starts_with("+,,0,8,4,12,24,100.000000,"));
    }

    #[test]
    fn end_extension_skips_trailing_reference() {
        let scoring = ScoringScheme::default();
        let aln = end_extension_alignment(b"ACGTTGCA", b"ACGTTGCAGGGG", &scoring).unwrap();
        assert_eq!((aln.ref_start, aln.ref_end), (0, 8));
        assert_eq!(aln.cigar, "8M");
    }

    #[test]
    fn read_is_aligned_end_to_end() {
        let scoring = ScoringScheme::default();
        // Last read base has no counterpart, so it must be an insertion or mismatch
        let aln = start_extension_alignment(b"ACGTTGCAT", b"GGGGACGTTGCA", &scoring).unwrap();
        assert_eq!((aln.read_start, aln.read_end), (0, 9));
        assert!(aln.scaled_score < 100.0);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let scoring = ScoringScheme::default();
        assert!(start_extension_alignment(b"", b"ACGT", &scoring).is_err());
        assert!(end_extension_alignment(b"ACGT", b"AC#T", &scoring).is_err());
    }

    #[test]
    fn side_parsing() {
        assert_eq!("start".parse::<ExtensionSide>().unwrap(), ExtensionSide::Start);
        assert_eq!("end".parse::<ExtensionSide>().unwrap().to_string(), "end");
        assert!("middle".parse::<ExtensionSide>().is_err());
    }
}
