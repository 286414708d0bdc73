use super::orientation::Strand;
use crate::utils::{Result, ScoringScheme};
use bio::alignment::{Alignment, AlignmentOperation};
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct SemiGlobalAlignment {
    pub strand: Strand,
    pub ref_name: String,
    /// Coordinates on the aligned orientation of the read
    pub read_start: usize,
    pub read_end: usize,
    pub ref_start: usize,
    pub ref_end: usize,
    pub raw_score: i32,
    pub scaled_score: f64,
    pub milliseconds: u128,
    pub cigar: String,
    pub tier: Option<u8>,
    pub band_width: Option<usize>,
}

impl SemiGlobalAlignment {
    pub fn empty(strand: Strand, ref_name: &str) -> Self {
        SemiGlobalAlignment {
            strand,
            ref_name: ref_name.to_string(),
            read_start: 0,
            read_end: 0,
            ref_start: 0,
            ref_end: 0,
            raw_score: 0,
            scaled_score: 0.0,
            milliseconds: 0,
            cigar: String::new(),
            tier: None,
            band_width: None,
        }
    }

    /// Converts a bio alignment of the read (x) against a reference slice (y)
    /// starting at `ref_offset`. Clipped ends are not part of the alignment.
    pub fn from_bio(
        alignment: &Alignment,
        strand: Strand,
        ref_name: &str,
        ref_offset: usize,
        scoring: &ScoringScheme,
    ) -> Result<Self> {
        let mut read_pos = 0;
        let mut ref_pos = 0;
        let mut span: Option<(usize, usize, usize, usize)> = None;
        let mut columns: Vec<char> = Vec::with_capacity(alignment.operations.len());

        for op in &alignment.operations {
            let (read_step, ref_step, symbol) = match *op {
                AlignmentOperation::Xclip(len) => {
                    read_pos += len;
                    continue;
                }
                AlignmentOperation::Yclip(len) => {
                    ref_pos += len;
                    continue;
                }
                AlignmentOperation::Match | AlignmentOperation::Subst => (1, 1, 'M'),
                AlignmentOperation::Ins => (1, 0, 'I'),
                AlignmentOperation::Del => (0, 1, 'D'),
            };
            let (read_start, _, ref_start, _) = span.unwrap_or((read_pos, 0, ref_pos, 0));
            read_pos += read_step;
            ref_pos += ref_step;
            span = Some((read_start, read_pos, ref_start, ref_pos));
            columns.push(symbol);
        }

        if !columns.contains(&'M') {
            return Err("Alignment has no aligned bases".to_string());
        }
        let Some((read_start, read_end, ref_start, ref_end)) = span else {
            return Err("Alignment has no aligned bases".to_string());
        };

        Ok(SemiGlobalAlignment {
            strand,
            ref_name: ref_name.to_string(),
            read_start,
            read_end,
            ref_start: ref_offset + ref_start,
            ref_end: ref_offset + ref_end,
            raw_score: alignment.score,
            scaled_score: scaled_score(alignment.score, columns.len(), scoring),
            milliseconds: 0,
            cigar: encode_cigar(&columns),
            tier: None,
            band_width: None,
        })
    }

    /// Read span in forward-strand coordinates of a read of `read_length` bases.
    pub fn forward_read_span(&self, read_length: usize) -> (usize, usize) {
        match self.strand {
            Strand::Forward => (self.read_start, self.read_end),
            Strand::Reverse => (
                read_length.saturating_sub(self.read_end),
                read_length.saturating_sub(self.read_start),
            ),
        }
    }

    pub fn full_string(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{:.6},{},{}",
            self.strand,
            self.ref_name,
            self.read_start,
            self.read_end,
            self.ref_start,
            self.ref_end,
            self.raw_score,
            self.scaled_score,
            self.milliseconds,
            self.cigar
        )
    }

    pub fn short_display(&self) -> String {
        format!(
            "{} {}-{} {} {}-{} raw {} scaled {:.2}",
            self.strand,
            self.read_start,
            self.read_end,
            self.ref_name,
            self.ref_start,
            self.ref_end,
            self.raw_score,
            self.scaled_score
        )
    }
}

impl fmt::Display for SemiGlobalAlignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.full_string())
    }
}

/// Maps a raw score onto 0-100, where 100 is all matches and 0 all mismatches
/// over the same number of columns.
pub fn scaled_score(raw_score: i32, columns: usize, scoring: &ScoringScheme) -> f64 {
    if columns == 0 {
        return 0.0;
    }
    let perfect = scoring.match_scr as f64 * columns as f64;
    let worst = scoring.mism_scr as f64 * columns as f64;
    if perfect <= worst {
        return 0.0;
    }
    (100.0 * (raw_score as f64 - worst) / (perfect - worst)).clamp(0.0, 100.0)
}

fn encode_cigar(columns: &[char]) -> String {
    columns
        .iter()
        .dedup_with_count()
        .map(|(count, op)| format!("{}{}", count, op))
        .join("")
}
