use super::Result;
use bio::alignment::pairwise::{MatchParams, Scoring, MIN_SCORE};
use std::str::FromStr;

/// Affine scoring scheme. A gap of length L costs `gapo_scr + (L - 1) * gape_scr`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringScheme {
    pub match_scr: i32,
    pub mism_scr: i32,
    pub gapo_scr: i32,
    pub gape_scr: i32,
}

impl Default for ScoringScheme {
    fn default() -> Self {
        ScoringScheme {
            match_scr: 3,
            mism_scr: -6,
            gapo_scr: -5,
            gape_scr: -2,
        }
    }
}

impl ScoringScheme {
    pub fn new(match_scr: i32, mism_scr: i32, gapo_scr: i32, gape_scr: i32) -> Result<Self> {
        let scoring = ScoringScheme {
            match_scr,
            mism_scr,
            gapo_scr,
            gape_scr,
        };
        scoring.validate()?;
        Ok(scoring)
    }

    pub fn validate(&self) -> Result<()> {
        if self.match_scr <= 0 {
            return Err(format!(
                "Match score must be positive, got {}",
                self.match_scr
            ));
        }
        if self.mism_scr > 0 || self.gapo_scr > 0 || self.gape_scr > 0 {
            return Err(format!(
                "Mismatch and gap scores must not be positive, got {},{},{}",
                self.mism_scr, self.gapo_scr, self.gape_scr
            ));
        }
        Ok(())
    }

    /// Opening penalty in the form the bio aligners expect, where a gap of
    /// length L costs `gap_open + L * gap_extend`.
    pub fn bio_gap_open(&self) -> i32 {
        (self.gapo_scr - self.gape_scr).min(0)
    }

    fn bio_scoring(&self, clip_penalties: [i32; 4]) -> Scoring<MatchParams> {
        Scoring {
            match_fn: MatchParams::new(self.match_scr, self.mism_scr),
            match_scores: Some((self.match_scr, self.mism_scr)),
            gap_open: self.bio_gap_open(),
            gap_extend: self.gape_scr,
            xclip_prefix: clip_penalties[0],
            xclip_suffix: clip_penalties[1],
            yclip_prefix: clip_penalties[2],
            yclip_suffix: clip_penalties[3],
        }
    }

    /// Both sequences may start and end anywhere.
    pub fn free_end_gaps(&self) -> Scoring<MatchParams> {
        self.bio_scoring([0, 0, 0, 0])
    }

    /// The read is aligned end to end, the reference may be left unaligned
    /// before the alignment start.
    pub fn free_reference_prefix(&self) -> Scoring<MatchParams> {
        self.bio_scoring([MIN_SCORE, MIN_SCORE, 0, MIN_SCORE])
    }

    /// The read is aligned end to end, the reference may be left unaligned
    /// after the alignment end.
    pub fn free_reference_suffix(&self) -> Scoring<MatchParams> {
        self.bio_scoring([MIN_SCORE, MIN_SCORE, MIN_SCORE, 0])
    }
}

impl FromStr for ScoringScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self> {
        const NUM_EXPECTED_VALUES: usize = 4;
        let values: Vec<i32> = s
            .split(',')
            .map(|x| {
                x.trim()
                    .parse()
                    .map_err(|_| format!("Invalid scoring value `{}` in {}", x, s))
            })
            .collect::<Result<_>>()?;
        if values.len() != NUM_EXPECTED_VALUES {
            return Err(format!(
                "Expected {} comma-separated values in scoring. Got {} -> {}",
                NUM_EXPECTED_VALUES,
                values.len(),
                s
            ));
        }
        ScoringScheme::new(values[0], values[1], values[2], values[3])
    }
}
