//! Sensitivity tiers and the read coverage checks that decide whether the
//! next, looser tier has to run.

use super::alignment::SemiGlobalAlignment;
use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensitivityTier {
    pub level: u8,
    /// Fraction of the global maximum a point density must reach to belong to a line
    pub low_score_fraction: f64,
    /// Fraction of the global maximum a pair or line peak must reach
    pub high_score_fraction: f64,
    pub merge_distance: f64,
    pub min_alignment_length: usize,
    pub min_point_count: usize,
}

pub const DEFAULT_TIERS: [SensitivityTier; 3] = [
    SensitivityTier {
        level: 1,
        low_score_fraction: 0.20,
        high_score_fraction: 0.50,
        merge_distance: 100.0,
        min_alignment_length: 100,
        min_point_count: 8,
    },
    SensitivityTier {
        level: 2,
        low_score_fraction: 0.10,
        high_score_fraction: 0.25,
        merge_distance: 250.0,
        min_alignment_length: 50,
        min_point_count: 4,
    },
    SensitivityTier {
        level: 3,
        low_score_fraction: 0.05,
        high_score_fraction: 0.10,
        merge_distance: 500.0,
        min_alignment_length: 25,
        min_point_count: 2,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierThresholds {
    pub level: u8,
    pub low_score: f64,
    pub high_score: f64,
    pub merge_distance: f64,
    pub min_alignment_length: usize,
    pub min_point_count: usize,
}

impl SensitivityTier {
    pub fn scaled(&self, global_max_score: f64) -> TierThresholds {
        TierThresholds {
            level: self.level,
            low_score: self.low_score_fraction * global_max_score,
            high_score: self.high_score_fraction * global_max_score,
            merge_distance: self.merge_distance,
            min_alignment_length: self.min_alignment_length,
            min_point_count: self.min_point_count,
        }
    }
}

/// Length of the longest run of read positions not covered by any of the alignments.
pub fn longest_uncovered_stretch<'a, I>(read_length: usize, alignments: I) -> usize
where
    I: IntoIterator<Item = &'a SemiGlobalAlignment>,
{
    let spans = alignments
        .into_iter()
        .map(|aln| aln.forward_read_span(read_length))
        .sorted_unstable();

    let mut longest = 0;
    let mut covered_to = 0;
    for (start, end) in spans {
        if start > covered_to {
            longest = longest.max(start - covered_to);
        }
        covered_to = covered_to.max(end);
    }
    longest.max(read_length.saturating_sub(covered_to))
}

fn stretch_counts(stretch: usize, read_length: usize, min_unaligned_stretch: usize) -> bool {
    stretch > 0 && (stretch >= min_unaligned_stretch || stretch == read_length)
}

/// True when the alignments scoring at least `low_score_threshold` leave part of
/// the read unaligned.
pub fn needs_more_sensitive_alignment(
    alignments: &[SemiGlobalAlignment],
    read_length: usize,
    low_score_threshold: f64,
    min_unaligned_stretch: usize,
) -> bool {
    let good = alignments
        .iter()
        .filter(|aln| aln.scaled_score >= low_score_threshold);
    let stretch = longest_uncovered_stretch(read_length, good);
    stretch_counts(stretch, read_length, min_unaligned_stretch)
}

pub fn read_has_unaligned_parts(
    alignments: &[SemiGlobalAlignment],
    read_length: usize,
    min_unaligned_stretch: usize,
) -> bool {
    let stretch = longest_uncovered_stretch(read_length, alignments);
    stretch_counts(stretch, read_length, min_unaligned_stretch)
}
