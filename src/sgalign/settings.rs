use super::tiers::{SensitivityTier, DEFAULT_TIERS};
use crate::utils::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct AlignerSettings {
    /// Width of the diagonal window used to score and group common k-mers
    pub common_kmer_band_size: usize,
    /// Candidate pairs scoring below this are discarded
    pub min_viable_score: f64,
    /// Reference k-mers with more occurrences than this are not used as seeds
    pub max_kmer_occurrences: usize,
    pub starting_band_size: usize,
    pub max_band_size: usize,
    /// Extra reference bases kept on each side of a line's window
    pub ref_window_margin: usize,
    pub min_unaligned_stretch: usize,
    pub tiers: [SensitivityTier; 3],
}

impl Default for AlignerSettings {
    fn default() -> Self {
        AlignerSettings {
            common_kmer_band_size: 10,
            min_viable_score: 4.0,
            max_kmer_occurrences: 1000,
            starting_band_size: 10,
            max_band_size: 160,
            ref_window_margin: 100,
            min_unaligned_stretch: 50,
            tiers: DEFAULT_TIERS,
        }
    }
}

impl AlignerSettings {
    pub fn validate(&self) -> Result<()> {
        if self.common_kmer_band_size == 0 {
            return Err("Common k-mer band size must be positive".into());
        }
        if self.starting_band_size == 0 || self.starting_band_size > self.max_band_size {
            return Err(format!(
                "Starting band size must be between 1 and the maximum band size ({}), got {}",
                self.max_band_size, self.starting_band_size
            ));
        }
        if self.min_viable_score.is_nan() || self.min_viable_score < 0.0 {
            return Err(format!(
                "Minimum viable score must be non-negative, got {}",
                self.min_viable_score
            ));
        }
        for tier in &self.tiers {
            if !(0.0..=1.0).contains(&tier.low_score_fraction)
                || !(0.0..=1.0).contains(&tier.high_score_fraction)
            {
                return Err(format!(
                    "Tier {} score fractions must be between 0.0 and 1.0",
                    tier.level
                ));
            }
        }
        Ok(())
    }
}
