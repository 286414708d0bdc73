mod alignment;
mod banded;
mod common_kmers;
mod diagnostics;
mod driver;
mod extension;
mod kmer_positions;
mod lines;
mod orientation;
mod sequence;
mod settings;
mod tiers;
mod writer;

pub use alignment::{scaled_score, SemiGlobalAlignment};
pub use banded::{align_with_adaptive_band, banded_chain_alignment};
pub use common_kmers::{CommonKmer, CommonKmerSet};
pub use diagnostics::Diagnostics;
pub use driver::{
    align_read, score_candidate_pairs, semi_global_alignment_all_refs, CandidatePair,
    CandidatePairs, ReadAlignments,
};
pub use extension::{
    end_extension_alignment, extension_alignment_for_side, start_extension_alignment,
    ExtensionSide,
};
pub use kmer_positions::{KmerPositions, MAX_KMER_SIZE};
pub use lines::{find_alignment_lines, AlignmentLine, SeedChain};
pub use orientation::{RegisteredRead, Strand};
pub use sequence::{complement, reverse_complement};
pub use settings::AlignerSettings;
pub use tiers::{
    longest_uncovered_stretch, needs_more_sensitive_alignment, read_has_unaligned_parts,
    SensitivityTier, TierThresholds, DEFAULT_TIERS,
};
pub use writer::AlignmentWriter;
