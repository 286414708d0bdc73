use super::{alignment::SemiGlobalAlignment, lines::SeedChain};
use crate::utils::{Result, ScoringScheme};
use bio::alignment::{pairwise::banded, Alignment, AlignmentOperation};
use std::time::Instant;

/// Banded alignment of the read against a reference window around the seed
/// chain, with free end gaps on both sequences.
pub fn banded_chain_alignment(
    read: &[u8],
    ref_window: &[u8],
    chain: &SeedChain,
    scoring: &ScoringScheme,
    band_width: usize,
) -> Result<Alignment> {
    if read.is_empty() || ref_window.is_empty() || chain.is_empty() {
        return Err("Nothing to align".to_string());
    }
    let mut aligner = banded::Aligner::with_capacity_and_scoring(
        read.len(),
        ref_window.len(),
        scoring.free_end_gaps(),
        chain.kmer_size,
        band_width,
    );
    let alignment = aligner.custom_with_matches(read, ref_window, &chain.seeds);
    let has_aligned_bases = alignment
        .operations
        .iter()
        .any(|op| matches!(op, AlignmentOperation::Match | AlignmentOperation::Subst));
    if !has_aligned_bases {
        return Err(format!("Banded alignment failed, band width = {}", band_width));
    }
    Ok(alignment)
}

/// Hill-climbs the band width: starts at `starting_band`, doubles after each
/// attempt and stops when a successful attempt does not beat the best scaled
/// score or the band exceeds `max_band`. Failed attempts only widen the band.
pub fn align_with_adaptive_band<F>(
    starting_band: usize,
    max_band: usize,
    mut attempt: F,
) -> Option<SemiGlobalAlignment>
where
    F: FnMut(usize) -> Option<SemiGlobalAlignment>,
{
    let start_time = Instant::now();
    let mut best: Option<SemiGlobalAlignment> = None;
    let mut band_width = starting_band.max(1);

    loop {
        if let Some(alignment) = attempt(band_width) {
            let best_score = best
                .as_ref()
                .map_or(f64::NEG_INFINITY, |aln| aln.scaled_score);
            if alignment.scaled_score <= best_score {
                break;
            }
            best = Some(alignment);
        }
        band_width = band_width.saturating_mul(2);
        if band_width > max_band {
            break;
        }
    }

    if let Some(aln) = best.as_mut() {
        aln.milliseconds = start_time.elapsed().as_millis();
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgalign::orientation::Strand;
    use std::collections::HashMap;

    fn run_script(
        scores: &[(usize, f64)],
        start: usize,
        max: usize,
    ) -> (Option<SemiGlobalAlignment>, Vec<usize>) {
        let script: HashMap<usize, f64> = scores.iter().cloned().collect();
        let mut tried = Vec::new();
        let best = align_with_adaptive_band(start, max, |band| {
            tried.push(band);
            script.get(&band).map(|&score| {
                let mut aln = SemiGlobalAlignment::empty(Strand::Forward, "chr1");
                aln.scaled_score = score;
                aln.band_width = Some(band);
                aln
            })
        });
        (best, tried)
    }

    #[test]
    fn stops_at_first_non_improvement() {
        let (best, tried) = run_script(&[(10, 50.0), (20, 60.0), (40, 60.0), (80, 90.0)], 10, 160);
        let best = best.unwrap();
        assert_eq!(best.scaled_score, 60.0);
        assert_eq!(best.band_width, Some(20));
        assert_eq!(tried, vec![10, 20, 40]);
    }

    #[test]
    fn failed_attempts_keep_widening() {
        let (best, tried) = run_script(&[(20, 70.0), (80, 75.0), (160, 80.0)], 10, 160);
        let best = best.unwrap();
        assert_eq!(best.scaled_score, 80.0);
        assert_eq!(best.band_width, Some(160));
        assert_eq!(tried, vec![10, 20, 40, 80, 160]);
    }

    #[test]
    fn all_failures_give_nothing() {
        let (best, tried) = run_script(&[], 10, 100);
        assert!(best.is_none());
        assert_eq!(tried, vec![10, 20, 40, 80]);
    }

    #[test]
    fn starting_band_above_max_gets_one_attempt() {
        let (best, tried) = run_script(&[(64, 10.0)], 64, 32);
        assert_eq!(best.unwrap().band_width, Some(64));
        assert_eq!(tried, vec![64]);
    }

    #[test]
    fn perfect_first_attempt_stops_after_second() {
        let (best, tried) = run_script(&[(8, 100.0), (16, 100.0)], 8, 1000);
        assert_eq!(best.unwrap().band_width, Some(8));
        assert_eq!(tried, vec![8, 16]);
    }

    #[test]
    fn chain_alignment_of_exact_copy() {
        let mut window = vec![b'C'; 30];
        window.extend_from_slice(b"AGGAGAAGGAAGAG");
        window.extend(vec![b'C'; 30]);
        let read = b"AGGAGAAGGAAGAG";
        let chain = SeedChain {
            kmer_size: 4,
            seeds: (0..=10).map(|i| (i, 30 + i)).collect(),
        };
        let scoring = ScoringScheme::default();
        let alignment = banded_chain_alignment(read, &window, &chain, &scoring, 10).unwrap();
        assert_eq!(alignment.score, 3 * read.len() as i32);
        let aln = SemiGlobalAlignment::from_bio(&alignment, Strand::Forward, "chr1", 1000, &scoring)
            .unwrap();
        assert_eq!((aln.read_start, aln.read_end), (0, 14));
        assert_eq!((aln.ref_start, aln.ref_end), (1030, 1044));
        assert_eq!(aln.cigar, "14M");
        assert_eq!(aln.scaled_score, 100.0);
    }

    #[test]
    fn chain_alignment_across_a_mismatch() {
        let reference = b"TTTTTTTTTTACGGTCATGCAGTCCAGTTTTTTTTTT";
        let read = b"ACGGTCATGAAGTCCAG";
        let chain = SeedChain {
            kmer_size: 4,
            seeds: (0..=5).chain(10..=13).map(|i| (i, 10 + i)).collect(),
        };
        let scoring = ScoringScheme::default();
        let alignment = banded_chain_alignment(read, reference, &chain, &scoring, 8).unwrap();
        let aln = SemiGlobalAlignment::from_bio(&alignment, Strand::Forward, "chr1", 0, &scoring)
            .unwrap();
        assert_eq!(aln.raw_score, 16 * 3 - 6);
        assert_eq!((aln.ref_start, aln.ref_end), (10, 27));
        assert_eq!(aln.cigar, "17M");
    }
}
