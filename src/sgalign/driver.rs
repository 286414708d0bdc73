use super::{
    alignment::SemiGlobalAlignment,
    banded::{align_with_adaptive_band, banded_chain_alignment},
    common_kmers::CommonKmerSet,
    diagnostics::Diagnostics,
    kmer_positions::KmerPositions,
    lines::{find_alignment_lines, AlignmentLine},
    orientation::{RegisteredRead, Strand},
    settings::AlignerSettings,
    tiers::{needs_more_sensitive_alignment, read_has_unaligned_parts, SensitivityTier},
};
use crate::utils::{Result, ScoringScheme};

#[derive(Debug)]
pub struct CandidatePair {
    pub strand: Strand,
    pub kmers: CommonKmerSet,
}

#[derive(Debug, Default)]
pub struct CandidatePairs {
    pairs: Vec<CandidatePair>,
    max_score: f64,
}

impl CandidatePairs {
    pub fn offer(&mut self, pair: CandidatePair, min_viable_score: f64) -> bool {
        if pair.kmers.max_score < min_viable_score {
            return false;
        }
        self.max_score = self.max_score.max(pair.kmers.max_score);
        self.pairs.push(pair);
        true
    }

    fn sort_by_score(&mut self) {
        self.pairs
            .sort_by(|a, b| b.kmers.max_score.total_cmp(&a.kmers.max_score));
    }

    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    pub(crate) fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidatePair> {
        self.pairs.iter()
    }

    /// Pairs a tier goes on to search for lines: those scoring at least its
    /// `high_score`.
    pub fn passing(&self, high_score: f64) -> impl Iterator<Item = &CandidatePair> {
        self.pairs
            .iter()
            .filter(move |pair| pair.kmers.max_score >= high_score)
    }
}

/// Scores both orientations of the read against every reference. The reverse
/// orientation of a read that is its own reverse complement is not scored.
pub fn score_candidate_pairs(
    read: &RegisteredRead,
    reference_names: &[String],
    read_length: usize,
    expected_slope: f64,
    settings: &AlignerSettings,
) -> Result<CandidatePairs> {
    let index = read.index();
    let strands: &[Strand] = if read.is_palindrome() {
        &[Strand::Forward]
    } else {
        &[Strand::Forward, Strand::Reverse]
    };

    let mut candidates = CandidatePairs::default();
    for ref_name in reference_names {
        let ref_length = index
            .get_length(ref_name)
            .ok_or_else(|| format!("Reference {} is not indexed", ref_name))?;
        for &strand in strands {
            let kmers = CommonKmerSet::new(
                read.name(strand),
                ref_name,
                read_length,
                ref_length,
                expected_slope,
                settings,
                index,
            )?;
            candidates.offer(CandidatePair { strand, kmers }, settings.min_viable_score);
        }
    }
    candidates.sort_by_score();
    Ok(candidates)
}

#[derive(Debug, Clone)]
pub struct ReadAlignments {
    pub alignments: Vec<SemiGlobalAlignment>,
    pub tiers_run: u8,
    pub diagnostics: String,
}

impl ReadAlignments {
    pub fn to_result_string(&self) -> String {
        let mut result: String = self
            .alignments
            .iter()
            .map(|aln| aln.full_string() + ";")
            .collect();
        result.push_str(&self.diagnostics);
        result
    }
}

struct TierContext<'a> {
    index: &'a KmerPositions,
    scoring: &'a ScoringScheme,
    settings: &'a AlignerSettings,
    global_max_score: f64,
}

fn should_run_tier(
    tier_index: usize,
    alignments: &[SemiGlobalAlignment],
    read_length: usize,
    low_score_threshold: f64,
    settings: &AlignerSettings,
) -> bool {
    match tier_index {
        0 => true,
        1 => needs_more_sensitive_alignment(
            alignments,
            read_length,
            low_score_threshold,
            settings.min_unaligned_stretch,
        ),
        _ => read_has_unaligned_parts(alignments, read_length, settings.min_unaligned_stretch),
    }
}

/// Aligns one read against every indexed reference, escalating through the
/// sensitivity tiers until the read is adequately covered.
///
/// Both orientations of the read are registered in `index` for the duration of
/// the call and removed before it returns, on success and on error.
#[allow(clippy::too_many_arguments)]
pub fn align_read(
    read_name: &str,
    read_seq: &[u8],
    verbosity: u8,
    expected_slope: f64,
    index: &mut KmerPositions,
    scoring: &ScoringScheme,
    low_score_threshold: f64,
    settings: &AlignerSettings,
) -> Result<ReadAlignments> {
    scoring.validate()?;
    settings.validate()?;

    let reference_names = index.get_all_names();
    let read = RegisteredRead::register(index, read_name, read_seq)?;
    let read_length = read_seq.len();
    let mut diagnostics = Diagnostics::new(verbosity);

    let candidates =
        score_candidate_pairs(&read, &reference_names, read_length, expected_slope, settings)?;
    diagnostics.note(2, || {
        format!(
            "{}: {} candidate pairs, max score {:.1}",
            read_name,
            candidates.len(),
            candidates.max_score()
        )
    });

    let context = TierContext {
        index: read.index(),
        scoring,
        settings,
        global_max_score: candidates.max_score(),
    };
    let mut alignments = Vec::new();
    let mut tiers_run = 0;
    for (tier_index, tier) in settings.tiers.iter().enumerate() {
        if !should_run_tier(tier_index, &alignments, read_length, low_score_threshold, settings) {
            break;
        }
        let tier_alignments = align_one_tier(&candidates, tier, &context, &mut diagnostics)?;
        diagnostics.note(2, || {
            format!(
                "Tier {}: {} alignments",
                tier.level,
                tier_alignments.len()
            )
        });
        alignments.extend(tier_alignments);
        tiers_run = tier.level;
    }

    drop(read);
    Ok(ReadAlignments {
        alignments,
        tiers_run,
        diagnostics: diagnostics.into_text(),
    })
}

#[allow(clippy::too_many_arguments)]
pub fn semi_global_alignment_all_refs(
    read_name: &str,
    read_seq: &[u8],
    verbosity: u8,
    expected_slope: f64,
    index: &mut KmerPositions,
    scoring: &ScoringScheme,
    low_score_threshold: f64,
    settings: &AlignerSettings,
) -> Result<String> {
    align_read(
        read_name,
        read_seq,
        verbosity,
        expected_slope,
        index,
        scoring,
        low_score_threshold,
        settings,
    )
    .map(|result| result.to_result_string())
}

fn align_one_tier(
    candidates: &CandidatePairs,
    tier: &SensitivityTier,
    context: &TierContext,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SemiGlobalAlignment>> {
    let thresholds = tier.scaled(context.global_max_score);
    let mut alignments = Vec::new();

    for pair in candidates.passing(thresholds.high_score) {
        let read_seq = context
            .index
            .get_sequence(&pair.kmers.read_name)
            .ok_or_else(|| format!("Sequence {} is not indexed", pair.kmers.read_name))?;
        let ref_seq = context
            .index
            .get_sequence(&pair.kmers.ref_name)
            .ok_or_else(|| format!("Reference {} is not indexed", pair.kmers.ref_name))?;

        let lines = find_alignment_lines(
            &pair.kmers,
            &thresholds,
            context.index.kmer_size(),
            context.settings.ref_window_margin,
            diagnostics,
        );
        for mut line in lines {
            if !line.build_seed_chain(thresholds.min_point_count, thresholds.min_alignment_length) {
                continue;
            }
            let aligned = align_line(read_seq, ref_seq, &line, pair, tier.level, context, diagnostics);
            alignments.extend(aligned);
        }
    }
    Ok(alignments)
}

fn align_line(
    read_seq: &[u8],
    ref_seq: &[u8],
    line: &AlignmentLine,
    pair: &CandidatePair,
    level: u8,
    context: &TierContext,
    diagnostics: &mut Diagnostics,
) -> Option<SemiGlobalAlignment> {
    let chain = line.seed_chain.as_ref()?;
    let window = &ref_seq[line.trimmed_ref_start..line.trimmed_ref_end];
    let band_limit = read_seq.len().min(window.len());

    align_with_adaptive_band(
        context.settings.starting_band_size,
        context.settings.max_band_size,
        |band_width| {
            let attempt = banded_chain_alignment(
                read_seq,
                window,
                chain,
                context.scoring,
                band_width.min(band_limit),
            )
            .and_then(|aln| {
                SemiGlobalAlignment::from_bio(
                    &aln,
                    pair.strand,
                    &pair.kmers.ref_name,
                    line.trimmed_ref_start,
                    context.scoring,
                )
            });
            match attempt {
                Ok(mut aln) => {
                    aln.tier = Some(level);
                    aln.band_width = Some(band_width);
                    diagnostics.note(3, || {
                        format!("  Band {}: {}", band_width, aln.short_display())
                    });
                    diagnostics.note(4, || format!("    {}", aln.cigar));
                    Some(aln)
                }
                Err(e) => {
                    diagnostics.note(3, || format!("  Band {}: {}", band_width, e));
                    None
                }
            }
        },
    )
}
