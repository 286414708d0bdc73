use super::{
    common_kmers::{CommonKmer, CommonKmerSet},
    diagnostics::Diagnostics,
    tiers::TierThresholds,
};

/// Seeds further back than this (in read order) are not considered as chain predecessors.
const CHAIN_LOOKBACK: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct SeedChain {
    pub kmer_size: usize,
    pub seeds: Vec<(u32, u32)>,
}

impl SeedChain {
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn read_span(&self) -> usize {
        match (self.seeds.first(), self.seeds.last()) {
            (Some(first), Some(last)) => (last.0 - first.0) as usize + self.kmer_size,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlignmentLine {
    pub trimmed_ref_start: usize,
    pub trimmed_ref_end: usize,
    pub min_offset: f64,
    pub max_offset: f64,
    pub seed_chain: Option<SeedChain>,
    points: Vec<CommonKmer>,
    kmer_size: usize,
    read_length: usize,
}

impl AlignmentLine {
    pub fn window_len(&self) -> usize {
        self.trimmed_ref_end - self.trimmed_ref_start
    }

    /// Chains the line's points. Returns false, leaving no chain, when the best
    /// chain has fewer than `min_point_count` anchors or spans fewer than
    /// `min_alignment_length` read bases.
    pub fn build_seed_chain(&mut self, min_point_count: usize, min_alignment_length: usize) -> bool {
        self.seed_chain = None;
        let seeds = self.window_seeds();
        if seeds.is_empty() || seeds.len() < min_point_count {
            return false;
        }
        let chain = SeedChain {
            kmer_size: self.kmer_size,
            seeds: best_colinear_chain(&seeds, self.kmer_size),
        };
        if chain.len() < min_point_count || chain.read_span() < min_alignment_length {
            return false;
        }
        self.seed_chain = Some(chain);
        true
    }

    fn window_seeds(&self) -> Vec<(u32, u32)> {
        let window_len = self.window_len();
        let mut seeds: Vec<(u32, u32)> = self
            .points
            .iter()
            .filter(|p| p.ref_pos >= self.trimmed_ref_start)
            .filter_map(|p| {
                let window_pos = p.ref_pos - self.trimmed_ref_start;
                let fits = window_pos + self.kmer_size <= window_len
                    && p.read_pos + self.kmer_size <= self.read_length;
                fits.then_some((p.read_pos as u32, window_pos as u32))
            })
            .collect();
        seeds.sort_unstable();
        seeds.dedup();
        seeds
    }
}

/// Highest-scoring chain of seeds increasing in both coordinates. Each link
/// gains the newly covered bases and pays for the diagonal shift. Ties go to
/// the nearest predecessor.
fn best_colinear_chain(seeds: &[(u32, u32)], kmer_size: usize) -> Vec<(u32, u32)> {
    let k = kmer_size as i64;
    let mut scores: Vec<i64> = vec![k; seeds.len()];
    let mut prev: Vec<Option<usize>> = vec![None; seeds.len()];

    for i in 0..seeds.len() {
        let (read_i, ref_i) = seeds[i];
        for j in (i.saturating_sub(CHAIN_LOOKBACK)..i).rev() {
            let (read_j, ref_j) = seeds[j];
            if read_j >= read_i || ref_j >= ref_i {
                continue;
            }
            let read_step = (read_i - read_j) as i64;
            let ref_step = (ref_i - ref_j) as i64;
            let gain = k.min(read_step).min(ref_step) - (read_step - ref_step).abs();
            let candidate = scores[j] + gain;
            if candidate > scores[i] {
                scores[i] = candidate;
                prev[i] = Some(j);
            }
        }
    }

    let mut best_end = 0;
    for (i, &score) in scores.iter().enumerate() {
        if score > scores[best_end] {
            best_end = i;
        }
    }

    let mut chain = Vec::new();
    let mut current = Some(best_end);
    while let Some(i) = current {
        chain.push(seeds[i]);
        current = prev[i];
    }
    chain.reverse();
    chain
}

#[derive(Debug, Clone, Copy)]
struct Region {
    first: usize,
    last: usize,
    peak_density: usize,
}

fn point_densities(points: &[CommonKmer], half_band: f64) -> Vec<usize> {
    let mut densities = Vec::with_capacity(points.len());
    let mut lo = 0;
    let mut hi = 0;
    for point in points {
        while point.offset - points[lo].offset > half_band {
            lo += 1;
        }
        while hi < points.len() && points[hi].offset - point.offset <= half_band {
            hi += 1;
        }
        densities.push(hi - lo);
    }
    densities
}

fn dense_regions(points: &[CommonKmer], densities: &[usize], low: f64, max_gap: f64) -> Vec<Region> {
    let mut regions: Vec<Region> = Vec::new();
    let mut current: Option<Region> = None;
    for (i, &density) in densities.iter().enumerate() {
        if (density as f64) < low {
            regions.extend(current.take());
            continue;
        }
        current = match current {
            Some(mut region) if points[i].offset - points[region.last].offset <= max_gap => {
                region.last = i;
                region.peak_density = region.peak_density.max(density);
                Some(region)
            }
            previous => {
                regions.extend(previous);
                Some(Region {
                    first: i,
                    last: i,
                    peak_density: density,
                })
            }
        };
    }
    regions.extend(current);
    regions
}

fn merge_regions(points: &[CommonKmer], regions: Vec<Region>, merge_distance: f64) -> Vec<Region> {
    let mut merged: Vec<Region> = Vec::new();
    for region in regions {
        match merged.last_mut() {
            Some(last)
                if points[region.first].offset - points[last.last].offset <= merge_distance =>
            {
                last.last = region.last;
                last.peak_density = last.peak_density.max(region.peak_density);
            }
            _ => merged.push(region),
        }
    }
    merged
}

pub fn find_alignment_lines(
    kmers: &CommonKmerSet,
    thresholds: &TierThresholds,
    kmer_size: usize,
    window_margin: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<AlignmentLine> {
    let points = &kmers.points;
    if points.is_empty() {
        return Vec::new();
    }
    let band = kmers.band_size as f64;
    let densities = point_densities(points, band / 2.0);
    let candidates: Vec<Region> = dense_regions(points, &densities, thresholds.low_score, band)
        .into_iter()
        .filter(|region| region.peak_density as f64 >= thresholds.high_score)
        .collect();
    let regions = merge_regions(points, candidates, thresholds.merge_distance);

    let margin = window_margin as f64;
    let read_extent = kmers.expected_slope * kmers.read_length as f64;
    let mut lines = Vec::with_capacity(regions.len());
    for region in regions {
        let min_offset = points[region.first].offset;
        let max_offset = points[region.last].offset;
        let start = (min_offset - margin).floor().max(0.0) as usize;
        let end = ((max_offset + read_extent + margin).ceil().max(0.0) as usize).min(kmers.ref_length);
        if start >= end {
            continue;
        }
        diagnostics.note(3, || {
            format!(
                "  Line {}: offsets {:.1}-{:.1}, {} points, peak {}, reference window {}-{}",
                kmers.ref_name,
                min_offset,
                max_offset,
                region.last + 1 - region.first,
                region.peak_density,
                start,
                end
            )
        });
        lines.push(AlignmentLine {
            trimmed_ref_start: start,
            trimmed_ref_end: end,
            min_offset,
            max_offset,
            seed_chain: None,
            points: points[region.first..=region.last].to_vec(),
            kmer_size,
            read_length: kmers.read_length,
        });
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(read_pos: usize, ref_pos: usize) -> CommonKmer {
        CommonKmer {
            read_pos,
            ref_pos,
            offset: ref_pos as f64 - read_pos as f64,
        }
    }

    fn kmer_set(mut points: Vec<CommonKmer>, read_length: usize, ref_length: usize) -> CommonKmerSet {
        points.sort_by(|a, b| a.offset.total_cmp(&b.offset).then(a.read_pos.cmp(&b.read_pos)));
        CommonKmerSet {
            read_name: "read+".to_string(),
            ref_name: "chr1".to_string(),
            read_length,
            ref_length,
            expected_slope: 1.0,
            band_size: 10,
            max_score: 0.0,
            points,
        }
    }

    fn thresholds(low: f64, high: f64, merge_distance: f64) -> TierThresholds {
        TierThresholds {
            level: 1,
            low_score: low,
            high_score: high,
            merge_distance,
            min_alignment_length: 0,
            min_point_count: 0,
        }
    }

    fn diagonal(read_start: usize, ref_start: usize, count: usize) -> Vec<CommonKmer> {
        (0..count).map(|i| point(read_start + i, ref_start + i)).collect()
    }

    #[test]
    fn densities_count_points_within_half_band() {
        let set = kmer_set(vec![point(0, 0), point(0, 3), point(0, 6), point(0, 20)], 10, 100);
        assert_eq!(point_densities(&set.points, 5.0), vec![2, 3, 2, 1]);
    }

    #[test]
    fn single_diagonal_gives_one_line() {
        let set = kmer_set(diagonal(0, 500, 30), 40, 1000);
        let mut diagnostics = Diagnostics::new(0);
        let lines = find_alignment_lines(&set, &thresholds(5.0, 10.0, 50.0), 4, 100, &mut diagnostics);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].trimmed_ref_start, 400);
        assert_eq!(lines[0].trimmed_ref_end, 640);
        assert_eq!(lines[0].points.len(), 30);
        assert!(diagnostics.text().is_empty());
    }

    #[test]
    fn distant_diagonals_stay_separate_and_close_ones_merge() {
        let mut points = diagonal(0, 100, 20);
        points.extend(diagonal(0, 130, 20));
        points.extend(diagonal(0, 900, 20));
        let set = kmer_set(points, 40, 2000);
        let mut diagnostics = Diagnostics::new(3);
        let lines = find_alignment_lines(&set, &thresholds(5.0, 10.0, 50.0), 4, 10, &mut diagnostics);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].min_offset, 100.0);
        assert_eq!(lines[0].max_offset, 130.0);
        assert_eq!(lines[1].min_offset, 900.0);
        assert_eq!(diagnostics.text().lines().count(), 2);

        let lines = find_alignment_lines(&set, &thresholds(5.0, 10.0, 10.0), 4, 10, &mut diagnostics);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn sparse_points_do_not_form_lines() {
        let set = kmer_set(vec![point(0, 100), point(5, 400), point(9, 800)], 20, 1000);
        let lines = find_alignment_lines(&set, &thresholds(2.0, 3.0, 50.0), 4, 10, &mut Diagnostics::new(0));
        assert!(lines.is_empty());
    }

    #[test]
    fn window_is_clamped_to_reference() {
        let set = kmer_set(diagonal(0, 5, 10), 20, 30);
        let lines = find_alignment_lines(&set, &thresholds(1.0, 1.0, 10.0), 4, 50, &mut Diagnostics::new(0));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].trimmed_ref_start, 0);
        assert_eq!(lines[0].trimmed_ref_end, 30);
    }

    #[test]
    fn chain_follows_the_main_diagonal() {
        let seeds = vec![(0, 100), (1, 101), (2, 60), (2, 102), (3, 103), (4, 104)];
        assert_eq!(
            best_colinear_chain(&seeds, 4),
            vec![(0, 100), (1, 101), (2, 102), (3, 103), (4, 104)]
        );
    }

    #[test]
    fn chain_tolerates_small_indels() {
        // Second half shifted by a 2 base deletion in the read
        let seeds = vec![(0, 0), (4, 4), (8, 8), (12, 14), (16, 18), (20, 22)];
        assert_eq!(best_colinear_chain(&seeds, 4), seeds);
    }

    #[test]
    fn seed_chain_requirements() {
        let set = kmer_set(diagonal(0, 500, 5), 8, 1000);
        let mut lines = find_alignment_lines(&set, &thresholds(1.0, 1.0, 10.0), 4, 100, &mut Diagnostics::new(0));
        let line = &mut lines[0];

        assert!(line.build_seed_chain(5, 8));
        let chain = line.seed_chain.clone().unwrap();
        assert_eq!(chain.len(), 5);
        assert_eq!(chain.read_span(), 8);
        assert_eq!(chain.seeds[0], (0, 100));

        assert!(!line.build_seed_chain(6, 8));
        assert!(line.seed_chain.is_none());
        assert!(!line.build_seed_chain(5, 9));
    }
}
