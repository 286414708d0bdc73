use super::{
    kmer_positions::{for_each_kmer, KmerPositions},
    settings::AlignerSettings,
};
use crate::utils::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommonKmer {
    pub read_pos: usize,
    pub ref_pos: usize,
    /// Position of the point's diagonal on the reference at read position 0
    pub offset: f64,
}

impl CommonKmer {
    fn new(read_pos: usize, ref_pos: usize, expected_slope: f64) -> Self {
        CommonKmer {
            read_pos,
            ref_pos,
            offset: ref_pos as f64 - expected_slope * read_pos as f64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommonKmerSet {
    pub read_name: String,
    pub ref_name: String,
    pub read_length: usize,
    pub ref_length: usize,
    pub expected_slope: f64,
    pub band_size: usize,
    pub max_score: f64,
    pub points: Vec<CommonKmer>,
}

impl CommonKmerSet {
    pub fn new(
        read_name: &str,
        ref_name: &str,
        read_length: usize,
        ref_length: usize,
        expected_slope: f64,
        settings: &AlignerSettings,
        index: &KmerPositions,
    ) -> Result<Self> {
        let read_seq = index
            .get_sequence(read_name)
            .ok_or_else(|| format!("Sequence {} is not indexed", read_name))?;
        let ref_kmers = index
            .kmer_table(ref_name)
            .ok_or_else(|| format!("Reference {} is not indexed", ref_name))?;

        let mut points = Vec::new();
        for_each_kmer(read_seq, index.kmer_size(), |code, read_pos| {
            if let Some(ref_positions) = ref_kmers.get(&code) {
                if ref_positions.len() <= settings.max_kmer_occurrences {
                    points.extend(
                        ref_positions
                            .iter()
                            .map(|&ref_pos| CommonKmer::new(read_pos, ref_pos as usize, expected_slope)),
                    );
                }
            }
        });
        points.sort_by(|a, b| {
            a.offset
                .total_cmp(&b.offset)
                .then(a.read_pos.cmp(&b.read_pos))
                .then(a.ref_pos.cmp(&b.ref_pos))
        });

        let band_size = settings.common_kmer_band_size;
        let max_score = max_window_count(&points, band_size as f64) as f64;

        Ok(CommonKmerSet {
            read_name: read_name.to_string(),
            ref_name: ref_name.to_string(),
            read_length,
            ref_length,
            expected_slope,
            band_size,
            max_score,
            points,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn max_window_count(points: &[CommonKmer], width: f64) -> usize {
    let mut best = 0;
    let mut window_start = 0;
    for (window_end, point) in points.iter().enumerate() {
        while point.offset - points[window_start].offset > width {
            window_start += 1;
        }
        best = best.max(window_end + 1 - window_start);
    }
    best
}
