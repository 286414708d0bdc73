use crate::utils::Result;
use std::{collections::HashMap, sync::Arc};

pub const MAX_KMER_SIZE: usize = 31;

fn encode_base(base: u8) -> Option<u64> {
    match base {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

/// Calls `f(code, pos)` for every k-mer made only of ACGT, in position order.
pub fn for_each_kmer<F>(seq: &[u8], kmer_size: usize, mut f: F)
where
    F: FnMut(u64, usize),
{
    if kmer_size == 0 || seq.len() < kmer_size {
        return;
    }
    let mask = if kmer_size == 32 {
        u64::MAX
    } else {
        (1u64 << (2 * kmer_size)) - 1
    };
    let mut code = 0u64;
    let mut valid = 0usize;
    for (pos, &base) in seq.iter().enumerate() {
        match encode_base(base) {
            Some(bits) => {
                code = ((code << 2) | bits) & mask;
                valid += 1;
            }
            None => valid = 0,
        }
        if valid >= kmer_size {
            f(code, pos + 1 - kmer_size);
        }
    }
}

#[derive(Debug, Clone)]
struct IndexedSequence {
    seq: Vec<u8>,
    kmers: HashMap<u64, Vec<u32>>,
}

impl IndexedSequence {
    fn new(seq: Vec<u8>, kmer_size: usize) -> Self {
        let mut kmers: HashMap<u64, Vec<u32>> = HashMap::new();
        for_each_kmer(&seq, kmer_size, |code, pos| {
            kmers.entry(code).or_default().push(pos as u32)
        });
        IndexedSequence { seq, kmers }
    }
}

/// Named sequences with their k-mer positions. Clones share the stored
/// sequences; adding or deleting a name only affects the clone it is done on.
#[derive(Debug, Clone)]
pub struct KmerPositions {
    kmer_size: usize,
    sequences: HashMap<String, Arc<IndexedSequence>>,
}

impl KmerPositions {
    pub fn new(kmer_size: usize) -> Result<Self> {
        if !(1..=MAX_KMER_SIZE).contains(&kmer_size) {
            return Err(format!(
                "K-mer size must be between 1 and {}, got {}",
                MAX_KMER_SIZE, kmer_size
            ));
        }
        Ok(KmerPositions {
            kmer_size,
            sequences: HashMap::new(),
        })
    }

    pub fn kmer_size(&self) -> usize {
        self.kmer_size
    }

    pub fn add_positions(&mut self, name: &str, seq: Vec<u8>) -> Result<()> {
        if seq.len() > u32::MAX as usize {
            return Err(format!("Sequence {} is too long to index", name));
        }
        let indexed = IndexedSequence::new(seq, self.kmer_size);
        self.sequences.insert(name.to_string(), Arc::new(indexed));
        Ok(())
    }

    pub fn delete_positions(&mut self, name: &str) -> bool {
        self.sequences.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sequences.contains_key(name)
    }

    pub fn get_sequence(&self, name: &str) -> Option<&[u8]> {
        self.sequences.get(name).map(|s| s.seq.as_slice())
    }

    pub fn get_length(&self, name: &str) -> Option<usize> {
        self.sequences.get(name).map(|s| s.seq.len())
    }

    pub fn get_all_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sequences.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub(crate) fn kmer_table(&self, name: &str) -> Option<&HashMap<u64, Vec<u32>>> {
        self.sequences.get(name).map(|s| &s.kmers)
    }
}
