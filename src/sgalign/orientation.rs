use super::{kmer_positions::KmerPositions, sequence::reverse_complement};
use crate::utils::Result;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn symbol(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

pub fn oriented_name(read_name: &str, strand: Strand) -> String {
    format!("{}{}", read_name, strand.symbol())
}

/// Both orientations of a read registered in the index. The entries are
/// removed when the guard goes out of scope.
pub struct RegisteredRead<'a> {
    index: &'a mut KmerPositions,
    forward_name: String,
    reverse_name: String,
    is_palindrome: bool,
}

impl<'a> RegisteredRead<'a> {
    pub fn register(
        index: &'a mut KmerPositions,
        read_name: &str,
        read_seq: &[u8],
    ) -> Result<Self> {
        if read_seq.is_empty() {
            return Err(format!("Read {} has an empty sequence", read_name));
        }
        let rev_comp =
            reverse_complement(read_seq).map_err(|e| format!("Read {}: {}", read_name, e))?;

        let forward_name = oriented_name(read_name, Strand::Forward);
        let reverse_name = oriented_name(read_name, Strand::Reverse);
        for name in [&forward_name, &reverse_name] {
            if index.contains(name) {
                return Err(format!(
                    "Read name {} collides with an indexed sequence",
                    name
                ));
            }
        }

        let is_palindrome = rev_comp == read_seq;
        index.add_positions(&forward_name, read_seq.to_vec())?;
        if let Err(e) = index.add_positions(&reverse_name, rev_comp) {
            index.delete_positions(&forward_name);
            return Err(e);
        }
        log::trace!("Registered {} and {}", forward_name, reverse_name);

        Ok(RegisteredRead {
            index,
            forward_name,
            reverse_name,
            is_palindrome,
        })
    }

    pub fn index(&self) -> &KmerPositions {
        &*self.index
    }

    pub fn name(&self, strand: Strand) -> &str {
        match strand {
            Strand::Forward => &self.forward_name,
            Strand::Reverse => &self.reverse_name,
        }
    }

    pub fn is_palindrome(&self) -> bool {
        self.is_palindrome
    }
}

impl Drop for RegisteredRead<'_> {
    fn drop(&mut self) {
        self.index.delete_positions(&self.forward_name);
        self.index.delete_positions(&self.reverse_name);
    }
}
