use super::{to_uppercase_bases, Result};
use bio::io::{fasta, fastq};
use crossbeam_channel::Sender;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read as ioRead};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct SeqRecord {
    pub name: String,
    pub seq: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SeqFormat {
    Fasta,
    Fastq,
}

pub fn open_sequence_reader(path: &Path) -> Result<BufReader<Box<dyn ioRead>>> {
    fn is_gzipped(path: &Path) -> bool {
        let path_str = path.to_string_lossy().to_lowercase();
        path_str.ends_with(".gz") || path_str.ends_with(".gzip")
    }
    let file = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    if is_gzipped(path) {
        let gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_some() {
            Ok(BufReader::new(Box::new(gz_decoder)))
        } else {
            Err(format!("Invalid gzip header: {}", path.to_string_lossy()))
        }
    } else {
        Ok(BufReader::new(Box::new(file)))
    }
}

fn detect_format<R: BufRead>(reader: &mut R, path: &Path) -> Result<Option<SeqFormat>> {
    let buffer = reader
        .fill_buf()
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    match buffer.first() {
        None => Ok(None),
        Some(b'>') => Ok(Some(SeqFormat::Fasta)),
        Some(b'@') => Ok(Some(SeqFormat::Fastq)),
        Some(_) => Err(format!(
            "Unrecognized sequence format (expected FASTA or FASTQ): {}",
            path.display()
        )),
    }
}

/// Visits every record of a FASTA/FASTQ file (optionally gzipped) in file
/// order. Sequences are uppercased. Stops at the first callback error.
pub fn for_each_record<F>(path: &Path, mut callback: F) -> Result<()>
where
    F: FnMut(Result<SeqRecord>) -> Result<()>,
{
    let mut reader = open_sequence_reader(path)?;
    match detect_format(&mut reader, path)? {
        None => Ok(()),
        Some(SeqFormat::Fasta) => {
            for (index, record) in fasta::Reader::new(reader).records().enumerate() {
                let record = record
                    .map_err(|e| format!("Error at FASTA record {}: {}", index + 1, e))
                    .map(|rec| SeqRecord {
                        name: rec.id().to_string(),
                        seq: to_uppercase_bases(rec.seq()),
                    });
                callback(record)?;
            }
            Ok(())
        }
        Some(SeqFormat::Fastq) => {
            for (index, record) in fastq::Reader::new(reader).records().enumerate() {
                let record = record
                    .map_err(|e| format!("Error at FASTQ record {}: {}", index + 1, e))
                    .map(|rec| SeqRecord {
                        name: rec.id().to_string(),
                        seq: to_uppercase_bases(rec.seq()),
                    });
                callback(record)?;
            }
            Ok(())
        }
    }
}

pub fn read_sequence_records(path: &Path) -> Result<Vec<SeqRecord>> {
    let mut records = Vec::new();
    for_each_record(path, |record| {
        records.push(record?);
        Ok(())
    })?;
    Ok(records)
}

pub fn stream_reads_into_channel(path: &Path, sender: Sender<Result<SeqRecord>>) -> Result<()> {
    for_each_record(path, |record| {
        sender
            .send(record)
            .map_err(|e| format!("Failed to send read through channel: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn reads_fasta_and_uppercases() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "refs.fa", b">chr1 desc\nacgt\nACGT\n>chr2\nNNNN\n");
        let records = read_sequence_records(&path).unwrap();
        assert_eq!(
            records,
            vec![
                SeqRecord {
                    name: "chr1".to_string(),
                    seq: b"ACGTACGT".to_vec()
                },
                SeqRecord {
                    name: "chr2".to_string(),
                    seq: b"NNNN".to_vec()
                },
            ]
        );
    }

    #[test]
    fn reads_gzipped_fastq() {
        let dir = tempfile::tempdir().unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(b"@read1\nACGTTG\n+\nIIIIII\n@read2\nggcc\n+\nIIII\n")
            .unwrap();
        let path = write_file(&dir, "reads.fq.gz", &encoder.finish().unwrap());
        let records = read_sequence_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "read1");
        assert_eq!(records[1].seq, b"GGCC".to_vec());
    }

    #[test]
    fn empty_file_yields_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "empty.fa", b"");
        assert!(read_sequence_records(&path).unwrap().is_empty());
    }

    #[test]
    fn unknown_format_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "reads.txt", b"ACGT\n");
        assert!(read_sequence_records(&path).is_err());
    }

    #[test]
    fn invalid_gzip_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "reads.fa.gz", b">r\nACGT\n");
        assert!(open_sequence_reader(&path).is_err());
    }

    #[test]
    fn streamed_reads_arrive_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "reads.fa", b">a\nAC\n>b\nGT\n>c\nTT\n");
        let (sender, receiver) = crossbeam_channel::unbounded();
        stream_reads_into_channel(&path, sender).unwrap();
        let names: Vec<String> = receiver.iter().map(|r| r.unwrap().name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
