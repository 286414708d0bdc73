use super::driver::ReadAlignments;
use crate::utils::{open_text_writer, Result};
use std::io::{BufWriter, Write};

pub struct AlignmentWriter {
    writer: BufWriter<Box<dyn Write + Send>>,
    lines_written: usize,
}

impl AlignmentWriter {
    pub fn new(output_path: &str) -> Result<Self> {
        let mut writer = open_text_writer(output_path)?;
        writeln!(writer, "#read_name\talignment")
            .map_err(|e| format!("Failed to write header to {}: {}", output_path, e))?;
        Ok(AlignmentWriter {
            writer,
            lines_written: 0,
        })
    }

    pub fn write(&mut self, read_name: &str, result: &ReadAlignments) {
        for alignment in &result.alignments {
            if let Err(e) = writeln!(self.writer, "{}\t{}", read_name, alignment.full_string()) {
                log::error!("Failed to write alignment of {}: {}", read_name, e);
                return;
            }
            self.lines_written += 1;
        }
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| format!("Failed to flush alignments: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sgalign::{alignment::SemiGlobalAlignment, orientation::Strand};

    #[test]
    fn writes_one_line_per_alignment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let path_str = path.to_string_lossy().to_string();

        let mut aln = SemiGlobalAlignment::empty(Strand::Forward, "chr1");
        aln.read_end = 8;
        aln.ref_start = 500;
        aln.ref_end = 508;
        aln.raw_score = 24;
        aln.scaled_score = 100.0;
        aln.cigar = "8M".to_string();
        let result = ReadAlignments {
            alignments: vec![aln.clone(), aln],
            tiers_run: 1,
            diagnostics: String::new(),
        };

        let mut writer = AlignmentWriter::new(&path_str).unwrap();
        writer.write("read1", &result);
        assert_eq!(writer.lines_written(), 2);
        writer.finish().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "read1\t+,chr1,0,8,500,508,24,100.000000,0,8M");
    }
}
