use crate::sgalign::{ExtensionSide, MAX_KMER_SIZE};
use crate::utils::{Result, ScoringScheme};
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| match option_env!("SGALIGN_GIT_DESCRIBE") {
    Some(describe) => format!("{}-{}", env!("CARGO_PKG_VERSION"), describe),
    None => env!("CARGO_PKG_VERSION").to_string(),
});

#[derive(Parser)]
#[command(name="sgalign",
          version=&**FULL_VERSION,
          about="Multi-level sensitivity semi-global aligner",
          long_about = None,
          disable_help_subcommand = true,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Align reads to reference sequences")]
    Align(AlignArgs),
    #[clap(about = "Align a read to one end of a reference sequence")]
    Extend(ExtendArgs),
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("align")))]
#[command(arg_required_else_help(true))]
pub struct AlignArgs {
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reference")]
    #[clap(help = "Reference sequences (FASTA, optionally gzipped)")]
    #[clap(value_name = "FASTA")]
    #[arg(value_parser = check_file_exists)]
    pub reference_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'q')]
    #[clap(long = "reads")]
    #[clap(help = "Reads to align (FASTA or FASTQ, optionally gzipped)")]
    #[clap(value_name = "READS")]
    #[arg(value_parser = check_file_exists)]
    pub reads_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(help = "Prefix for output files")]
    #[clap(value_name = "OUTPUT_PREFIX")]
    #[arg(value_parser = check_prefix_path)]
    pub output_prefix: String,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(short = 'k')]
    #[clap(long = "kmer-size")]
    #[clap(value_name = "KMER_SIZE")]
    #[clap(help = "K-mer size used to find common seeds")]
    #[clap(default_value = "10")]
    #[arg(value_parser = kmer_size_in_range)]
    pub kmer_size: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "aln-scoring")]
    #[clap(value_name = "SCORING")]
    #[clap(help = "Alignment scoring (match > 0, penalties <= 0): MATCH,MISM,GAPO,GAPE")]
    #[clap(default_value = "3,-6,-5,-2")]
    #[arg(value_parser = scoring_from_string, allow_hyphen_values = true)]
    pub aln_scoring: ScoringScheme,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "low-score")]
    #[clap(value_name = "SCORE")]
    #[clap(help = "Scaled score (0-100) an alignment needs to count towards read coverage")]
    #[clap(default_value = "75.0")]
    #[arg(value_parser = ensure_score_threshold)]
    pub low_score_threshold: f64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "expected-slope")]
    #[clap(value_name = "SLOPE")]
    #[clap(help = "Expected ratio of reference to read length along an alignment")]
    #[clap(default_value = "1.0")]
    #[arg(value_parser = ensure_positive_float)]
    pub expected_slope: f64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "starting-band")]
    #[clap(value_name = "BAND")]
    #[clap(help = "Band width of the first banded alignment attempt")]
    #[clap(default_value = "10")]
    #[arg(value_parser = ensure_positive_int)]
    pub starting_band: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "max-band")]
    #[clap(value_name = "BAND")]
    #[clap(help = "Largest band width tried")]
    #[clap(default_value = "160")]
    #[arg(value_parser = ensure_positive_int)]
    pub max_band: usize,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("extend")))]
#[command(arg_required_else_help(true))]
pub struct ExtendArgs {
    #[clap(required = true)]
    #[clap(long = "read")]
    #[clap(help = "Read sequence")]
    #[clap(value_name = "SEQ")]
    pub read_seq: String,

    #[clap(required = true)]
    #[clap(long = "reference")]
    #[clap(help = "Reference sequence")]
    #[clap(value_name = "SEQ")]
    pub reference_seq: String,

    #[clap(long = "side")]
    #[clap(value_name = "SIDE")]
    #[clap(help = "Reference end left free before (start) or after (end) the read")]
    #[clap(default_value = "start")]
    pub side: ExtensionSide,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "aln-scoring")]
    #[clap(value_name = "SCORING")]
    #[clap(help = "Alignment scoring (match > 0, penalties <= 0): MATCH,MISM,GAPO,GAPE")]
    #[clap(default_value = "3,-6,-5,-2")]
    #[arg(value_parser = scoring_from_string, allow_hyphen_values = true)]
    pub aln_scoring: ScoringScheme,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn kmer_size_in_range(s: &str) -> Result<usize> {
    let kmer_size: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid k-mer size", s))?;
    if (1..=MAX_KMER_SIZE).contains(&kmer_size) {
        Ok(kmer_size)
    } else {
        Err(format!("K-mer size must be between 1 and {}", MAX_KMER_SIZE))
    }
}

fn ensure_positive_int(s: &str) -> Result<usize> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid positive integer", s))?;
    if value == 0 {
        Err("The value must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn ensure_score_threshold(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if !(0.0..=100.0).contains(&value) {
        Err(format!(
            "The value must be between 0.0 and 100.0, got: {}",
            value
        ))
    } else {
        Ok(value)
    }
}

fn ensure_positive_float(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("The value must be positive, got: {}", value))
    }
}

fn scoring_from_string(s: &str) -> Result<ScoringScheme> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_threshold_bounds() {
        assert_eq!(ensure_score_threshold("75").unwrap(), 75.0);
        assert!(ensure_score_threshold("100.5").is_err());
        assert!(ensure_score_threshold("-1").is_err());
        assert!(ensure_score_threshold("abc").is_err());
    }

    #[test]
    fn numeric_validators() {
        assert!(threads_in_range("0").is_err());
        assert_eq!(threads_in_range("4").unwrap(), 4);
        assert!(kmer_size_in_range("32").is_err());
        assert_eq!(kmer_size_in_range("15").unwrap(), 15);
        assert!(ensure_positive_int("0").is_err());
        assert!(ensure_positive_float("0.0").is_err());
        assert_eq!(ensure_positive_float("1.5").unwrap(), 1.5);
    }

    #[test]
    fn scoring_accepts_negative_penalties() {
        let scoring = scoring_from_string("2,-3,-4,-1").unwrap();
        assert_eq!(scoring.mism_scr, -3);
        assert!(scoring_from_string("2,3,-4,-1").is_err());
    }

    #[test]
    fn parses_extend_command() {
        let cli = Cli::try_parse_from([
            "sgalign",
            "-vv",
            "extend",
            "--read",
            "ACGT",
            "--reference",
            "GGACGT",
            "--side",
            "end",
            "--aln-scoring",
            "1,-1,-2,-1",
        ])
        .unwrap();
        assert_eq!(cli.verbosity, 2);
        match cli.command {
            Command::Extend(args) => {
                assert_eq!(args.side, ExtensionSide::End);
                assert_eq!(args.aln_scoring.gapo_scr, -2);
            }
            Command::Align(_) => panic!("expected extend"),
        }
    }
}
