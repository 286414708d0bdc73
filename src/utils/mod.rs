mod io_utils;
mod readers;
mod scoring;
mod util;

pub use io_utils::{create_writer, open_text_writer};
pub use readers::{
    open_sequence_reader, read_sequence_records, stream_reads_into_channel, SeqRecord,
};
pub use scoring::ScoringScheme;
pub use util::{describe_base, handle_error_and_exit, to_uppercase_bases, Result};
