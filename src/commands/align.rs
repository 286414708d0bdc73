use crate::cli::AlignArgs;
use crate::sgalign::{align_read, AlignerSettings, AlignmentWriter, KmerPositions, ReadAlignments};
use crate::utils::{
    create_writer, read_sequence_records, stream_reads_into_channel, Result, ScoringScheme,
    SeqRecord,
};
use crossbeam_channel::{bounded, Sender};
use rayon::{
    iter::{ParallelBridge, ParallelIterator},
    ThreadPoolBuilder,
};
use std::{cell::RefCell, path::Path, sync::Arc, thread};

#[derive(Debug, Clone)]
struct RequestParams {
    scoring: ScoringScheme,
    low_score_threshold: f64,
    expected_slope: f64,
    verbosity: u8,
    settings: AlignerSettings,
}

thread_local! {
    // Per-worker view of the reference index; the sequences themselves are shared
    static THREAD_INDEX: RefCell<Option<KmerPositions>> = const { RefCell::new(None) };
}

const CHANNEL_BUFFER_SIZE: usize = 2048;

pub fn align(args: AlignArgs, verbosity: u8) -> Result<()> {
    let settings = AlignerSettings {
        starting_band_size: args.starting_band,
        max_band_size: args.max_band,
        ..AlignerSettings::default()
    };
    settings.validate()?;
    args.aln_scoring.validate()?;

    let index = Arc::new(load_reference_index(&args.reference_path, args.kmer_size)?);
    log::info!(
        "Indexed {} reference sequences with k = {}",
        index.len(),
        args.kmer_size
    );

    let mut writer = create_writer(&args.output_prefix, "tsv", AlignmentWriter::new)?;

    let (sender_read, receiver_read) = bounded(CHANNEL_BUFFER_SIZE);
    let reads_path = args.reads_path.clone();
    let read_stream_thread =
        thread::spawn(move || stream_reads_into_channel(&reads_path, sender_read));

    let (sender_result, receiver_result) = bounded::<(String, ReadAlignments)>(CHANNEL_BUFFER_SIZE);
    let writer_thread = thread::spawn(move || {
        for (read_name, result) in &receiver_result {
            writer.write(&read_name, &result);
        }
        writer.finish()
    });

    let params = Arc::new(RequestParams {
        scoring: args.aln_scoring,
        low_score_threshold: args.low_score_threshold,
        expected_slope: args.expected_slope,
        verbosity,
        settings,
    });

    log::debug!(
        "Initializing thread pool with {} threads...",
        args.num_threads
    );
    let pool = initialize_thread_pool(args.num_threads, index)?;
    pool.install(|| {
        receiver_read
            .into_iter()
            .par_bridge()
            .for_each_with(&sender_result, |s, read_result| match read_result {
                Ok(read) => process_read(read, &params, s),
                Err(err) => log::error!("Read parsing: {:#}", err),
            });
    });

    // Clean-up
    drop(sender_result);
    let write_status = writer_thread.join().expect("Writer thread panicked");
    log::trace!("Writer thread finished");
    match read_stream_thread.join().expect("Read stream thread panicked") {
        Ok(_) => log::trace!("Read stream thread finished"),
        Err(e) => log::error!("Read streaming failed: {}", e),
    }
    write_status
}

fn load_reference_index(path: &Path, kmer_size: usize) -> Result<KmerPositions> {
    let mut index = KmerPositions::new(kmer_size)?;
    for record in read_sequence_records(path)? {
        if index.contains(&record.name) {
            return Err(format!("Duplicate reference name: {}", record.name));
        }
        index.add_positions(&record.name, record.seq)?;
    }
    if index.is_empty() {
        return Err(format!("No reference sequences in {}", path.display()));
    }
    Ok(index)
}

fn process_read(
    read: SeqRecord,
    params: &Arc<RequestParams>,
    sender_result: &Sender<(String, ReadAlignments)>,
) {
    THREAD_INDEX.with(|index_cell| {
        let mut index_slot = index_cell.borrow_mut();
        let Some(index) = index_slot.as_mut() else {
            log::error!("Reference index not initialized on this thread");
            return;
        };
        match align_read(
            &read.name,
            &read.seq,
            params.verbosity,
            params.expected_slope,
            index,
            &params.scoring,
            params.low_score_threshold,
            &params.settings,
        ) {
            Ok(result) => {
                if !result.diagnostics.is_empty() {
                    log::debug!("{}", result.diagnostics.trim_end());
                }
                log::trace!(
                    "{}: {} alignments after {} tiers",
                    read.name,
                    result.alignments.len(),
                    result.tiers_run
                );
                if let Err(e) = sender_result.send((read.name, result)) {
                    log::error!("Failed to send read result to writer thread: {}", e);
                }
            }
            Err(err) => {
                log::error!("Error aligning read {}: {}", read.name, err);
            }
        }
    });
}

fn initialize_thread_pool(
    num_threads: usize,
    index: Arc<KmerPositions>,
) -> Result<rayon::ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("sgalign-{}", i))
        .start_handler(move |_thread_index| {
            THREAD_INDEX.with(|cell| {
                *cell.borrow_mut() = Some(KmerPositions::clone(&index));
            });
            log::trace!("Initialized thread {:?}", std::thread::current().id());
        })
        .exit_handler(|_thread_index| {
            THREAD_INDEX.with(|cell| {
                *cell.borrow_mut() = None;
            });
        })
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))
}
