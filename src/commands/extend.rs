use crate::cli::ExtendArgs;
use crate::sgalign::extension_alignment_for_side;
use crate::utils::{to_uppercase_bases, Result};

pub fn extend(args: ExtendArgs) -> Result<()> {
    let read = to_uppercase_bases(args.read_seq.trim().as_bytes());
    let reference = to_uppercase_bases(args.reference_seq.trim().as_bytes());

    let alignment = extension_alignment_for_side(args.side, &read, &reference, &args.aln_scoring)?;
    log::info!(
        "Extension alignment at the {} of the reference: scaled score {:.2}",
        args.side,
        alignment.scaled_score
    );
    println!("{}", alignment.full_string());
    Ok(())
}
