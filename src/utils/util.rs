pub type Result<T> = std::result::Result<T, String>;

pub fn handle_error_and_exit(err: String) -> ! {
    log::error!("{}", err);
    std::process::exit(1);
}

/// Printable form of a sequence byte for error messages
pub fn describe_base(base: u8) -> String {
    std::ascii::escape_default(base).to_string()
}

pub fn to_uppercase_bases(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|b| b.to_ascii_uppercase()).collect()
}
