pub mod cli;
pub mod commands;
pub mod sgalign;
pub mod utils;
