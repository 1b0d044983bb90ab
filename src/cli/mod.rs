//! CLI module - argument parsing, prompts and the interactive session

mod args;
pub mod interrupt;
pub mod prompts;
pub mod reveal;
pub mod selector;
pub mod session;

pub use args::Cli;
pub use interrupt::*;
pub use prompts::*;
pub use reveal::*;
pub use selector::*;
pub use session::*;
