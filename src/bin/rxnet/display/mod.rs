mod banner;
mod error;
mod progress;
mod tables;

pub use banner::{banner_for_help, print_banner};
pub use error::print_error;
pub use progress::Progress;
pub use tables::{IngestRow, print_ingest_results, print_lineage, print_network_summary, print_states};

/// How chatty the terminal output may be.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    /// Spinners and banners go to stderr only when it is a terminal and
    /// `--quiet` was not given.
    pub interactive: bool,
}

impl Context {
    pub fn new(quiet: bool) -> Self {
        Self {
            interactive: !quiet && crate::io::stderr_is_tty(),
        }
    }
}
