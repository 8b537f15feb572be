//! # duprm CLI
//!
//! Moves duplicate MP3 files to the trash, keeping the newest copy.
//!
//! ## Usage
//! ```bash
//! duprm ~/Music
//! duprm ~/Music --dry-run --output json
//! duprm --list files.txt
//! ```

mod cli;

use duprm::Result;

fn main() -> Result<()> {
    cli::run()
}
