//! # brigid
//!
//! The binary is intentionally thin: the CLI lives in `cli/`, and this file only
//! invokes `cli::run()` and handles process termination. See the library docs for the
//! layering below the CLI.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", cli::render_error(&e));
        std::process::exit(1);
    }
}
