//! wsgi-charm CLI entry point
//!
//! Parses arguments, sets up logging, runs the command, and turns failures
//! into a readable message and exit status 1.

use clap::Parser;
use wsgi_charm::cli::{self, logging};
use wsgi_charm::core::user_friendly_error;

fn main() {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    logging::init(cli.log_level());

    if let Err(e) = cli.execute() {
        tracing::debug!("Command failed: {e:?}");
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(1);
    }
}
