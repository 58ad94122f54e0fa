//! Tidy CLI
//!
//! Reads source from stdin, formats it with the default rules and options,
//! and writes the result to stdout. A file that cannot be formatted is
//! reported on stderr and exits with status 1.

use std::io::{Read, Write};
use std::sync::Once;

use tidy_fmt::{default_rules, format, FormatOptions};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber, but only when `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(filter)
                .init();
        }
    });
}

fn main() {
    init_tracing();

    let mut source = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut source) {
        eprintln!("Error reading from stdin: {e}");
        std::process::exit(1);
    }

    match format(&source, &default_rules(), &FormatOptions::default()) {
        Ok(formatted) => {
            if let Err(e) = std::io::stdout().write_all(formatted.as_bytes()) {
                eprintln!("Error writing to stdout: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "format failed");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
