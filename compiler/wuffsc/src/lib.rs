//! The `wuffs` command-line tool.
//!
//! `main.rs` dispatches on the command name; the handlers and their flag
//! parsing live in [`commands`] so they can be tested without a process.

pub mod commands;

/// Install a hierarchical `tracing` subscriber filtered by `RUST_LOG`.
/// Nothing is installed when `RUST_LOG` is unset.
pub fn init_tracing() {
    use tracing_subscriber::{prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_bracketed_fields(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}
