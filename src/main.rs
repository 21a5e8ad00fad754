//! postwatch binary: wires the command line to the library.
//!
//! Logs go to stderr through `tracing`; stdout is left to the console sink.
//! Any fatal error ends the process with a non-zero status and the phase
//! that failed (configuration, persistence-load, persistence-save, ...).

mod cli;

use std::process;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use postwatch::{HttpTransport, Shutdown, Watcher};

// ---------------------------------------------------------------------------
// Ctrl-C
// ---------------------------------------------------------------------------

/// What an interrupt should do.
#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    /// Let the current cycle finish, then stop.
    Finish,
    /// A stop was already requested and the cycle is still running.
    Abort,
}

fn interrupt(shutdown: &Shutdown) -> Interrupt {
    if shutdown.is_triggered() {
        Interrupt::Abort
    } else {
        shutdown.trigger();
        Interrupt::Finish
    }
}

/// Trigger `shutdown` on the first Ctrl-C and exit on the second.
///
/// The watcher itself is blocking, so the signal is awaited on a one-thread
/// runtime owned by a helper thread.
fn install_ctrl_c(shutdown: Shutdown) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("could not start signal handler")?;

    thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            runtime.block_on(async {
                while tokio::signal::ctrl_c().await.is_ok() {
                    match interrupt(&shutdown) {
                        Interrupt::Finish => info!("interrupt received; finishing current cycle"),
                        Interrupt::Abort => {
                            warn!("second interrupt; exiting now");
                            process::exit(130);
                        }
                    }
                }
            });
        })
        .context("could not start signal handler")?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // -- configure the watched page and its stores ---------------------------
    let source = cli.source().context("configuration")?;
    let transport = HttpTransport::new(cli.timeout()).context("configuration")?;
    let mut watcher = Watcher::open(source, transport, &cli.store_config())
        .context("could not start watcher")?
        .with_options(cli.watcher_options());

    // -- configure the action ------------------------------------------------
    let mut sink = cli.sink().context("could not set up notifications")?;

    // -- run -----------------------------------------------------------------
    if cli.once {
        let fresh = watcher
            .watch(sink.as_mut())
            .context("watch cycle failed")?;
        info!(new = fresh.len(), "single cycle done");
        return Ok(());
    }

    let shutdown = Shutdown::new();
    install_ctrl_c(shutdown.clone())?;
    watcher
        .watch_forever(sink.as_mut(), cli.interval(), &shutdown)
        .context("watcher stopped")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_interrupt_stops_gracefully_second_aborts() {
        let shutdown = Shutdown::new();
        assert_eq!(interrupt(&shutdown), Interrupt::Finish);
        assert!(shutdown.is_triggered());
        assert_eq!(interrupt(&shutdown), Interrupt::Abort);
        assert_eq!(interrupt(&shutdown), Interrupt::Abort);
    }
}
