//! Main rover-side executable entry point.
//!
//! # Architecture
//!
//! This executable is a carrier for a single robot. It starts a link with
//! the monitoring behaviour, then for each line on stdin:
//!
//!     - Hands the line (a sensor string) to the link
//!     - Writes the returned command string as a line on stdout
//!
//! The link is closed, stopping the robot, at the end of input.
//!
//! Logs go to stderr and the session log file so stdout only carries
//! command strings.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info};
use std::{
    env,
    io::{self, BufRead, Write},
};

// Internal
use rov_lib::{behaviour::Monitor, link::Link, params::LinkConfig};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("rov_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Qtruck Rover Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let device_id = match args.get(1) {
        Some(id) => id.clone(),
        None => return Err(eyre!("Usage: rov_exec <device_id>")),
    };

    // ---- LOAD PARAMETERS ----

    let config = LinkConfig::load().wrap_err("Could not load rov_exec params")?;

    info!("Exec parameters loaded");

    // ---- START LINK ----

    let link = Link::start(&device_id, config, Monitor)
        .wrap_err_with(|| format!("Failed to start the link to {}", device_id))?;

    // ---- CARRIER LOOP ----

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line.wrap_err("Failed to read a sensor string")?;

        let cmd = link.swap(line.trim_end());

        writeln!(out, "{}", cmd).wrap_err("Failed to write a command string")?;
        out.flush().wrap_err("Failed to flush stdout")?;

        if !link.is_running() {
            info!("Control loop stopped");
            break;
        }
    }

    // ---- SHUTDOWN ----

    link.done().wrap_err("Failed to close the link")?;

    info!("End of execution");

    Ok(())
}
