//! Main cleaner executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Validate the goal coordinates given on the command line
//!     - Initialise the controller, the pose client and the command publisher
//!     - Wait for the first pose from the turtle
//!     - Main loop, at a fixed rate until every goal is reached or the user interrupts:
//!         - Read the latest pose
//!         - Go-to-goal control processing
//!         - Command emission
//!         - Archiving
//!
//! # Usage
//!
//! ```text
//! clean_exec [--params <file>] --coordinates <x1> <y1> [<x2> <y2> ...]
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, error, info, warn};
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};
use structopt::StructOpt;

// Internal
use clean_lib::{
    cmd_publisher::CmdPublisher,
    goals::goals_from_coords,
    goto_ctrl::{GotoCtrl, Params as GotoCtrlParams},
    params::CleanExecParams,
    path_exec::{run_path, PathOutcome},
    pose_client::PoseClient,
    pose_tracker::PoseTracker,
};
use comms_if::net::NetParams;
use util::{
    host,
    logger::{logger_init, parse_level},
    module::State,
    session::Session,
    time::period_s,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Interval at which the pose tracker is polled while waiting for the first pose.
const FIRST_POSE_POLL_PERIOD: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Drive the turtle through a list of goal points, stopping at each.
#[derive(Debug, StructOpt)]
#[structopt(name = "clean_exec")]
struct Args {
    /// Go-to-goal control parameter file, used instead of `goto_ctrl.toml` in the params
    /// directory. Must be given before the coordinates.
    #[structopt(long, parse(from_os_str))]
    params: Option<PathBuf>,

    /// Goal coordinates as a flat list, `x1 y1 x2 y2 ...`, in meters.
    #[structopt(long, required = true, min_values = 1, allow_hyphen_values = true)]
    coordinates: Vec<f64>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- LOAD PARAMETERS ----

    let exec_params: CleanExecParams =
        util::params::load("clean_exec.toml").wrap_err("Could not load exec params")?;

    let goto_ctrl_params: GotoCtrlParams = match args.params {
        Some(ref path) => util::params::load_from_path(path),
        None => util::params::load("goto_ctrl.toml"),
    }
    .wrap_err("Could not load GotoCtrl params")?;

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    exec_params
        .validate()
        .map_err(|e| eyre!(e))
        .wrap_err("Invalid exec params")?;

    // ---- VALIDATE GOALS ----

    // Done before anything touches the network, invalid goals must never move the turtle
    let goals = goals_from_coords(&args.coordinates, goto_ctrl_params.coord_bounds_m)
        .wrap_err("Invalid goal coordinates")?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("clean_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let log_level = parse_level(&exec_params.log_level).wrap_err("Invalid log level")?;
    logger_init(log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Turtle Cleaner Executable\n");
    match host::get_uname() {
        Ok(u) => info!("Running on: {:#?}", u),
        Err(e) => warn!("Could not get host information: {}", e),
    }
    info!("Session directory: {:?}\n", session.session_root);

    debug!("CLI arguments: {:?}", args);
    info!("Goals: {:?}", goals);

    // Run, then close the session whatever the outcome so the log and archives are flushed
    let result = run(&session, exec_params, goto_ctrl_params, net_params, goals);

    if let Err(ref e) = result {
        error!("Cleaner execution failed: {:?}", e);
    }

    session.exit();

    result
}

/// Network setup and path execution.
fn run(
    session: &Session,
    exec_params: CleanExecParams,
    goto_ctrl_params: GotoCtrlParams,
    net_params: NetParams,
    goals: Vec<clean_lib::goals::GoalPoint>,
) -> Result<(), Report> {
    // ---- SHUTDOWN HANDLING ----

    let running = Arc::new(AtomicBool::new(true));
    {
        let r = running.clone();
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        })
        .wrap_err("Failed to install the interrupt handler")?;
    }

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut goto_ctrl = GotoCtrl::default();
    goto_ctrl
        .init(goto_ctrl_params, session)
        .wrap_err("Failed to initialise GotoCtrl")?;
    info!("GotoCtrl init complete");
    info!("GotoCtrl parameters: {:#?}", goto_ctrl.params());

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let tracker = PoseTracker::new();

    let _pose_client = PoseClient::new(&zmq_ctx, &net_params, tracker.clone())
        .wrap_err("Failed to initialise the PoseClient")?;
    info!("PoseClient initialised");

    let mut cmd_publisher = CmdPublisher::new(&zmq_ctx, &net_params)
        .wrap_err("Failed to initialise the CmdPublisher")?;
    info!("CmdPublisher initialised");

    info!("Network initialisation complete\n");

    // ---- WAIT FOR FEEDBACK ----

    info!("Waiting for the first pose...");

    let wait_start = Instant::now();
    let wait_timeout = Duration::from_secs_f64(exec_params.first_pose_timeout_s);

    while !tracker.has_feedback() {
        if !running.load(Ordering::SeqCst) {
            info!("Interrupted before any pose was received");
            return Ok(());
        }

        if wait_start.elapsed() > wait_timeout {
            return Err(eyre!(
                "No pose received within {} s",
                exec_params.first_pose_timeout_s
            ));
        }

        thread::sleep(FIRST_POSE_POLL_PERIOD);
    }

    let pose = tracker.current_pose();
    info!("Start location: ({}, {}), heading {} rad", pose.x, pose.y, pose.theta);

    if !cmd_publisher.is_connected() {
        warn!("CmdPublisher is not yet connected, early commands may be dropped");
    }

    // ---- MAIN LOOP ----

    goto_ctrl
        .begin_path(goals)
        .wrap_err("Failed to begin the path")?;

    info!("Beginning main loop\n");

    let summary = run_path(
        &mut goto_ctrl,
        &tracker,
        &mut cmd_publisher,
        &running,
        Duration::from_secs_f64(period_s(exec_params.cycle_frequency_hz)),
    )
    .wrap_err("Path execution failed")?;

    match summary.outcome {
        PathOutcome::Complete => info!("Path complete"),
        PathOutcome::Interrupted => info!("Interrupted, no further commands will be sent"),
    }

    session.save("path_summary.json", summary);

    Ok(())
}
