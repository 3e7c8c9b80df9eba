//! # Turtle Simulation
//!
//! This binary serves a simulated turtle over the network, publishing its pose and accepting
//! velocity commands, so the cleaner can be run without a physical turtle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use color_eyre::{eyre::WrapErr, Result};
use log::{info, trace, warn};

use clean_lib::sim::{SimParams, TurtleSim};
use comms_if::{
    eqpt::turtle::{Twist, VelCmd, CMD_VEL_TOPIC, POSE_TOPIC},
    net::{decode_topic_msg, encode_topic_msg, zmq, MonitoredSocket, NetParams, SocketOptions},
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
    time::period_s,
};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("turtle_sim", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Info, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Turtle Simulation\n");
    match host::get_uname() {
        Ok(u) => info!("Running on: {:#?}", u),
        Err(e) => warn!("Could not get host information: {}", e),
    }
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;
    let sim_params: SimParams =
        util::params::load("turtle_sim.toml").wrap_err("Could not load sim params")?;

    let mut sim = TurtleSim::new(sim_params);

    info!("Sim parameters: {:#?}", sim.params());

    // ---- SHUTDOWN HANDLING ----

    let running = Arc::new(AtomicBool::new(true));
    {
        let r = running.clone();
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        })
        .wrap_err("Failed to install the interrupt handler")?;
    }

    // ---- INITIALISE NETWORK ----

    let zmq_ctx = zmq::Context::new();

    let socket_options = || SocketOptions {
        bind: true,
        block_on_first_connect: false,
        linger: 1,
        recv_timeout: 10,
        send_timeout: 10,
        ..Default::default()
    };

    let pose_socket = MonitoredSocket::new(
        &zmq_ctx,
        zmq::PUB,
        socket_options(),
        &net_params.pose_bind_endpoint,
    )
    .wrap_err("Failed to bind the pose socket")?;

    let cmd_socket = MonitoredSocket::new(
        &zmq_ctx,
        zmq::SUB,
        socket_options(),
        &net_params.cmd_vel_bind_endpoint,
    )
    .wrap_err("Failed to bind the command socket")?;
    cmd_socket
        .set_subscribe(CMD_VEL_TOPIC.as_bytes())
        .wrap_err("Failed to subscribe to velocity commands")?;

    info!("Network initialisation complete\n");

    // ---- MAIN LOOP ----

    let dt_s = period_s(sim.params().pose_pub_rate_hz);
    let cycle_period = Duration::from_secs_f64(dt_s);

    let pose = sim.pose();
    info!("Spawned turtle at ({}, {}), heading {} rad", pose.x, pose.y, pose.theta);

    while running.load(Ordering::SeqCst) {
        let cycle_start = Instant::now();

        // Only the most recent command matters
        loop {
            match cmd_socket.recv_string(zmq::DONTWAIT) {
                Ok(Ok(msg)) => match decode_topic_msg::<Twist>(CMD_VEL_TOPIC, &msg) {
                    Ok(twist) => sim.set_cmd(VelCmd::from(twist)),
                    Err(e) => warn!("Error deserialising command message: {}", e),
                },
                Ok(Err(_)) => warn!("Non UTF-8 message on the command socket"),
                Err(zmq::Error::EAGAIN) => break,
                Err(e) => {
                    warn!("Error receiving command: {}", e);
                    break;
                }
            }
        }

        sim.step(dt_s);

        let pose = sim.pose();
        trace!("Pose: {:?}", pose);

        match encode_topic_msg(POSE_TOPIC, &pose) {
            Ok(msg) => {
                if let Err(e) = pose_socket.send(&msg, 0) {
                    warn!("Could not publish pose: {}", e);
                }
            }
            Err(e) => warn!("Could not serialise pose: {}", e),
        }

        if let Some(sleep_dur) = cycle_period.checked_sub(cycle_start.elapsed()) {
            thread::sleep(sleep_dur);
        }
    }

    info!("Simulation stopped");

    session.exit();

    Ok(())
}
