//! # Pose Client
//!
//! The PoseClient subscribes to the pose feedback published by the turtle (or its simulation) and
//! writes each reading into a [`PoseTracker`] from a background thread. Readings are applied in
//! the order they are delivered, so the tracker always holds the most recent one.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use log::{error, warn};

use crate::pose_tracker::PoseTracker;
use comms_if::{
    eqpt::turtle::{Pose, POSE_TOPIC},
    net::{decode_topic_msg, zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct PoseClient {
    bg_jh: Option<JoinHandle<()>>,
    bg_run: Arc<AtomicBool>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PoseClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not subscribe to the pose topic: {0}")]
    SubscribeError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PoseClient {
    /// Create a new instance of the PoseClient, which immediately starts feeding `tracker`.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        tracker: PoseTracker,
    ) -> Result<Self, PoseClientError> {
        // The short receive timeout lets the background thread notice when it should stop.
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            ..Default::default()
        };

        // Connect the socket
        let socket = MonitoredSocket::new(ctx, zmq::SUB, socket_options, &params.pose_endpoint)
            .map_err(PoseClientError::SocketError)?;

        socket
            .set_subscribe(POSE_TOPIC.as_bytes())
            .map_err(PoseClientError::SubscribeError)?;

        // Start BG thread
        let bg_run = Arc::new(AtomicBool::new(true));
        let bg_run_clone = bg_run.clone();
        let bg_jh = Some(thread::spawn(move || {
            bg_thread(socket, bg_run_clone, tracker)
        }));

        Ok(Self { bg_jh, bg_run })
    }
}

impl Drop for PoseClient {
    fn drop(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);

        if let Some(jh) = self.bg_jh.take() {
            jh.join().ok();
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Background thread, updates the tracker when the server publishes a new pose.
fn bg_thread(socket: MonitoredSocket, run: Arc<AtomicBool>, tracker: PoseTracker) {
    // While instructed to run
    while run.load(Ordering::Relaxed) {
        // Read string from the socket
        let msg = match socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                warn!("Non UTF-8 message from pose publisher");
                continue;
            }
            Err(zmq::Error::EAGAIN) => continue,
            Err(e) => {
                error!("Error receiving message from pose publisher: {:?}", e);
                break;
            }
        };

        // Deserialize the message and hand it to the tracker
        match decode_topic_msg::<Pose>(POSE_TOPIC, &msg) {
            Ok(pose) => tracker.on_pose_update(pose),
            Err(e) => warn!("Error deserialising pose message: {}", e),
        }
    }
}
