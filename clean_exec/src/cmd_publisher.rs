//! # Velocity Command Publisher
//!
//! Publishes velocity commands to the turtle. Publishing is fire-and-forget, no response is
//! expected and nothing is retried.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::turtle::{Twist, VelCmd, CMD_VEL_TOPIC},
    net::{
        encode_topic_msg, zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions,
        TopicMsgError,
    },
};

use crate::path_exec::CmdSink;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Velocity command publisher
pub struct CmdPublisher {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CmdPublisherError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the command: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the command: {0}")]
    SerializationError(TopicMsgError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CmdPublisher {
    /// Create a new instance of the publisher, connecting to the command endpoint.
    ///
    /// This function will not block until the turtle connects, zmq keeps retrying in the
    /// background.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, CmdPublisherError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, &params.cmd_vel_endpoint)
            .map_err(CmdPublisherError::SocketError)?;

        Ok(Self { socket })
    }

    /// Returns true if the publisher is connected to the command subscriber.
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }
}

impl CmdSink for CmdPublisher {
    type Error = CmdPublisherError;

    fn send_cmd(&mut self, cmd: VelCmd) -> Result<(), Self::Error> {
        let msg = encode_topic_msg(CMD_VEL_TOPIC, &Twist::from(cmd))
            .map_err(CmdPublisherError::SerializationError)?;

        self.socket
            .send(&msg, 0)
            .map_err(CmdPublisherError::SendError)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_without_turtle() {
        // Nothing is bound to the command endpoint
        let params = NetParams {
            pose_endpoint: "tcp://localhost:59120".into(),
            cmd_vel_endpoint: "tcp://localhost:59121".into(),
            pose_bind_endpoint: "tcp://*:59120".into(),
            cmd_vel_bind_endpoint: "tcp://*:59121".into(),
        };
        let ctx = zmq::Context::new();

        let mut publisher = CmdPublisher::new(&ctx, &params).unwrap();
        assert!(!publisher.is_connected());

        // Commands are dropped rather than failing
        publisher.send_cmd(VelCmd::stop()).unwrap();
    }
}
