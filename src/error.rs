use crate::dataplane::{AttachmentPoint, NodeId};
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    #[error("node {node} rejected flow rule: {reason}")]
    RuleRejected { node: NodeId, reason: String },

    #[error("transmit on {point} failed: {reason}")]
    Transmit {
        point: AttachmentPoint,
        reason: String,
    },

    #[error("node {0} not found")]
    UnknownNode(NodeId),
}

pub type Result<T> = std::result::Result<T, Error>;
