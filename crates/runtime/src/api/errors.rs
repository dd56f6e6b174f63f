//! Error types surfaced by the runtime API.
use thiserror::Error;
use tokio::sync::oneshot;

use defense::ConfigError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid defense configuration")]
    InvalidConfig(#[from] ConfigError),

    #[error("{0} must be positive")]
    NonPositive(&'static str),

    #[error("defense worker command channel closed")]
    CommandChannelClosed,

    #[error("defense worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}
