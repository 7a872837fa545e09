use derive_more::From;

/// Result type for this crate
pub type Result<A> = core::result::Result<A, Error>;

/// Error type for this crate
#[derive(Debug, Clone, From)]
pub enum Error {
    /// The kernel's fatal condition, surfaced through the driver.
    Fsm(tablefsm::Error),
    /// An output channel or adapter has gone away.
    ChannelClosed,
}

#[cfg(feature = "tokio")]
mod adapt_tokio {
    use super::Error;
    use tokio::sync::mpsc::error::SendError;

    impl<E> From<SendError<E>> for Error {
        fn from(_: SendError<E>) -> Self {
            Error::ChannelClosed
        }
    }
}
