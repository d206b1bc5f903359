//! Channel abstraction
//!
//! The session manager talks to the console through the [`SerialLink`] and
//! [`ChannelOpener`] seams so that tests (and alternative transports such as
//! serial-over-TCP device servers) can substitute the physical port.

use std::future::Future;
use std::pin::Pin;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_serial::{DataBits, FlowControl, Parity, SerialStream, StopBits};

use super::ProtocolError;

/// A bidirectional byte channel to the console
pub trait SerialLink: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> SerialLink for T {}

/// Future returned by [`ChannelOpener::open`]
pub type OpenFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Box<dyn SerialLink>, ProtocolError>> + Send + 'a>>;

/// Opens the physical channel for one transaction
pub trait ChannelOpener: Send + Sync {
    /// Open a channel to the console at the given port and baud rate
    fn open<'a>(&'a self, port_name: &'a str, baud_rate: u32) -> OpenFuture<'a>;
}

/// Default opener backed by a real serial port
pub struct SerialOpener;

impl ChannelOpener for SerialOpener {
    fn open<'a>(&'a self, port_name: &'a str, baud_rate: u32) -> OpenFuture<'a> {
        Box::pin(async move {
            // Standard 8N1 configuration, no flow control
            let builder = tokio_serial::new(port_name, baud_rate)
                .data_bits(DataBits::Eight)
                .parity(Parity::None)
                .stop_bits(StopBits::One)
                .flow_control(FlowControl::None);

            let stream =
                SerialStream::open(&builder).map_err(|e| ProtocolError::ConnectionFailed {
                    port: port_name.to_string(),
                    message: e.to_string(),
                })?;

            #[cfg(unix)]
            let stream = {
                let mut stream = stream;
                if let Err(e) = stream.set_exclusive(false) {
                    tracing::warn!("failed to clear exclusive mode on {}: {}", port_name, e);
                }
                stream
            };

            Ok(Box::new(stream) as Box<dyn SerialLink>)
        })
    }
}
