//! HTTP agents for the feedback workers and bounded response helpers.
//!
//! The haptic actuator sits on a local network and may stop answering at any
//! time, so every phase of an actuator request is bounded by one short
//! timeout. Speech synthesis runs on its own worker and gets a roomier agent.
//! Nothing here retries.

use std::io::{self, Read};
use std::sync::OnceLock;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(15);
const WRITE_TIMEOUT: Duration = Duration::from_secs(15);

/// Upper bound on an actuator request, from connect to the last body byte.
pub const DEFAULT_ACTUATOR_TIMEOUT: Duration = Duration::from_millis(500);

/// Actuator replies are tiny acknowledgements; anything past this is ignored.
const MAX_ACK_BYTES: u64 = 4 * 1024;

/// Shared agent for speech synthesis requests.
pub(crate) fn agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .timeout_write(WRITE_TIMEOUT)
            .build()
    })
}

/// Build an agent whose connect, read and write phases share one timeout.
pub(crate) fn actuator_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout_read(timeout)
        .timeout_write(timeout)
        .timeout(timeout)
        .build()
}

/// Read and drop an acknowledgement body so the keep-alive connection is reusable.
///
/// Returns the number of bytes consumed, never more than the acknowledgement cap.
pub(crate) fn drain_ack(response: ureq::Response) -> Result<u64, io::Error> {
    let mut limited = response.into_reader().take(MAX_ACK_BYTES);
    io::copy(&mut limited, &mut io::sink())
}

/// Read a response into memory, enforcing a maximum byte size.
pub(crate) fn read_response_bytes(
    response: ureq::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, io::Error> {
    if let Some(length) = response
        .header("Content-Length")
        .and_then(|value| value.parse::<u64>().ok())
        && length > max_bytes as u64
    {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response too large: {length} bytes"),
        ));
    }
    let mut limited = response.into_reader().take(max_bytes as u64 + 1);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response exceeded {max_bytes} bytes"),
        ));
    }
    Ok(bytes)
}
