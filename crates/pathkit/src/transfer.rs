use std::io::{self, Read, Write};

use pathkit_base::{ErrorKind, PathkitError, PathkitResult, TransferStage};
use tracing::{debug, instrument, trace};

/* 📖 # Why not std::io::copy?

io::copy loops on partial writes until the whole chunk is stored. Here a short
write is fatal: the caller must learn exactly how many bytes reached the
destination, and a destination that accepts less than offered is treated as
broken rather than retried. The loop also reports which stage failed and the
byte count at that moment.
*/

/// Reject a zero-sized buffer before any stream is touched.
pub fn validate_buffer_size(buffer_size: usize) -> PathkitResult<()> {
    if buffer_size == 0 {
        debug!("rejecting zero buffer size");
        return Err(Box::new(PathkitError::new(ErrorKind::InvalidBufferSize {
            size: buffer_size,
        })));
    }
    Ok(())
}

/// Move every byte from `reader` to `writer` through one buffer of
/// `buffer_size` bytes, then flush `writer`.
///
/// Returns the number of bytes written. Each chunk is handed to a single
/// `write` call; if the writer accepts fewer bytes than offered the transfer
/// stops with [`ErrorKind::ShortWrite`]. Read, write and flush failures stop
/// it with [`ErrorKind::Transfer`]. Either way
/// [`PathkitError::bytes_copied`] reports the bytes fully written before the
/// failure. `Interrupted` reads and writes are retried.
#[instrument(skip(reader, writer))]
pub fn buffered_copy<R, W>(reader: &mut R, writer: &mut W, buffer_size: usize) -> PathkitResult<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    validate_buffer_size(buffer_size)?;

    let mut buffer = vec![0u8; buffer_size];
    let mut copied: u64 = 0;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(error = %e, copied, "read failed");
                return Err(transfer_error(TransferStage::Read, copied, e));
            }
        };
        if read == 0 {
            writer.flush().map_err(|e| {
                debug!(error = %e, copied, "flush failed");
                transfer_error(TransferStage::Flush, copied, e)
            })?;
            debug!(copied, "transfer complete");
            return Ok(copied);
        }

        let written = loop {
            match writer.write(&buffer[..read]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!(error = %e, copied, "write failed");
                    return Err(transfer_error(TransferStage::Write, copied, e));
                }
            }
        };
        if written != read {
            debug!(copied, offered = read, accepted = written, "short write");
            return Err(Box::new(PathkitError::new(ErrorKind::ShortWrite {
                copied,
                offered: read,
                accepted: written,
            })));
        }
        copied += written as u64;
        trace!(chunk = written, copied, "chunk transferred");
    }
}

fn transfer_error(stage: TransferStage, copied: u64, source: io::Error) -> Box<PathkitError> {
    Box::new(PathkitError::new(ErrorKind::Transfer {
        stage,
        copied,
        source,
    }))
}
