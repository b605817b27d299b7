//! Single file copy operations.
//!
//! A file task opens the source, reads its permission bits, creates or
//! truncates the destination with the same bits and streams the contents in
//! fixed-size chunks. Nothing is rolled back on failure: whatever was written
//! stays in place.

use crate::error::{Error, FsOp, Result};
use crate::task::{CopyTask, EntryMetadata};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use super::Engine;
use super::utils::{open_destination, set_file_mode};

/// Size of the chunk read from the source before it is written out.
pub const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Copy one regular file. Returns the number of bytes written.
///
/// Both handles are dropped (closed) on every return path.
pub(crate) fn copy_file(engine: &Engine<'_>, task: &CopyTask) -> Result<u64> {
    let src = task.src();
    let dst = task.dst();

    let mut src_file = engine.retry(FsOp::OpenSource, src, || File::open(src))?;
    let src_meta = engine.retry(FsOp::Inspect, src, || src_file.metadata())?;
    let mode = EntryMetadata::from(&src_meta).mode;

    let mut dst_file =
        engine.retry(FsOp::CreateDestination, dst, || open_destination(dst, mode))?;

    let bytes = copy_contents(&mut src_file, &mut dst_file, src, dst)?;

    // After the data: writing clears setuid/setgid on most kernels
    set_file_mode(&dst_file, mode).map_err(|e| Error::io(FsOp::SetPermissions, dst, e))?;

    tracing::trace!(src = %src.display(), bytes, "copied file");
    Ok(bytes)
}

/// Stream `reader` into `writer` until a zero-byte read.
///
/// Each chunk is written in full, looping over partial writes. Interrupted
/// calls are reissued. `src` and `dst` only label errors.
pub(crate) fn copy_contents<R, W>(
    reader: &mut R,
    writer: &mut W,
    src: &Path,
    dst: &Path,
) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io(FsOp::Read, src, e)),
        };

        let mut off = 0;
        while off < n {
            match writer.write(&buf[off..n]) {
                Ok(0) => {
                    return Err(Error::io(
                        FsOp::Write,
                        dst,
                        io::Error::from(io::ErrorKind::WriteZero),
                    ));
                }
                Ok(w) => off += w,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::io(FsOp::Write, dst, e)),
            }
        }
        total += n as u64;
    }
}

// =============================================================================
// Tests
// =============================================================================
