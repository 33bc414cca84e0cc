// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::{
    fs::File,
    io::{Read, Seek, SeekFrom, Write},
    sync::Mutex,
};

/// Buffer size used for a channel opened [`BufferedChannel::for_writing`].
pub const WRITE_BUFFER_SIZE: usize = 64 * 1_024;

/// Buffer size used for a channel opened [`BufferedChannel::for_reading`].
pub const READ_BUFFER_SIZE: usize = 8 * 1_024;

struct ChannelState {
    file: File,
    /// Bytes appended since the last flush, not yet written to `file`.
    write_buffer: Vec<u8>,
    /// File offset the next byte in `write_buffer` will land at once flushed.
    buffer_start: u64,
}

/// A write-behind wrapper around a segment [`File`].
///
/// Writes land in an in-memory buffer first; [`BufferedChannel::flush`] is
/// what actually moves them to disk. Reads transparently serve bytes that are
/// still sitting in the write buffer, so a reader never observes a gap
/// between "written" and "flushed" - this is the one thing a plain
/// `BufWriter`/`BufReader` pair cannot do, because they don't share state.
pub struct BufferedChannel {
    state: Mutex<ChannelState>,
    buffer_capacity: usize,
}

impl BufferedChannel {
    /// Wraps `file` for writing, with a buffer sized for append workloads.
    #[must_use]
    pub fn for_writing(file: File, position: u64) -> Self {
        Self::with_capacity(file, position, WRITE_BUFFER_SIZE)
    }

    /// Wraps `file` for reading, with a buffer sized for occasional flushes
    /// (readers normally don't write, but the writer reopens its own segment
    /// through this same type).
    #[must_use]
    pub fn for_reading(file: File, position: u64) -> Self {
        Self::with_capacity(file, position, READ_BUFFER_SIZE)
    }

    fn with_capacity(file: File, position: u64, buffer_capacity: usize) -> Self {
        Self {
            state: Mutex::new(ChannelState {
                file,
                write_buffer: Vec::with_capacity(buffer_capacity),
                buffer_start: position,
            }),
            buffer_capacity,
        }
    }

    /// Appends `bytes` to the channel, returning the offset the first byte
    /// landed at. Buffers in memory; call [`Self::flush`] to persist.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an I/O error occurs while flushing a full buffer.
    pub fn write(&self, bytes: &[u8]) -> std::io::Result<u64> {
        let mut state = self.state.lock().expect("lock is poisoned");
        let offset = state.buffer_start + state.write_buffer.len() as u64;

        state.write_buffer.extend_from_slice(bytes);

        if state.write_buffer.len() >= self.buffer_capacity {
            Self::flush_locked(&mut state)?;
        }

        Ok(offset)
    }

    /// Current logical end of the channel (flushed bytes plus buffered bytes).
    #[must_use]
    pub fn position(&self) -> u64 {
        let state = self.state.lock().expect("lock is poisoned");
        state.buffer_start + state.write_buffer.len() as u64
    }

    /// Reads `len` bytes starting at `offset`, transparently stitching
    /// together the on-disk portion and whatever is still in the write
    /// buffer.
    ///
    /// # Errors
    ///
    /// Will return `Err` if `offset + len` is past the end of the channel,
    /// or if an I/O error occurs.
    pub fn read(&self, offset: u64, len: usize) -> std::io::Result<Vec<u8>> {
        let mut state = self.state.lock().expect("lock is poisoned");
        let end = offset
            .checked_add(len as u64)
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "read overflow"))?;
        let logical_end = state.buffer_start + state.write_buffer.len() as u64;

        if end > logical_end {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("read of [{offset}, {end}) past channel end {logical_end}"),
            ));
        }

        let mut out = vec![0u8; len];

        if offset < state.buffer_start {
            // Entirely or partially on disk.
            let disk_len = (state.buffer_start - offset).min(len as u64) as usize;
            state.file.seek(SeekFrom::Start(offset))?;
            #[allow(clippy::indexing_slicing)]
            state.file.read_exact(&mut out[..disk_len])?;

            if disk_len < len {
                #[allow(clippy::indexing_slicing)]
                out[disk_len..].copy_from_slice(&state.write_buffer[..len - disk_len]);
            }
        } else {
            // Entirely within the write buffer.
            let start = (offset - state.buffer_start) as usize;
            #[allow(clippy::indexing_slicing)]
            out.copy_from_slice(&state.write_buffer[start..start + len]);
        }

        Ok(out)
    }

    /// Flushes the write buffer to disk. When `durable` is set, also issues
    /// `sync_data` so the bytes survive a crash, not just a process restart.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an I/O error occurs.
    pub fn flush(&self, durable: bool) -> std::io::Result<()> {
        let mut state = self.state.lock().expect("lock is poisoned");
        Self::flush_locked(&mut state)?;

        if durable {
            state.file.sync_data()?;
        }

        Ok(())
    }

    fn flush_locked(state: &mut ChannelState) -> std::io::Result<()> {
        if state.write_buffer.is_empty() {
            return Ok(());
        }

        state.file.seek(SeekFrom::Start(state.buffer_start))?;
        state.file.write_all(&state.write_buffer)?;
        state.buffer_start += state.write_buffer.len() as u64;
        state.write_buffer.clear();

        Ok(())
    }
}
