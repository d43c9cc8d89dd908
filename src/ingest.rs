//! Chunked asset ingestion.
//!
//! An [`Upload`] receives an asset in pieces, e.g. from a serial link or an
//! HTTP body. The caller declares the total transport length up front, pushes
//! chunks as they arrive and calls [`Upload::finish`] once everything is in.
//! Nothing observable changes until `finish` succeeds: a failed or abandoned
//! transfer leaves the live asset and the running playback untouched.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{debug, warn};

use crate::decoder::{BackendMode, DecoderError, probe};
use crate::format::{LoadError, Transport};

/// Errors raised while receiving an asset.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Upload must declare a non-zero length")]
    LengthRequired,
    #[error("Asset of {size} bytes exceeds the {limit} byte memory limit")]
    Capacity { size: usize, limit: usize },
    #[error("Received more than the declared {declared} bytes")]
    Overrun { declared: usize },
    #[error("Chunk of {len} bytes exceeds the {limit} byte chunk size")]
    ChunkTooLarge { len: usize, limit: usize },
    #[error("Upload incomplete: received {received} of {declared} bytes")]
    Incomplete { received: usize, declared: usize },
    #[error("Upload targets the {upload:?} backend but {active:?} is active")]
    BackendChanged {
        upload: BackendMode,
        active: BackendMode,
    },
    #[error("Malformed base64 payload: {0}")]
    Transport(#[from] base64::DecodeError),
    #[error("Staging I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Staged asset rejected: {0}")]
    Load(#[from] LoadError),
    #[error("Failed to commit upload: {0}")]
    Decoder(#[from] DecoderError),
}

/// Where a finished upload landed.
#[derive(Debug, PartialEq, Eq)]
pub enum Staged {
    /// Validated asset now persisted at the live path.
    File(PathBuf),
    /// Unwrapped asset bytes, ready for the memory backend.
    Memory(Vec<u8>),
}

#[derive(Debug)]
enum Target {
    File {
        writer: BufWriter<File>,
        staging: PathBuf,
        live: PathBuf,
    },
    Memory {
        buffer: Vec<u8>,
        limit: usize,
    },
}

/// An asset transfer in progress.
///
/// Dropping an unfinished file upload removes its staging file, so an
/// error propagated with `?` mid-transfer leaves nothing behind.
#[derive(Debug)]
pub struct Upload {
    /// Taken by [`Upload::finish`]; `None` only once the upload is done.
    target: Option<Target>,
    transport: Transport,
    declared: usize,
    received: usize,
    max_chunk: Option<usize>,
    /// Base64 characters not yet forming a whole 4-byte group.
    pending: Vec<u8>,
}

impl Upload {
    /// Stage an upload in `staging`, to be renamed onto `live` once it has
    /// been received and validated.
    pub fn to_file(
        staging: &Path,
        live: &Path,
        declared: usize,
        transport: Transport,
    ) -> Result<Self, IngestError> {
        if declared == 0 {
            return Err(IngestError::LengthRequired);
        }
        let writer = BufWriter::new(File::create(staging)?);
        debug!(
            "Staging {} byte upload in {}",
            declared,
            staging.display()
        );
        Ok(Self::new(
            Target::File {
                writer,
                staging: staging.to_path_buf(),
                live: live.to_path_buf(),
            },
            declared,
            transport,
        ))
    }

    /// Buffer an upload in RAM for the memory backend.
    ///
    /// A raw upload declaring more than `limit` bytes fails with
    /// [`IngestError::Capacity`] before accepting any chunk. Base64 may
    /// carry line breaks that count toward the declared length but decode
    /// to nothing, so its ceiling is enforced on the decoded bytes as they
    /// arrive.
    pub fn to_memory(
        limit: usize,
        declared: usize,
        transport: Transport,
    ) -> Result<Self, IngestError> {
        if declared == 0 {
            return Err(IngestError::LengthRequired);
        }
        if transport == Transport::Raw && declared > limit {
            return Err(IngestError::Capacity {
                size: declared,
                limit,
            });
        }
        debug!("Buffering {} byte upload in memory", declared);
        Ok(Self::new(
            Target::Memory {
                buffer: Vec::with_capacity(transport.decoded_len_estimate(declared).min(limit)),
                limit,
            },
            declared,
            transport,
        ))
    }

    fn new(target: Target, declared: usize, transport: Transport) -> Self {
        Self {
            target: Some(target),
            transport,
            declared,
            received: 0,
            max_chunk: None,
            pending: Vec::new(),
        }
    }

    /// Reject chunks longer than `limit` transport bytes.
    pub fn with_chunk_limit(mut self, limit: usize) -> Self {
        self.max_chunk = Some(limit);
        self
    }

    /// Backend the finished upload is meant for.
    pub fn backend_mode(&self) -> BackendMode {
        match self.target {
            Some(Target::Memory { .. }) => BackendMode::Memory,
            _ => BackendMode::File,
        }
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn declared(&self) -> usize {
        self.declared
    }

    pub fn received(&self) -> usize {
        self.received
    }

    /// Transport bytes still expected.
    pub fn remaining(&self) -> usize {
        self.declared - self.received
    }

    /// Accept the next chunk of transport bytes.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), IngestError> {
        if let Some(limit) = self.max_chunk
            && chunk.len() > limit
        {
            return Err(IngestError::ChunkTooLarge {
                len: chunk.len(),
                limit,
            });
        }
        let received = self.received + chunk.len();
        if received > self.declared {
            return Err(IngestError::Overrun {
                declared: self.declared,
            });
        }
        self.received = received;

        match self.transport {
            Transport::Raw => self.write(chunk),
            Transport::Base64 => {
                self.pending
                    .extend(chunk.iter().copied().filter(|b| !b.is_ascii_whitespace()));
                let whole = self.pending.len() / 4 * 4;
                if whole == 0 {
                    return Ok(());
                }
                let decoded = STANDARD.decode(&self.pending[..whole])?;
                self.pending.drain(..whole);
                self.write(&decoded)
            }
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), IngestError> {
        match &mut self.target {
            Some(Target::File { writer, .. }) => writer.write_all(bytes)?,
            Some(Target::Memory { buffer, limit }) => {
                let size = buffer.len() + bytes.len();
                if size > *limit {
                    return Err(IngestError::Capacity {
                        size,
                        limit: *limit,
                    });
                }
                buffer.extend_from_slice(bytes);
            }
            None => return Err(finished().into()),
        }
        Ok(())
    }

    /// Complete the transfer.
    ///
    /// For a file upload the staged asset is synced, validated and renamed
    /// onto the live path; on any failure the staging file is removed and the
    /// live path is left as it was.
    pub fn finish(mut self) -> Result<Staged, IngestError> {
        if self.received < self.declared {
            return Err(IngestError::Incomplete {
                received: self.received,
                declared: self.declared,
            });
        }
        if !self.pending.is_empty() {
            let tail = std::mem::take(&mut self.pending);
            let decoded = STANDARD.decode(&tail)?;
            self.write(&decoded)?;
        }

        match self.target.take() {
            Some(Target::Memory { buffer, .. }) => {
                debug!("Upload of {} bytes buffered", buffer.len());
                Ok(Staged::Memory(buffer))
            }
            Some(Target::File {
                writer,
                staging,
                live,
            }) => match commit_file(writer, &staging, &live) {
                Ok(()) => {
                    debug!("Upload committed to {}", live.display());
                    Ok(Staged::File(live))
                }
                Err(e) => {
                    remove_staging(&staging);
                    Err(e)
                }
            },
            None => Err(finished().into()),
        }
    }

    /// Abandon the transfer, discarding anything staged.
    pub fn abort(mut self) {
        self.discard();
    }

    fn discard(&mut self) {
        if let Some(Target::File { writer, staging, .. }) = self.target.take() {
            drop(writer);
            remove_staging(&staging);
        }
    }
}

impl Drop for Upload {
    fn drop(&mut self) {
        self.discard();
    }
}

fn finished() -> io::Error {
    io::Error::other("upload already finished")
}

fn commit_file(writer: BufWriter<File>, staging: &Path, live: &Path) -> Result<(), IngestError> {
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);

    let header = probe(staging)?;
    debug!(
        "Staged asset ok: {}x{}, {} frames",
        header.width, header.height, header.frame_count
    );
    fs::rename(staging, live)?;
    Ok(())
}

fn remove_staging(staging: &Path) {
    if let Err(e) = fs::remove_file(staging)
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!("Failed to remove {}: {}", staging.display(), e);
    }
}
