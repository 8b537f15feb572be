//! Streaming reader for newline-delimited file lists.

use crate::error::ScanError;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Read size used when none is given
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Yields one path per non-empty line of a list.
///
/// Input is consumed in fixed-size chunks; a line may span any number of
/// chunks. `\n` and `\r` both end a line, blank lines are skipped, and a last
/// line without a terminator is still returned.
pub struct ListReader<R> {
    reader: R,
    source: PathBuf,
    chunk: Vec<u8>,
    pending: Vec<u8>,
    line: usize,
    prev_cr: bool,
    eof: bool,
    failed: bool,
}

impl ListReader<File> {
    /// Open a list file on disk
    pub fn open(path: &Path) -> Result<Self, ScanError> {
        let file = File::open(path).map_err(|source| ScanError::ReadList {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file, path.to_path_buf()))
    }
}

impl<R: Read> ListReader<R> {
    /// Wrap any reader; `source` names it in errors
    pub fn new(reader: R, source: PathBuf) -> Self {
        Self {
            reader,
            source,
            chunk: vec![0; DEFAULT_CHUNK_SIZE],
            pending: Vec::new(),
            line: 0,
            prev_cr: false,
            eof: false,
            failed: false,
        }
    }

    /// Override the read size (minimum 1 byte)
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk = vec![0; size.max(1)];
        self
    }

    fn decode(&mut self, bytes: Vec<u8>) -> Result<PathBuf, ScanError> {
        String::from_utf8(bytes).map(PathBuf::from).map_err(|_| {
            self.failed = true;
            ScanError::InvalidListEntry {
                path: self.source.clone(),
                line: self.line,
            }
        })
    }
}

impl<R: Read> Iterator for ListReader<R> {
    type Item = Result<PathBuf, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }

            if let Some(end) = self
                .pending
                .iter()
                .position(|&b| b == b'\n' || b == b'\r')
            {
                let terminator = self.pending[end];
                let mut line: Vec<u8> = self.pending.drain(..=end).collect();
                line.pop();

                // The "\n" of a "\r\n" pair doesn't start a new line
                if !(terminator == b'\n' && self.prev_cr && line.is_empty()) {
                    self.line += 1;
                }
                self.prev_cr = terminator == b'\r';

                if line.is_empty() {
                    continue;
                }
                return Some(self.decode(line));
            }

            if self.eof {
                if self.pending.is_empty() {
                    return None;
                }
                self.line += 1;
                let line = std::mem::take(&mut self.pending);
                return Some(self.decode(line));
            }

            match self.reader.read(&mut self.chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.pending.extend_from_slice(&self.chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(source) => {
                    self.failed = true;
                    return Some(Err(ScanError::ReadList {
                        path: self.source.clone(),
                        source,
                    }));
                }
            }
        }
    }
}
