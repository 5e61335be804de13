//! Text file source with whitespace-delimited tokens
//!
//! Each token is converted with [`FromStr`]. After every read the source
//! skips ahead over whitespace so [`Source::has_next`] can answer without
//! touching the stream.

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use datasource_core::{Error, Result, Source};

/// Options for file sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSourceOptions {
    /// Capacity of the read buffer in bytes
    pub buffer_size: usize,
}

impl Default for FileSourceOptions {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024, // 64KB
        }
    }
}

/// Read position of the underlying stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    /// Positioned at the start of a token
    Ready,

    /// No tokens left before end of input
    Exhausted,

    /// A read or parse failed; cleared only by a reset
    Failed,
}

/// Source that parses values from a whitespace-separated text file
pub struct FileSource<T> {
    /// Path the handle was opened from, kept for re-opening on clone
    path: PathBuf,

    /// Buffered read handle owned by this source
    reader: BufReader<File>,

    /// Options the source was opened with
    options: FileSourceOptions,

    /// Current stream state
    state: StreamState,

    _marker: PhantomData<fn() -> T>,
}

impl<T> FileSource<T> {
    /// Open a file source with default options
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, FileSourceOptions::default())
    }

    /// Open a file source with the given options
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: FileSourceOptions) -> Result<Self> {
        if options.buffer_size == 0 {
            return Err(Error::InvalidArgument("Buffer size must be non-zero".into()));
        }

        let path = path.as_ref().to_path_buf();
        let file = open_handle(&path)?;
        let mut source = Self {
            reader: BufReader::with_capacity(options.buffer_size, file),
            path,
            options,
            state: StreamState::Ready,
            _marker: PhantomData,
        };
        source.advance();

        debug!(path = %source.path.display(), "Opened file source");
        Ok(source)
    }

    /// Open an independent copy positioned at the start of the same file
    pub fn try_clone(&self) -> Result<Self> {
        trace!(path = %self.path.display(), "Cloning file source");
        Self::open_with_options(&self.path, self.options.clone())
    }

    /// Replace this source with a fresh handle on `other`'s path
    ///
    /// The path is probed first. If it cannot be opened the receiver keeps
    /// its path, handle and position, and `false` is returned.
    pub fn assign_from(&mut self, other: &Self) -> bool {
        let file = match open_handle(&other.path) {
            Ok(file) => file,
            Err(e) => {
                warn!(
                    path = %other.path.display(),
                    error = %e,
                    "Unable to open file for assignment, source left unchanged"
                );
                return false;
            }
        };

        self.path = other.path.clone();
        self.options = other.options.clone();
        self.reader = BufReader::with_capacity(self.options.buffer_size, file);
        self.state = StreamState::Ready;
        self.advance();
        true
    }

    /// Get the path to the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the options this source was opened with
    pub fn options(&self) -> &FileSourceOptions {
        &self.options
    }

    /// Whether an earlier read left the stream in a failed state
    pub fn is_failed(&self) -> bool {
        self.state == StreamState::Failed
    }

    /// Skip whitespace and record whether another token follows
    fn advance(&mut self) {
        self.state = match skip_whitespace(&mut self.reader) {
            Ok(true) => StreamState::Ready,
            Ok(false) => StreamState::Exhausted,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Read failed");
                StreamState::Failed
            }
        };
    }
}

impl<T> FileSource<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn read_value(&mut self) -> Result<T> {
        let token = match read_token(&mut self.reader) {
            Ok(token) => token,
            Err(e) => {
                self.state = StreamState::Failed;
                return Err(Error::Io(e));
            }
        };

        match parse_token(&token) {
            Ok(value) => {
                self.advance();
                Ok(value)
            }
            Err(e) => {
                self.state = StreamState::Failed;
                Err(e)
            }
        }
    }
}

impl<T> std::fmt::Debug for FileSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource")
            .field("path", &self.path)
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<T> Source<T> for FileSource<T>
where
    T: FromStr + 'static,
    T::Err: Display,
{
    fn next(&mut self) -> Result<T> {
        match self.state {
            StreamState::Ready => self.read_value(),
            StreamState::Exhausted => Err(Error::EndOfStream),
            StreamState::Failed => Err(Error::StreamFailed),
        }
    }

    fn next_batch(&mut self, count: usize) -> Result<Vec<T>> {
        if self.state == StreamState::Failed {
            return Err(Error::StreamFailed);
        }

        let mut values = Vec::new();
        while values.len() < count && self.has_next() {
            values.push(self.read_value()?);
        }
        Ok(values)
    }

    fn has_next(&self) -> bool {
        self.state == StreamState::Ready
    }

    fn reset(&mut self) -> bool {
        if let Err(e) = self.reader.seek(SeekFrom::Start(0)) {
            warn!(path = %self.path.display(), error = %e, "Seek to start failed");
            return false;
        }

        self.advance();
        debug!(path = %self.path.display(), state = ?self.state, "Reset file source");
        true
    }

    fn try_clone_box(&self) -> Result<Box<dyn Source<T>>> {
        Ok(Box::new(self.try_clone()?))
    }
}

fn open_handle(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::CannotOpen {
        path: path.to_path_buf(),
        source,
    })
}

/// Consume leading whitespace, returning whether any input remains
fn skip_whitespace<R: BufRead>(reader: &mut R) -> io::Result<bool> {
    loop {
        let (skipped, available) = {
            let buf = reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(false);
            }
            let skipped = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
            (skipped, buf.len())
        };

        reader.consume(skipped);
        if skipped < available {
            return Ok(true);
        }
    }
}

/// Consume bytes up to the next whitespace or end of input
fn read_token<R: BufRead>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut token = Vec::new();
    loop {
        let (used, at_boundary) = {
            let buf = reader.fill_buf()?;
            if buf.is_empty() {
                break;
            }
            let used = buf.iter().take_while(|b| !b.is_ascii_whitespace()).count();
            token.extend_from_slice(&buf[..used]);
            (used, used < buf.len())
        };

        reader.consume(used);
        if at_boundary {
            break;
        }
    }
    Ok(token)
}

fn parse_token<T>(token: &[u8]) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let text = std::str::from_utf8(token).map_err(|e| Error::ParseFailure {
        token: String::from_utf8_lossy(token).into_owned(),
        reason: e.to_string(),
    })?;

    text.parse().map_err(|e: T::Err| Error::ParseFailure {
        token: text.to_string(),
        reason: e.to_string(),
    })
}
