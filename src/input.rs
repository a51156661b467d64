//! Raw keyboard input.
//!
//! This module turns terminal bytes into symbolic [`Key`]s. Arrow keys
//! reach us in one of two encodings: ANSI escape sequences (`ESC [ A`)
//! or a prefix byte followed by a scan code (`0xE0 H`), as sent by
//! consoles that report extended keys that way. The encoding is chosen
//! once at startup and callers only ever see the decoded key.
//!
//! Standard input is owned by a reader thread that hands chunks over a
//! channel. The menu side waits on that channel with a timeout, so a
//! SIGINT flag is noticed while a read is still blocked. When a chunk ends
//! in ESC the reader waits briefly for the rest of the sequence, since a
//! slow link can split `ESC [ A` across reads. Anything arriving later
//! than that is decoded as a lone Escape followed by plain characters.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use termion::raw::IntoRawMode;
use tracing::{debug, trace};

use crate::error::InputError;

const ESC: u8 = 0x1b;
const CTRL_C: u8 = 0x03;

/// Enough for any key sequence plus some type-ahead.
const CHUNK_SIZE: usize = 64;

/// How often a blocked read checks the interrupt flag.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to wait for the rest of an escape sequence.
const ESCAPE_GRACE: Duration = Duration::from_millis(30);

/// A decoded keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Enter or Return.
    Confirm,
    /// A lone Escape.
    Cancel,
    /// Ctrl-C while raw mode has signals turned off.
    Interrupt,
    Char(char),
    Unknown,
}

/// How the terminal encodes arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Encoding {
    /// `ESC [ A` style sequences (also accepts `ESC O A`).
    Ansi,
    /// A `0x00`/`0xE0` prefix byte followed by a scan code.
    Prefixed,
}

impl Encoding {
    /// The encoding the host console uses by default.
    pub fn native() -> Self {
        if cfg!(windows) {
            Encoding::Prefixed
        } else {
            Encoding::Ansi
        }
    }
}

/// Decodes keys from any byte source.
///
/// Bytes are pulled with one `read()` at a time into a pending queue.
/// A terminal delivers an escape sequence in a single read, so an ESC
/// with nothing queued behind it is the Escape key itself.
///
/// A source read that fails with `ErrorKind::Interrupted` is retried,
/// unless the interrupt flag is set; then it ends as
/// [`InputError::Interrupted`].
pub struct KeyDecoder<R> {
    source: R,
    pending: VecDeque<u8>,
    encoding: Encoding,
    interrupted: Arc<AtomicBool>,
}

impl<R: Read> KeyDecoder<R> {
    pub fn new(source: R, encoding: Encoding) -> Self {
        KeyDecoder {
            source,
            pending: VecDeque::new(),
            encoding,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shares the flag a SIGINT handler sets.
    pub fn interruptible(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = interrupted;
        self
    }

    /// Clears the interrupt flag, returning whether it was set.
    pub fn take_interrupt(&self) -> bool {
        self.interrupted.swap(false, Ordering::SeqCst)
    }

    /// Blocks until one complete key is available.
    pub fn next_key(&mut self) -> Result<Key, InputError> {
        let byte = self.next_byte()?;
        let key = match byte {
            ESC => self.decode_escape()?,
            b'\r' | b'\n' => Key::Confirm,
            CTRL_C => Key::Interrupt,
            0x00 | 0xe0 if self.encoding == Encoding::Prefixed => self.decode_prefixed()?,
            b' '..=b'~' => Key::Char(char::from(byte)),
            0x80..=0xff => self.decode_utf8(byte),
            _ => Key::Unknown,
        };
        trace!(?key, "decoded key");
        Ok(key)
    }

    /// Removes queued bytes up to the first line terminator.
    ///
    /// Returns the bytes before the terminator and whether one was found.
    /// Without a terminator the whole queue is drained.
    pub fn take_buffered_line(&mut self) -> (Vec<u8>, bool) {
        let mut line = Vec::new();
        while let Some(byte) = self.pending.pop_front() {
            match byte {
                b'\r' => {
                    if self.pending.front() == Some(&b'\n') {
                        self.pending.pop_front();
                    }
                    return (line, true);
                }
                b'\n' => return (line, true),
                _ => line.push(byte),
            }
        }
        (line, false)
    }

    /// Reads up to the next line terminator, which is dropped.
    ///
    /// `None` only when input ended before any byte of the line.
    pub fn read_line(&mut self) -> Result<Option<Vec<u8>>, InputError> {
        let mut line = Vec::new();
        loop {
            let (part, complete) = self.take_buffered_line();
            line.extend(part);
            if complete {
                return Ok(Some(line));
            }
            match self.fill() {
                Ok(()) => {}
                Err(InputError::Eof) if line.is_empty() => return Ok(None),
                Err(InputError::Eof) => return Ok(Some(line)),
                Err(err) => return Err(err),
            }
        }
    }

    fn fill(&mut self) -> Result<(), InputError> {
        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            match self.source.read(&mut chunk) {
                Ok(0) => return Err(InputError::Eof),
                Ok(n) => {
                    self.pending.extend(&chunk[..n]);
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    if self.take_interrupt() {
                        return Err(InputError::Interrupted);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn next_byte(&mut self) -> Result<u8, InputError> {
        if self.pending.is_empty() {
            self.fill()?;
        }
        self.pending.pop_front().ok_or(InputError::Eof)
    }

    fn decode_escape(&mut self) -> Result<Key, InputError> {
        match self.pending.front() {
            Some(b'[') | Some(b'O') => {
                self.pending.pop_front();
            }
            _ => return Ok(Key::Cancel),
        }

        loop {
            let byte = self.next_byte()?;
            match byte {
                b'A' => return Ok(Key::Up),
                b'B' => return Ok(Key::Down),
                b'C' => return Ok(Key::Right),
                b'D' => return Ok(Key::Left),
                // Final byte of some other sequence (Home, F1, Delete...)
                0x40..=0x7e => return Ok(Key::Unknown),
                // Parameter and intermediate bytes
                0x20..=0x3f => continue,
                _ => {
                    // Malformed; leave the byte for the next read.
                    self.pending.push_front(byte);
                    return Ok(Key::Unknown);
                }
            }
        }
    }

    fn decode_prefixed(&mut self) -> Result<Key, InputError> {
        let key = match self.next_byte()? {
            b'H' => Key::Up,
            b'P' => Key::Down,
            b'K' => Key::Left,
            b'M' => Key::Right,
            _ => Key::Unknown,
        };
        Ok(key)
    }

    fn decode_utf8(&mut self, lead: u8) -> Key {
        let width = match lead {
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => 1,
        };
        let mut bytes = vec![lead];
        while bytes.len() < width {
            match self.pending.front() {
                Some(&b) if (0x80..=0xbf).contains(&b) => {
                    bytes.push(b);
                    self.pending.pop_front();
                }
                _ => break,
            }
        }
        let c = String::from_utf8_lossy(&bytes)
            .chars()
            .next()
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        Key::Char(c)
    }
}

/// Reads a byte source on its own thread.
///
/// Each `read()` on the source becomes one chunk on a channel. A read is
/// only requested when the consumer needs bytes, so the terminal mode in
/// force at that moment applies to it.
pub struct ThreadedReader {
    requests: Sender<()>,
    chunks: Receiver<io::Result<Vec<u8>>>,
    interrupted: Arc<AtomicBool>,
    outstanding: bool,
    leftover: VecDeque<u8>,
    eof: bool,
    failed: Option<io::Error>,
}

impl ThreadedReader {
    pub fn spawn<R>(mut source: R, interrupted: Arc<AtomicBool>) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<()>();
        let (chunk_tx, chunk_rx) = mpsc::channel();

        thread::Builder::new()
            .name("input-reader".to_string())
            .spawn(move || {
                let mut buf = [0u8; CHUNK_SIZE];
                while request_rx.recv().is_ok() {
                    let result = loop {
                        match source.read(&mut buf) {
                            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                            other => break other.map(|n| buf[..n].to_vec()),
                        }
                    };
                    let last = !matches!(&result, Ok(chunk) if !chunk.is_empty());
                    if chunk_tx.send(result).is_err() || last {
                        break;
                    }
                }
                debug!("input reader finished");
            })?;

        Ok(ThreadedReader {
            requests: request_tx,
            chunks: chunk_rx,
            interrupted,
            outstanding: false,
            leftover: VecDeque::new(),
            eof: false,
            failed: None,
        })
    }

    /// Waits up to `timeout` for the next chunk. An empty chunk is end of input.
    fn receive(&mut self, timeout: Duration) -> Option<io::Result<Vec<u8>>> {
        if !self.outstanding {
            if self.requests.send(()).is_err() {
                return Some(Ok(Vec::new()));
            }
            self.outstanding = true;
        }
        match self.chunks.recv_timeout(timeout) {
            Ok(result) => {
                self.outstanding = false;
                Some(result)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.outstanding = false;
                Some(Ok(Vec::new()))
            }
        }
    }

    fn await_sequence_tail(&mut self) {
        match self.receive(ESCAPE_GRACE) {
            Some(Ok(chunk)) if chunk.is_empty() => self.eof = true,
            Some(Ok(chunk)) => self.leftover.extend(chunk),
            Some(Err(err)) => self.failed = Some(err),
            None => {}
        }
    }
}

impl Read for ThreadedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.leftover.is_empty() {
            if let Some(err) = self.failed.take() {
                return Err(err);
            }
            if self.eof {
                return Ok(0);
            }
            let chunk = loop {
                if self.interrupted.load(Ordering::SeqCst) {
                    return Err(io::ErrorKind::Interrupted.into());
                }
                if let Some(result) = self.receive(POLL_INTERVAL) {
                    break result?;
                }
            };
            if chunk.is_empty() {
                self.eof = true;
                return Ok(0);
            }
            self.leftover.extend(chunk);
            if self.leftover.back() == Some(&ESC) {
                self.await_sequence_tail();
            }
        }

        let n = buf.len().min(self.leftover.len());
        for (slot, byte) in buf.iter_mut().zip(self.leftover.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

/// Keys and lines from one byte stream, echoing to `W`.
pub struct Console<R, W> {
    decoder: KeyDecoder<R>,
    echo: W,
}

impl<R: Read, W: Write> Console<R, W> {
    pub fn new(decoder: KeyDecoder<R>, echo: W) -> Self {
        Console { decoder, echo }
    }

    pub fn next_key(&mut self) -> Result<Key, InputError> {
        self.decoder.next_key()
    }

    /// One line without its terminator, or `None` at end of input.
    ///
    /// Keys typed in raw mode but never decoded start the line. They were
    /// not echoed then, so an unfinished head is echoed before reading on.
    pub fn next_line(&mut self) -> Result<Option<String>, InputError> {
        if self.decoder.take_interrupt() {
            return Err(InputError::Interrupted);
        }

        let (mut line, complete) = self.decoder.take_buffered_line();
        if !complete {
            if !line.is_empty() {
                self.echo.write_all(&line)?;
                self.echo.flush()?;
            }
            match self.decoder.read_line()? {
                Some(rest) => line.extend(rest),
                None if line.is_empty() => return Ok(None),
                None => {}
            }
        }
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }
}

/// The two ways a menu reads from the user.
pub trait InputSource {
    /// One keystroke in raw mode.
    fn read_key(&mut self) -> Result<Key, InputError>;

    /// One cooked, echoed line without its terminator, or `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>, InputError>;
}

/// Standard input of an interactive terminal.
pub struct StdinConsole {
    console: Console<ThreadedReader, io::Stdout>,
}

impl StdinConsole {
    /// `interrupted` is the flag a SIGINT handler sets.
    pub fn new(encoding: Encoding, interrupted: Arc<AtomicBool>) -> io::Result<Self> {
        let reader = ThreadedReader::spawn(io::stdin(), Arc::clone(&interrupted))?;
        let decoder = KeyDecoder::new(reader, encoding).interruptible(interrupted);
        Ok(StdinConsole {
            console: Console::new(decoder, io::stdout()),
        })
    }
}

impl InputSource for StdinConsole {
    fn read_key(&mut self) -> Result<Key, InputError> {
        // Cooked mode comes back when `_raw` drops, on every path out.
        let _raw = io::stdout().into_raw_mode().map_err(InputError::RawMode)?;
        self.console.next_key()
    }

    fn read_line(&mut self) -> Result<Option<String>, InputError> {
        self.console.next_line()
    }
}

/// Whether both ends of the session are attached to a terminal.
pub fn is_interactive() -> bool {
    termion::is_tty(&io::stdin()) && termion::is_tty(&io::stdout())
}
