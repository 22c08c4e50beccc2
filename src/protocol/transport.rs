use std::{
    io::{self, Read, Write},
    string::FromUtf8Error,
    time::{Duration, Instant},
};

use log::{debug, trace};
use serialport::{ClearBuffer, SerialPort};
use thiserror::Error;

/// Read timeout used when none is given explicitly.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const TERMINATOR: u8 = b'\n';

/// Longest reply line accepted, terminator excluded.
pub const MAX_LINE_LENGTH: usize = 4096;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no line terminator received within {0:?}")]
    Timeout(Duration),
    #[error("reply exceeded {0} bytes without a line terminator")]
    LineTooLong(usize),
    #[error("reply is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
    #[error("Transport IO Error: {0}")]
    Io(#[from] io::Error),
}

/// Byte stream that can drop whatever is still buffered in either direction.
pub trait Stream: Read + Write {
    fn discard_buffers(&mut self) -> io::Result<()>;
}

impl Stream for Box<dyn SerialPort> {
    fn discard_buffers(&mut self) -> io::Result<()> {
        self.flush()?;
        self.clear(ClearBuffer::All)?;
        Ok(())
    }
}

/// Line-oriented transport over a byte stream.
///
/// Commands are written verbatim; replies are single `\n`-terminated lines.
/// Not safe for concurrent use: a [`query`](Self::query) is a write followed
/// by a read, and an interleaved writer would corrupt the reply stream.
pub struct LineTransport<S: Stream> {
    stream: S,
    timeout: Duration,
}

impl<S: Stream> LineTransport<S> {
    pub fn new(stream: S) -> Self {
        Self::with_timeout(stream, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(stream: S, timeout: Duration) -> Self {
        Self { stream, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Writes `data` as-is; no terminator is appended.
    pub fn send(&mut self, data: &str) -> Result<(), TransportError> {
        debug!("sent: {data:?}");
        self.stream.write_all(data.as_bytes())?;
        self.stream.flush()?;
        Ok(())
    }

    /// Blocks until a full line arrives and returns it without the
    /// terminator or surrounding whitespace.
    ///
    /// Fails with [`TransportError::Timeout`] when the stream stalls or ends
    /// before a terminator is seen, and with [`TransportError::LineTooLong`]
    /// after [`MAX_LINE_LENGTH`] bytes without one. Partial input is dropped.
    pub fn receive_line(&mut self) -> Result<String, TransportError> {
        let deadline = Instant::now() + self.timeout;
        let mut line = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            match self.stream.read(&mut byte) {
                Ok(0) => return Err(TransportError::Timeout(self.timeout)),
                Ok(_) if byte[0] == TERMINATOR => break,
                Ok(_) if line.len() >= MAX_LINE_LENGTH => {
                    return Err(TransportError::LineTooLong(MAX_LINE_LENGTH));
                }
                Ok(_) => line.push(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
                    ) => {}
                Err(e) => return Err(e.into()),
            }

            if Instant::now() >= deadline {
                return Err(TransportError::Timeout(self.timeout));
            }
        }

        let line = String::from_utf8(line)?.trim().to_string();
        debug!("received: {line:?}");
        Ok(line)
    }

    pub fn query(&mut self, data: &str) -> Result<String, TransportError> {
        self.send(data)?;
        self.receive_line()
    }

    /// Drops unread input and unflushed output.
    pub fn clear(&mut self) -> Result<(), TransportError> {
        trace!("discarding buffered input and output");
        self.stream.discard_buffers()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// In-memory stream: replies are read from `input`, commands land in `output`.
    struct Loopback {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Loopback {
        fn new(input: &[u8]) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                output: Vec::new(),
            }
        }
    }

    impl Read for Loopback {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Loopback {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Stream for Loopback {
        fn discard_buffers(&mut self) -> io::Result<()> {
            let end = self.input.get_ref().len() as u64;
            self.input.set_position(end);
            self.output.clear();
            Ok(())
        }
    }

    /// Stream whose reads always time out, like an idle serial port.
    struct Silent;

    impl Read for Silent {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::ErrorKind::TimedOut.into())
        }
    }

    impl Write for Silent {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Stream for Silent {
        fn discard_buffers(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn send_writes_verbatim() {
        let mut transport = LineTransport::new(Loopback::new(b""));
        transport.send("f2441.29760000").unwrap();
        assert_eq!(transport.get_ref().output, b"f2441.29760000");
    }

    #[test]
    fn receive_line_strips_whitespace() {
        let mut transport = LineTransport::new(Loopback::new(b"  2441.29760000\r\nnext\n"));
        assert_eq!(transport.receive_line().unwrap(), "2441.29760000");
        assert_eq!(transport.receive_line().unwrap(), "next");
    }

    #[test]
    fn missing_terminator_is_a_timeout() {
        let mut transport = LineTransport::new(Loopback::new(b"partial"));
        assert!(matches!(
            transport.receive_line(),
            Err(TransportError::Timeout(_))
        ));
    }

    #[test]
    fn silent_stream_times_out() {
        let timeout = Duration::from_millis(20);
        let mut transport = LineTransport::with_timeout(Silent, timeout);

        let started = Instant::now();
        match transport.receive_line() {
            Err(TransportError::Timeout(t)) => assert_eq!(t, timeout),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(started.elapsed() >= timeout);
    }

    #[test]
    fn query_sends_then_reads() {
        let mut transport = LineTransport::new(Loopback::new(b"1\n"));
        assert_eq!(transport.query("h?").unwrap(), "1");
        assert_eq!(transport.get_ref().output, b"h?");
    }

    #[test]
    fn clear_discards_pending_input() {
        let mut transport = LineTransport::new(Loopback::new(b"-42.1\nstray\n"));
        transport.send("w").unwrap();
        transport.clear().unwrap();
        assert!(transport.get_ref().output.is_empty());
        assert!(matches!(
            transport.receive_line(),
            Err(TransportError::Timeout(_))
        ));
    }

    #[test]
    fn unterminated_flood_is_cut_off() {
        let mut input = vec![b'x'; MAX_LINE_LENGTH];
        input.extend_from_slice(b"\n");
        let mut transport = LineTransport::new(Loopback::new(&input));
        assert_eq!(transport.receive_line().unwrap().len(), MAX_LINE_LENGTH);

        let input = vec![b'x'; MAX_LINE_LENGTH * 2];
        let mut transport = LineTransport::new(Loopback::new(&input));
        assert!(matches!(
            transport.receive_line(),
            Err(TransportError::LineTooLong(MAX_LINE_LENGTH))
        ));
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let mut transport = LineTransport::new(Loopback::new(b"\xff\xfe\n"));
        assert!(matches!(
            transport.receive_line(),
            Err(TransportError::Encoding(_))
        ));
    }
}
