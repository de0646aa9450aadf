//! Header-delimited message framing.
//!
//! Each message is a block of `Name: value` header lines terminated by an
//! empty line, followed by exactly `Content-Length` bytes of body.

use std::io;
use std::io::BufRead;
use std::io::Read;
use std::io::Write;

use thiserror::Error;

const CONTENT_LENGTH: &str = "content-length";
const CONTENT_TYPE_HEADER: &str = "Content-Type: application/json; charset=utf-8";
const MAX_HEADER_LINE: usize = 1024;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("frame is missing a Content-Length header")]
    MissingContentLength,
    #[error("invalid frame header: {0}")]
    InvalidHeader(String),
    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    TooLarge { len: usize, max: usize },
}

pub struct FrameReader<R> {
    inner: R,
    max_frame_bytes: usize,
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(inner: R, max_frame_bytes: usize) -> Self {
        Self {
            inner,
            max_frame_bytes,
        }
    }

    /// Reads one frame body. Returns `Ok(None)` on a clean end of stream
    /// between frames.
    pub fn read_frame(&mut self) -> Result<Option<Vec<u8>>, FrameError> {
        let mut content_length = None;
        let mut saw_header = false;

        loop {
            let mut line = String::new();
            let read = (&mut self.inner)
                .take(MAX_HEADER_LINE as u64)
                .read_line(&mut line)?;
            if read == 0 {
                if saw_header {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "stream ended inside frame headers",
                    )
                    .into());
                }
                return Ok(None);
            }
            if !line.ends_with('\n') {
                return Err(FrameError::InvalidHeader(format!(
                    "header line longer than {} bytes",
                    MAX_HEADER_LINE
                )));
            }

            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                if !saw_header {
                    continue;
                }
                break;
            }
            saw_header = true;

            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| FrameError::InvalidHeader(line.to_string()))?;
            if name.trim().eq_ignore_ascii_case(CONTENT_LENGTH) {
                let len = value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| FrameError::InvalidHeader(line.to_string()))?;
                content_length = Some(len);
            }
        }

        let len = content_length.ok_or(FrameError::MissingContentLength)?;
        if len > self.max_frame_bytes {
            return Err(FrameError::TooLarge {
                len,
                max: self.max_frame_bytes,
            });
        }

        let mut body = vec![0u8; len];
        self.inner.read_exact(&mut body)?;
        Ok(Some(body))
    }
}

pub struct FrameWriter<W> {
    inner: W,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_frame(&mut self, body: &[u8]) -> io::Result<()> {
        write!(
            self.inner,
            "Content-Length: {}\r\n{}\r\n\r\n",
            body.len(),
            CONTENT_TYPE_HEADER
        )?;
        self.inner.write_all(body)?;
        self.inner.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(bytes: &[u8]) -> FrameReader<Cursor<Vec<u8>>> {
        FrameReader::new(Cursor::new(bytes.to_vec()), 1024)
    }

    #[test]
    fn test_writer_output_reads_back() {
        let mut writer = FrameWriter::new(Vec::new());
        writer.write_frame(br#"{"a":1}"#).unwrap();
        writer.write_frame(br#"{"b":2}"#).unwrap();

        let mut reader = reader(writer.get_ref());
        assert_eq!(reader.read_frame().unwrap().unwrap(), br#"{"a":1}"#);
        assert_eq!(reader.read_frame().unwrap().unwrap(), br#"{"b":2}"#);
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_body_may_contain_newlines() {
        let body = b"{\n  \"a\": 1\n}\n";
        let frame = format!("Content-Length: {}\r\n\r\n", body.len());
        let mut bytes = frame.into_bytes();
        bytes.extend_from_slice(body);

        assert_eq!(reader(&bytes).read_frame().unwrap().unwrap(), body);
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let mut reader = reader(b"content-length: 2\nX-Extra: yes\n\n{}");
        assert_eq!(reader.read_frame().unwrap().unwrap(), b"{}");
    }

    #[test]
    fn test_missing_length_is_rejected() {
        let err = reader(b"Content-Type: x\r\n\r\n{}").read_frame().unwrap_err();
        assert!(matches!(err, FrameError::MissingContentLength));
    }

    #[test]
    fn test_oversized_frame_is_rejected() {
        let err = reader(b"Content-Length: 4096\r\n\r\n").read_frame().unwrap_err();
        assert!(matches!(err, FrameError::TooLarge { len: 4096, max: 1024 }));
    }

    #[test]
    fn test_truncated_body_is_io_error() {
        let err = reader(b"Content-Length: 10\r\n\r\n{}").read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_garbage_header_is_rejected() {
        let err = reader(b"hello world\r\n\r\n").read_frame().unwrap_err();
        assert!(matches!(err, FrameError::InvalidHeader(_)));
    }
}
