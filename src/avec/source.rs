//! Byte sources shared by the decoding backends.

use std::{
    collections::TryReserveError,
    io::{self, ErrorKind, Read},
};

use super::Error;

/// Why a source stopped producing bytes.
#[derive(Debug)]
pub enum Halt {
    /// The stream ended.
    End,
    /// Reading failed, or the bytes read cannot form a record.
    Failed(Error),
}

impl From<Error> for Halt {
    fn from(err: Error) -> Self {
        Self::Failed(err)
    }
}

impl From<io::Error> for Halt {
    fn from(err: io::Error) -> Self {
        Self::Failed(err.into())
    }
}

impl From<TryReserveError> for Halt {
    fn from(err: TryReserveError) -> Self {
        Self::Failed(err.into())
    }
}

/// A forward-only stream of bytes to decode from.
pub trait Source {
    /// Take an exact number of bytes.
    ///
    /// Halts with [`Halt::End`] if the stream ends first, having consumed
    /// whatever bytes remained.
    fn take<const N: usize>(&mut self) -> Result<[u8; N], Halt>;

    /// Take a run of bytes into a new buffer, reserved fallibly.
    fn take_vec(&mut self, n: usize) -> Result<Vec<u8>, Halt>;

    /// Number of bytes consumed so far.
    fn offset(&self) -> usize;

    /// Whether the stream has no bytes left, consuming none.
    fn at_end(&mut self) -> Result<bool, Error>;
}

/// A source over a reader.
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: R,
    offset: usize,
    peeked: Option<u8>,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            peeked: None,
        }
    }

    /// Fill as much of a buffer as the reader allows, returning how many bytes
    /// were read.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let mut n = 0;

        if let (Some(b), Some(first)) = (self.peeked, buf.first_mut()) {
            *first = b;
            self.peeked = None;
            n = 1;
        }

        while n < buf.len() {
            match self.inner.read(&mut buf[n..]) {
                Ok(0) => break,
                Ok(read) => n += read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => Err(e)?,
            }
        }

        self.offset += n;

        Ok(n)
    }
}

impl<R: Read> Source for ReaderSource<R> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], Halt> {
        let mut buf = [0; N];

        if self.fill(&mut buf)? < N {
            return Err(Halt::End);
        }

        Ok(buf)
    }

    fn take_vec(&mut self, n: usize) -> Result<Vec<u8>, Halt> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(n)?;
        buf.resize(n, 0);

        if self.fill(&mut buf)? < n {
            return Err(Halt::End);
        }

        Ok(buf)
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn at_end(&mut self) -> Result<bool, Error> {
        if self.peeked.is_some() {
            return Ok(false);
        }

        let mut buf = [0; 1];

        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(true),
                Ok(_) => {
                    self.peeked = Some(buf[0]);
                    return Ok(false);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => Err(e)?,
            }
        }
    }
}

/// A source over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn split(&mut self, n: usize) -> Result<&'a [u8], Halt> {
        let rest = &self.data[self.offset..];

        match rest.split_at_checked(n) {
            Some((taken, _)) => {
                self.offset += n;
                Ok(taken)
            }
            None => {
                self.offset = self.data.len();
                Err(Halt::End)
            }
        }
    }
}

impl Source for SliceSource<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], Halt> {
        let mut buf = [0; N];
        buf.copy_from_slice(self.split(N)?);

        Ok(buf)
    }

    fn take_vec(&mut self, n: usize) -> Result<Vec<u8>, Halt> {
        let taken = self.split(n)?;

        let mut buf = Vec::new();
        buf.try_reserve_exact(n)?;
        buf.extend_from_slice(taken);

        Ok(buf)
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn at_end(&mut self) -> Result<bool, Error> {
        Ok(self.offset >= self.data.len())
    }
}
