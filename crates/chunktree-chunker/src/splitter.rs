use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::error::{ChunkError, ChunkResult};
use crate::source::ChunkSource;

/// Default fixed chunk size: 256 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Splits a reader into chunks of exactly `size` bytes; the final chunk may
/// be shorter.
///
/// Short reads are accumulated until the chunk is full or the reader hits
/// end of file, so chunk boundaries depend only on the stream's bytes and
/// not on how the reader happens to deliver them. An empty reader yields no
/// chunks at all.
pub struct SizeSplitter<R> {
    reader: R,
    size: usize,
    done: bool,
}

impl<R: Read> SizeSplitter<R> {
    pub fn new(reader: R, size: usize) -> ChunkResult<Self> {
        if size == 0 {
            return Err(ChunkError::ZeroChunkSize);
        }
        Ok(Self {
            reader,
            size,
            done: false,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.size
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ChunkSource for SizeSplitter<R> {
    fn next_chunk(&mut self) -> ChunkResult<Option<Bytes>> {
        if self.done {
            return Ok(None);
        }

        let mut buf = BytesMut::zeroed(self.size);
        let mut filled = 0;
        while filled < self.size {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled < self.size {
            self.done = true;
        }
        if filled == 0 {
            return Ok(None);
        }
        buf.truncate(filled);
        trace!(len = filled, "chunk read");
        Ok(Some(buf.freeze()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect<R: Read>(mut splitter: SizeSplitter<R>) -> Vec<Bytes> {
        let mut out = Vec::new();
        while let Some(chunk) = splitter.next_chunk().unwrap() {
            out.push(chunk);
        }
        out
    }

    /// Reader that returns at most `step` bytes per call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("device unplugged"))
        }
    }

    #[test]
    fn splits_into_fixed_chunks_with_short_tail() {
        let chunks = collect(SizeSplitter::new(Cursor::new(b"ABCDEFGHIJ".to_vec()), 4).unwrap());
        assert_eq!(chunks, vec!["ABCD", "EFGH", "IJ"]);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let chunks = collect(SizeSplitter::new(Cursor::new(b"ABCDEFGH".to_vec()), 4).unwrap());
        assert_eq!(chunks, vec!["ABCD", "EFGH"]);
    }

    #[test]
    fn empty_reader_yields_nothing() {
        let chunks = collect(SizeSplitter::new(Cursor::new(Vec::new()), 4).unwrap());
        assert!(chunks.is_empty());
    }

    #[test]
    fn short_reads_are_accumulated() {
        let data = b"0123456789abcdef";
        let chunks = collect(SizeSplitter::new(Trickle { data, step: 3 }, 5).unwrap());
        assert_eq!(chunks, vec!["01234", "56789", "abcde", "f"]);
    }

    #[test]
    fn end_of_stream_is_sticky() {
        let mut splitter = SizeSplitter::new(Cursor::new(b"xy".to_vec()), 4).unwrap();
        assert!(splitter.next_chunk().unwrap().is_some());
        assert!(splitter.next_chunk().unwrap().is_none());
        assert!(splitter.next_chunk().unwrap().is_none());
    }

    #[test]
    fn read_error_is_returned() {
        let mut splitter = SizeSplitter::new(Broken, 4).unwrap();
        assert!(splitter.next_chunk().is_err());
    }

    #[test]
    fn zero_size_rejected() {
        let err = SizeSplitter::new(Cursor::new(Vec::new()), 0).err().unwrap();
        assert!(matches!(err, ChunkError::ZeroChunkSize));
    }
}
