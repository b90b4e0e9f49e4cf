use bytes::Bytes;

use crate::error::ChunkResult;

/// Pull-based producer of a stream's chunks.
///
/// Chunks come back in stream order and are handed out exactly once.
/// `Ok(None)` marks the end of the stream; what a source does when called
/// again after that or after an error is unspecified, so consumers must stop
/// pulling.
pub trait ChunkSource {
    fn next_chunk(&mut self) -> ChunkResult<Option<Bytes>>;
}

impl<T: ChunkSource + ?Sized> ChunkSource for &mut T {
    fn next_chunk(&mut self) -> ChunkResult<Option<Bytes>> {
        (**self).next_chunk()
    }
}

impl<T: ChunkSource + ?Sized> ChunkSource for Box<T> {
    fn next_chunk(&mut self) -> ChunkResult<Option<Bytes>> {
        (**self).next_chunk()
    }
}

/// Adapts an iterator of chunk results into a [`ChunkSource`].
///
/// Handy for chunks produced elsewhere (a content-defined chunker, a network
/// stream) and for scripting failures in tests.
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = ChunkResult<Bytes>>,
{
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl IterSource<std::vec::IntoIter<ChunkResult<Bytes>>> {
    /// A source yielding the given chunks, then end of stream.
    pub fn from_chunks<T: Into<Bytes>>(chunks: Vec<T>) -> Self {
        let items: Vec<ChunkResult<Bytes>> = chunks.into_iter().map(|c| Ok(c.into())).collect();
        Self::new(items.into_iter())
    }
}

impl<I> ChunkSource for IterSource<I>
where
    I: Iterator<Item = ChunkResult<Bytes>>,
{
    fn next_chunk(&mut self) -> ChunkResult<Option<Bytes>> {
        self.iter.next().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChunkError;

    #[test]
    fn from_chunks_yields_in_order_then_ends() {
        let mut source = IterSource::from_chunks(vec!["ab", "cd"]);
        assert_eq!(source.next_chunk().unwrap().unwrap(), "ab");
        assert_eq!(source.next_chunk().unwrap().unwrap(), "cd");
        assert!(source.next_chunk().unwrap().is_none());
    }

    #[test]
    fn errors_pass_through() {
        let items = vec![
            Ok(Bytes::from_static(b"ok")),
            Err(ChunkError::Io(std::io::Error::other("disk gone"))),
        ];
        let mut source = IterSource::new(items.into_iter());
        assert!(source.next_chunk().unwrap().is_some());
        assert!(matches!(source.next_chunk(), Err(ChunkError::Io(_))));
    }

    #[test]
    fn boxed_and_borrowed_sources() {
        let mut inner = IterSource::from_chunks(vec!["x"]);
        {
            let borrowed: &mut dyn ChunkSource = &mut inner;
            assert!(borrowed.next_chunk().unwrap().is_some());
        }
        let mut boxed: Box<dyn ChunkSource> = Box::new(inner);
        assert!(boxed.next_chunk().unwrap().is_none());
    }
}
