use bytes::Bytes;
use chunktree_chunker::{ChunkError, ChunkResult, ChunkSource};
use tracing::warn;

/// Contents of the single lookahead slot.
#[derive(Debug)]
enum Slot {
    /// Nothing buffered; the next query pulls from the source.
    Empty,
    Ready(Ready),
}

/// A slot after it has been filled from the source.
#[derive(Debug)]
enum Ready {
    /// One unread chunk.
    Buffered(Bytes),
    /// A read failure waiting to be handed out by `take_next`.
    ErrorPending(ChunkError),
    /// The stream is over, cleanly or after a surfaced failure.
    Exhausted,
}

/// One-chunk lookahead over a [`ChunkSource`].
///
/// `is_exhausted` may be asked any number of times without consuming data.
/// A read failure is held until `take_next` returns it once; after that the
/// stream counts as ended and the source is never pulled again.
pub struct Lookahead<C> {
    source: C,
    slot: Slot,
}

impl<C: ChunkSource> Lookahead<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            slot: Slot::Empty,
        }
    }

    /// Move the filled slot out, pulling from the source if it was empty.
    /// The slot is left `Empty`.
    fn take_ready(&mut self) -> Ready {
        match std::mem::replace(&mut self.slot, Slot::Empty) {
            Slot::Ready(ready) => ready,
            Slot::Empty => match self.source.next_chunk() {
                Ok(Some(chunk)) => Ready::Buffered(chunk),
                Ok(None) => Ready::Exhausted,
                Err(e) => Ready::ErrorPending(e),
            },
        }
    }

    /// True once the source has ended and every chunk has been taken.
    ///
    /// A pending error is not exhaustion: `take_next` still has to report it.
    pub fn is_exhausted(&mut self) -> bool {
        let ready = self.take_ready();
        let exhausted = matches!(ready, Ready::Exhausted);
        self.slot = Slot::Ready(ready);
        exhausted
    }

    /// The next chunk, `Ok(None)` at end of stream, or the pending failure.
    pub fn take_next(&mut self) -> ChunkResult<Option<Bytes>> {
        match self.take_ready() {
            Ready::Buffered(chunk) => Ok(Some(chunk)),
            Ready::Exhausted => {
                self.slot = Slot::Ready(Ready::Exhausted);
                Ok(None)
            }
            Ready::ErrorPending(e) => {
                warn!(error = %e, "chunk source failed, ending stream");
                self.slot = Slot::Ready(Ready::Exhausted);
                Err(e)
            }
        }
    }

    pub fn into_inner(self) -> C {
        self.source
    }
}
