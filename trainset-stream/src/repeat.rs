//! Replaying an inner stream for extra passes

use tracing::debug;
use trainset_core::{Error, Result};

use crate::stream::RowStream;

/// Replays `inner` for `times` extra passes after its first exhaustion.
///
/// A local inner stream yields the same sequence on every pass. A remote
/// one is only as repeatable as the endpoint serving it.
#[derive(Debug)]
pub struct Repeat<S> {
    inner: S,
    times: usize,
    remaining: usize,
}

impl<S: RowStream> Repeat<S> {
    /// Wrap `inner`; `times` must be at least one
    pub fn new(inner: S, times: usize) -> Result<Self> {
        if times == 0 {
            return Err(Error::empty_input("repeat count must be at least 1"));
        }
        Ok(Self {
            inner,
            times,
            remaining: times,
        })
    }

    /// Passes left after the current one
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<S: RowStream> RowStream for Repeat<S> {
    type Item = S::Item;

    fn next_item(&mut self) -> Result<Option<S::Item>> {
        if let Some(item) = self.inner.next_item()? {
            return Ok(Some(item));
        }

        // An empty inner stream stays empty however often it is replayed
        while self.remaining > 0 {
            self.remaining -= 1;
            debug!(remaining = self.remaining, "restarting inner stream for repeat");
            self.inner.restart()?;

            if let Some(item) = self.inner.next_item()? {
                return Ok(Some(item));
            }
        }

        Ok(None)
    }

    fn restart(&mut self) -> Result<()> {
        self.remaining = self.times;
        self.inner.restart()
    }
}
