//! Windowed shuffling through a bounded reservoir
//!
//! The reservoir holds at most `buffer_size` items. Each pull removes a
//! uniformly random item and refills its slot from the inner stream, so
//! memory stays bounded and items can only move within roughly one buffer
//! length of their input position. A buffer at least as large as one pass
//! gives a uniform shuffle of that pass.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;
use trainset_core::{Error, Result};

use crate::stream::RowStream;

/// Randomizes delivery order within a sliding window
pub struct Shuffle<S: RowStream> {
    inner: S,
    buffer_size: usize,
    buffer: Vec<S::Item>,
    rng: StdRng,
}

impl<S: RowStream> Shuffle<S> {
    /// Wrap `inner` with a reservoir of `buffer_size` items, seeded from entropy
    pub fn new(inner: S, buffer_size: usize) -> Result<Self> {
        Self::with_rng(inner, buffer_size, StdRng::from_entropy())
    }

    /// Wrap `inner` with a reproducible order
    pub fn seeded(inner: S, buffer_size: usize, seed: u64) -> Result<Self> {
        Self::with_rng(inner, buffer_size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(inner: S, buffer_size: usize, rng: StdRng) -> Result<Self> {
        if buffer_size == 0 {
            return Err(Error::empty_input("shuffle buffer size must be at least 1"));
        }

        let mut shuffle = Self {
            inner,
            buffer_size,
            buffer: Vec::with_capacity(buffer_size),
            rng,
        };
        shuffle.fill()?;
        Ok(shuffle)
    }

    /// Number of items currently held
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn fill(&mut self) -> Result<()> {
        while self.buffer.len() < self.buffer_size {
            match self.inner.next_item()? {
                Some(item) => self.buffer.push(item),
                None => break,
            }
        }
        trace!(buffered = self.buffer.len(), "filled shuffle buffer");
        Ok(())
    }
}

impl<S: RowStream> RowStream for Shuffle<S> {
    type Item = S::Item;

    fn next_item(&mut self) -> Result<Option<S::Item>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let slot = self.rng.gen_range(0..self.buffer.len());

        // Pull the replacement first so a failing inner stream leaves the buffer intact
        let item = match self.inner.next_item()? {
            Some(replacement) => std::mem::replace(&mut self.buffer[slot], replacement),
            None => self.buffer.swap_remove(slot),
        };
        Ok(Some(item))
    }

    fn restart(&mut self) -> Result<()> {
        self.buffer.clear();
        self.inner.restart()?;
        self.fill()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::stream::testing::*;
    use crate::stream::MemoryStream;
    use test_case::test_case;

    fn drain<S: RowStream>(stream: &mut S) -> Vec<S::Item> {
        std::iter::from_fn(|| stream.next_item().unwrap()).collect()
    }

    #[test_case(4, 10 ; "buffer smaller than input")]
    #[test_case(1, 5 ; "buffer of one")]
    #[test_case(32, 10 ; "buffer larger than input")]
    fn test_one_pass_is_a_permutation(buffer: usize, n: i64) {
        let mut stream = Shuffle::new(MemoryStream::new(numbered_rows(n)), buffer).unwrap();
        let items = ids(&drain(&mut stream));

        assert_eq!(items.len(), usize::try_from(n).unwrap());
        let distinct: HashSet<i64> = items.iter().copied().collect();
        assert_eq!(distinct, (0..n).collect());
    }

    #[test]
    fn test_buffer_of_one_keeps_order() {
        let mut stream = Shuffle::seeded(MemoryStream::new(numbered_rows(6)), 1, 7).unwrap();
        assert_eq!(ids(&drain(&mut stream)), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let run = |seed| {
            let mut stream = Shuffle::seeded(MemoryStream::new(numbered_rows(50)), 8, seed).unwrap();
            ids(&drain(&mut stream))
        };

        assert_eq!(run(42), run(42));
        assert_ne!(run(42), (0..50).collect::<Vec<i64>>());
    }

    #[test]
    fn test_construction_fills_reservoir() {
        let stream = Shuffle::new(MemoryStream::new(numbered_rows(10)), 4).unwrap();
        assert_eq!(stream.buffered(), 4);

        let short = Shuffle::new(MemoryStream::new(numbered_rows(2)), 4).unwrap();
        assert_eq!(short.buffered(), 2);
    }

    #[test]
    fn test_restart_refills_from_start() {
        let mut stream = Shuffle::new(MemoryStream::new(numbered_rows(10)), 4).unwrap();
        stream.next_item().unwrap();
        stream.next_item().unwrap();

        stream.restart().unwrap();
        let items: HashSet<i64> = ids(&drain(&mut stream)).into_iter().collect();
        assert_eq!(items, (0..10).collect());
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let result = Shuffle::new(MemoryStream::new(numbered_rows(3)), 0);
        assert!(matches!(result, Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_inner_error_surfaces_on_refill() {
        let mut stream = Shuffle::new(FailingStream { ok: 2, pulled: 0 }, 2).unwrap();
        assert_eq!(stream.buffered(), 2);
        assert!(matches!(stream.next_item(), Err(Error::Transport(_))));
        assert_eq!(stream.buffered(), 2);
    }
}
