//! Deterministic random number generation for deck order and shuffles.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical sequence
//! - **Recorded shuffles**: Shuffles are produced as a Fisher–Yates swap
//!   sequence that commands store and replay, so undo/redo never re-rolls
//! - **Serializable**: O(1) state capture and restore
//!
//! ## Swap sequences
//!
//! For a pile of `len` cards, a swap sequence holds `len - 1` targets. Entry
//! `k` pairs position `i = len - 1 - k` with target `swaps[k] <= i`. Applying
//! the pairs in order shuffles; applying them in reverse order restores.
//!
//! ```
//! use duel_engine::core::{DuelRng, apply_swaps};
//!
//! let mut rng = DuelRng::new(42);
//! let swaps = rng.swap_sequence(5);
//! assert_eq!(swaps.len(), 4);
//!
//! let mut pile = vec![1, 2, 3, 4, 5];
//! apply_swaps(&swaps, true, |i, j| pile.swap(i, j));
//! apply_swaps(&swaps, false, |i, j| pile.swap(i, j));
//! assert_eq!(pile, vec![1, 2, 3, 4, 5]);
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::error::{DuelError, Result};

/// Deterministic RNG for a duel.
///
/// Uses ChaCha8 for speed while keeping a reproducible stream per seed.
#[derive(Clone, Debug)]
pub struct DuelRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl DuelRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this RNG was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Random permutation of `0..len`.
    ///
    /// Used for the initial main deck order.
    pub fn permutation(&mut self, len: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut self.inner);
        order
    }

    /// Fisher–Yates swap sequence for a pile of `len` cards.
    pub fn swap_sequence(&mut self, len: usize) -> Vec<usize> {
        (1..len).rev().map(|i| self.inner.gen_range(0..=i)).collect()
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> DuelRngState {
        DuelRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &DuelRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state for checkpointing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}

/// Check that `swaps` is a well-formed swap sequence for `len` cards.
pub fn validate_swaps(len: usize, swaps: &[usize]) -> Result<()> {
    let expected = len.saturating_sub(1);
    if swaps.len() != expected {
        return Err(DuelError::InvalidSwapSequence(format!(
            "expected {expected} swaps for {len} cards, got {}",
            swaps.len()
        )));
    }
    for (i, &j) in (1..len).rev().zip(swaps) {
        if j > i {
            return Err(DuelError::InvalidSwapSequence(format!(
                "swap target {j} out of range for position {i}"
            )));
        }
    }
    Ok(())
}

/// Feed the position pairs of a swap sequence to `swap`.
///
/// `forward` shuffles; `!forward` walks the pairs backwards and undoes it.
pub fn apply_swaps(swaps: &[usize], forward: bool, mut swap: impl FnMut(usize, usize)) {
    let len = swaps.len() + 1;
    let pairs = (1..len).rev().zip(swaps.iter().copied());
    if forward {
        pairs.for_each(|(i, j)| swap(i, j));
    } else {
        let pairs: Vec<_> = pairs.collect();
        pairs.into_iter().rev().for_each(|(i, j)| swap(i, j));
    }
}
