//! RNG module - next-piece generation
//!
//! Two randomizers feed the next-piece queue:
//! - **Uniform**: every piece is an independent pick out of the seven kinds.
//! - **Seven bag**: each bag holds one of each kind, shuffled, drawn until empty.
//!
//! Both run on a small LCG so a seed fully determines the piece sequence.

use arrayvec::ArrayVec;

use crate::config::Randomizer;
use crate::types::{PieceKind, MAX_PREVIEW};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // The high bits of an LCG are far better distributed than the low ones.
        (((self.next_u32() >> 16) as u64 * max as u64) >> 16) as u32
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Uniform pick out of the seven kinds
    pub fn next_piece(&mut self) -> PieceKind {
        PieceKind::ALL[self.next_range(PieceKind::ALL.len() as u32) as usize]
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Upcoming pieces, oldest first; never empty.
#[derive(Debug, Clone)]
pub struct PieceQueue {
    preview: ArrayVec<PieceKind, MAX_PREVIEW>,
    /// Remaining pieces of the current bag (seven-bag only), drawn from the back
    bag: ArrayVec<PieceKind, 7>,
    randomizer: Randomizer,
    rng: SimpleRng,
    len: usize,
}

impl PieceQueue {
    /// Create a queue holding `len` (1..=5) upcoming pieces
    pub fn new(randomizer: Randomizer, seed: u32, len: usize) -> Self {
        let mut queue = Self {
            preview: ArrayVec::new(),
            bag: ArrayVec::new(),
            randomizer,
            rng: SimpleRng::new(seed),
            len: len.clamp(1, MAX_PREVIEW),
        };
        queue.fill();
        queue
    }

    /// Rebuild a queue around pieces restored from a snapshot.
    ///
    /// `bag` is what was left of the current seven-bag, in [`PieceQueue::bag`]
    /// order; it is ignored by the uniform randomizer.
    pub fn with_preview(
        randomizer: Randomizer,
        seed: u32,
        pieces: &[PieceKind],
        bag: &[PieceKind],
    ) -> Self {
        let bag = match randomizer {
            Randomizer::SevenBag => bag.iter().copied().take(PieceKind::ALL.len()).collect(),
            Randomizer::Uniform => ArrayVec::new(),
        };
        let mut queue = Self {
            preview: pieces.iter().copied().take(MAX_PREVIEW).collect(),
            bag,
            randomizer,
            rng: SimpleRng::new(seed),
            len: pieces.len().clamp(1, MAX_PREVIEW),
        };
        queue.fill();
        queue
    }

    fn generate(&mut self) -> PieceKind {
        match self.randomizer {
            Randomizer::Uniform => self.rng.next_piece(),
            Randomizer::SevenBag => {
                if self.bag.is_empty() {
                    self.bag.extend(PieceKind::ALL);
                    self.rng.shuffle(&mut self.bag);
                }
                // Refilled just above when empty.
                self.bag.pop().unwrap_or(PieceKind::I)
            }
        }
    }

    fn fill(&mut self) {
        while self.preview.len() < self.len {
            let kind = self.generate();
            self.preview.push(kind);
        }
    }

    /// Take the next piece and refill the preview behind it
    pub fn draw(&mut self) -> PieceKind {
        let kind = self.peek();
        self.preview.remove(0);
        self.fill();
        kind
    }

    /// The piece the next `draw` returns
    pub fn peek(&self) -> PieceKind {
        self.preview.first().copied().unwrap_or(PieceKind::I)
    }

    /// Every queued piece, next first
    pub fn preview(&self) -> &[PieceKind] {
        &self.preview
    }

    /// Swap the most recently generated piece for an externally suggested one.
    ///
    /// With a one-slot queue that is the visible next piece.
    pub fn replace_newest(&mut self, kind: PieceKind) {
        if let Some(last) = self.preview.last_mut() {
            *last = kind;
        }
    }

    /// Pieces left in the current seven-bag; the last one is drawn first
    pub fn bag(&self) -> &[PieceKind] {
        &self.bag
    }

    /// Current RNG state (for rebuilding the sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}
