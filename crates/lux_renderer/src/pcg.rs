//! Permuted congruential generator (PCG-XSH-RR, 64-bit state, 32-bit output).
//!
//! Every random decision in the renderer goes through this generator so a
//! fixed `(init_state, init_seq)` pair reproduces an image bit for bit.

use rand::{RngCore, SeedableRng};

const MULTIPLIER: u64 = 6_364_136_223_846_793_005;

/// Default initial state.
pub const DEFAULT_INIT_STATE: u64 = 42;
/// Default stream selector.
pub const DEFAULT_INIT_SEQ: u64 = 54;

/// Odd multiplier spreading pixel indices over the stream selectors.
const PIXEL_STREAM_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcg {
    state: u64,
    inc: u64,
}

impl Default for Pcg {
    fn default() -> Self {
        Self::new(DEFAULT_INIT_STATE, DEFAULT_INIT_SEQ)
    }
}

impl Pcg {
    /// Seed a generator. Different `init_seq` values select independent
    /// streams.
    pub fn new(init_state: u64, init_seq: u64) -> Self {
        let mut pcg = Self {
            state: 0,
            inc: (init_seq << 1) | 1,
        };
        pcg.random();
        pcg.state = pcg.state.wrapping_add(init_state);
        pcg.random();
        pcg
    }

    /// Generator for one pixel of a parallel render.
    ///
    /// Every pixel gets its own stream, so the result does not depend on
    /// which worker renders it or in which order. Distinct pixels of one
    /// frame never share a stream; changing `init_seq` moves every pixel to
    /// a different one.
    pub fn for_pixel(init_state: u64, init_seq: u64, pixel_index: u64) -> Self {
        Self::new(init_state, init_seq ^ pixel_index.wrapping_mul(PIXEL_STREAM_MIX))
    }

    /// Next 32-bit output.
    pub fn random(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(MULTIPLIER).wrapping_add(self.inc);

        let xorshifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Uniform float in [0, 1).
    ///
    /// Uses the top 24 bits so the result is exactly representable and can
    /// never round up to 1.
    pub fn random_float(&mut self) -> f32 {
        (self.random() >> 8) as f32 * (1.0 / 16_777_216.0)
    }
}

impl RngCore for Pcg {
    fn next_u32(&mut self) -> u32 {
        self.random()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.random());
        let lo = u64::from(self.random());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.random().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Pcg {
    /// Little-endian initial state followed by the stream selector.
    type Seed = [u8; 16];

    fn from_seed(seed: Self::Seed) -> Self {
        let mut state = [0u8; 8];
        let mut seq = [0u8; 8];
        state.copy_from_slice(&seed[..8]);
        seq.copy_from_slice(&seed[8..]);
        Self::new(u64::from_le_bytes(state), u64::from_le_bytes(seq))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state, DEFAULT_INIT_SEQ)
    }
}
