//! Deterministic random source for the simulation.
//!
//! A linear congruential generator over modulus 2^32. The recurrence is fixed
//! so that a seed reproduces the same draw sequence in any implementation
//! that uses the same constants.

use rand::RngCore;
use std::f64::consts::PI;

const MULTIPLIER: u64 = 1_664_525;
const INCREMENT: u64 = 1_013_904_223;
const MODULUS: u64 = 1 << 32;

/// Seeded linear congruential generator.
///
/// # Examples
///
/// ```
/// use wealth_montecarlo::core::rng::Lcg;
///
/// let mut a = Lcg::new(42);
/// let mut b = Lcg::new(42);
/// assert_eq!(a.next_f64(), b.next_f64());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Create a generator. Seeds are reduced modulo 2^32.
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed % MODULUS,
        }
    }

    /// Reset the sequence to the start of `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.state = seed % MODULUS;
    }

    fn step(&mut self) -> u32 {
        self.state = (MULTIPLIER * self.state + INCREMENT) % MODULUS;
        self.state as u32
    }

    /// Uniform draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.step()) / MODULUS as f64
    }

    /// Normal draw via the Box-Muller transform.
    ///
    /// Consumes exactly two uniform draws, plus one more for every zero
    /// drawn as the logarithm argument.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let mut u1 = self.next_f64();
        while u1 == 0.0 {
            u1 = self.next_f64();
        }
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }

    /// Standard normal draw.
    pub fn standard_normal(&mut self) -> f64 {
        self.normal(0.0, 1.0)
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.step());
        let low = u64::from(self.step());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Derive the seed for one batch from a master draw and the batch index.
///
/// Uses the splitmix64 finaliser so neighbouring batches start far apart on
/// the generator's cycle.
pub fn batch_seed(master_draw: u32, batch_index: u64) -> u64 {
    let mut z = (u64::from(master_draw) << 32)
        .wrapping_add(batch_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
