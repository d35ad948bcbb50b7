//! Pseudo-random number generator with the constants of `java.util.Random`.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{UNIX_EPOCH, SystemTime};
use std::num::Wrapping;


const MULTIPLIER: Wrapping<i64> = Wrapping(0x5DEECE66D);
const ADDEND: Wrapping<i64> = Wrapping(0xB);
const MASK: Wrapping<i64> = Wrapping((1 << 48) - 1);


#[inline]
fn initial_scramble(seed: i64) -> Wrapping<i64> {
    (Wrapping(seed) ^ MULTIPLIER) & MASK
}

/// Generate a new seed in the same way as `java.util.Random` (same constants). The 
/// seed uniquifier is shared by the whole process and updated atomically, so any 
/// number of threads can create generators concurrently.
pub fn gen_seed() -> i64 {
    static SEED: AtomicI64 = AtomicI64::new(8682522807148012);
    let mut current = SEED.load(Ordering::Relaxed);
    loop {
        let next = current.wrapping_mul(181783497276652981);
        match SEED.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => {
                // Java uses the nano time here, which has no integer equivalent in 
                // Rust, so we use the duration since unix epoch.
                return match SystemTime::now().duration_since(UNIX_EPOCH) {
                    Ok(d) => next ^ (d.as_nanos() as i64),
                    Err(_) => next
                };
            }
            Err(old) => current = old
        }
    }
}


/// A linear congruential generator, owned by its user and never shared.
#[derive(Debug, Clone)]
pub struct JavaRandom {
    seed: Wrapping<i64>
}

impl Default for JavaRandom {
    fn default() -> Self {
        Self::new_seeded()
    }
}

impl JavaRandom {

    #[inline]
    pub fn new(seed: i64) -> JavaRandom {
        JavaRandom { seed: initial_scramble(seed) }
    }

    /// Create a generator from a fresh process-wide seed.
    #[inline]
    pub fn new_seeded() -> JavaRandom {
        Self::new(gen_seed())
    }

    #[inline]
    fn next(&mut self, bits: u8) -> i32 {
        self.seed = (self.seed * MULTIPLIER + ADDEND) & MASK;
        (self.seed.0 as u64 >> (48 - bits)) as i32
    }

    #[inline]
    pub fn next_int(&mut self) -> i32 {
        self.next(32)
    }

}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn java_sequence() {
        // Values of `new java.util.Random(0).nextInt()`.
        let mut rand = JavaRandom::new(0);
        assert_eq!(rand.next_int(), -1155484576);
        assert_eq!(rand.next_int(), -723955400);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = JavaRandom::new(42);
        let mut b = a.clone();
        for _ in 0..16 {
            assert_eq!(a.next_int(), b.next_int());
        }
    }

}
