// Outer-ring shuffle. The center letter never moves.

/// Source of uniform indices in `0..bound`.
pub trait IndexSource {
    fn below(&mut self, bound: usize) -> usize;
}

/// Linear congruential fallback (not crypto secure), also handy for
/// deterministic tests.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }
}

impl IndexSource for Lcg {
    fn below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

/// Browser randomness via `crypto.getRandomValues`, degrading to an LCG seeded
/// from the performance clock when the crypto API is unavailable.
pub struct BrowserRandom {
    fallback: Lcg,
}

impl BrowserRandom {
    pub fn new() -> Self {
        let seed = web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0);
        Self { fallback: Lcg::new((seed * 1000.0) as u64 ^ 0x9e37_79b9_7f4a_7c15) }
    }
}

impl Default for BrowserRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexSource for BrowserRandom {
    fn below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        let mut buf = [0u8; 4];
        match getrandom::getrandom(&mut buf) {
            // Rejection sampling keeps the modulo unbiased.
            Ok(()) => {
                let bound32 = bound as u32;
                let zone = u32::MAX - (u32::MAX % bound32);
                let mut v = u32::from_le_bytes(buf);
                while v >= zone {
                    if getrandom::getrandom(&mut buf).is_err() {
                        return self.fallback.below(bound);
                    }
                    v = u32::from_le_bytes(buf);
                }
                (v % bound32) as usize
            }
            Err(_) => self.fallback.below(bound),
        }
    }
}

/// In-place Fisher–Yates.
pub fn shuffle<T>(items: &mut [T], rng: &mut impl IndexSource) {
    for i in (1..items.len()).rev() {
        let j = rng.below(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = Lcg::new(7);
        let original = vec!['a', 'b', 'c', 'd', 'e', 'f'];
        let mut letters = original.clone();
        for _ in 0..50 {
            shuffle(&mut letters, &mut rng);
            let mut sorted = letters.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, original);
        }
    }

    #[test]
    fn lcg_stays_in_bounds() {
        let mut rng = Lcg::new(42);
        for bound in 1..20 {
            for _ in 0..100 {
                assert!(rng.below(bound) < bound);
            }
        }
        assert_eq!(rng.below(0), 0);
    }

    #[test]
    fn every_position_is_reachable() {
        // With enough draws each letter should land in slot 0 at least once.
        let mut rng = Lcg::new(1);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            let mut letters = ['a', 'b', 'c', 'd', 'e', 'f'];
            shuffle(&mut letters, &mut rng);
            seen.insert(letters[0]);
        }
        assert_eq!(seen.len(), 6);
    }
}
