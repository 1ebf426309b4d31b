use std::collections::HashMap;
use std::sync::Mutex;

use super::GenerateError;

const ALPHANUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const COUPON_LEN: usize = 10;
const HEAD_LEN: usize = 5;
const MAX_USES_PER_CHAR: u8 = 2;
const PICKS_PER_CHAR: usize = 300;
const CODE_ATTEMPTS: usize = 300;

/// Produces syntactically plausible but invalid coupon codes.
///
/// Five characters from `A-Z0-9` followed by five from `A-Z`; no character repeats its
/// predecessor and none appears more than twice.
pub struct CouponGenerator {
    rng: Mutex<fastrand::Rng>,
}

impl Default for CouponGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CouponGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }

    pub fn generate_code(&self) -> Result<String, GenerateError> {
        // Poisoning leaves the RNG usable.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        for _ in 0..CODE_ATTEMPTS {
            if let Some(code) = try_build(&mut rng) {
                return Ok(code);
            }
        }
        Err(GenerateError::Exhausted {
            generator: "coupon",
            attempts: CODE_ATTEMPTS,
        })
    }
}

fn try_build(rng: &mut fastrand::Rng) -> Option<String> {
    let mut counts: HashMap<u8, u8> = HashMap::new();
    let mut out = String::with_capacity(COUPON_LEN);
    let mut prev: Option<u8> = None;

    for idx in 0..COUPON_LEN {
        let charset = if idx < HEAD_LEN { ALPHANUM } else { LETTERS };
        let ch = pick(rng, charset, prev, &counts)?;
        *counts.entry(ch).or_insert(0) += 1;
        out.push(ch as char);
        prev = Some(ch);
    }
    Some(out)
}

fn pick(
    rng: &mut fastrand::Rng,
    charset: &[u8],
    prev: Option<u8>,
    counts: &HashMap<u8, u8>,
) -> Option<u8> {
    (0..PICKS_PER_CHAR).find_map(|_| {
        let ch = charset[rng.usize(..charset.len())];
        let usable = prev != Some(ch) && counts.get(&ch).copied().unwrap_or(0) < MAX_USES_PER_CHAR;
        usable.then_some(ch)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(code: &str) {
        let bytes = code.as_bytes();
        assert_eq!(bytes.len(), COUPON_LEN, "{code}");
        assert!(bytes[..HEAD_LEN].iter().all(|c| ALPHANUM.contains(c)), "{code}");
        assert!(bytes[HEAD_LEN..].iter().all(|c| LETTERS.contains(c)), "{code}");
        assert!(bytes.windows(2).all(|w| w[0] != w[1]), "{code}");
        for c in bytes {
            assert!(bytes.iter().filter(|b| *b == c).count() <= 2, "{code}");
        }
    }

    #[test]
    fn generated_codes_respect_constraints() {
        let g = CouponGenerator::with_seed(42);
        for _ in 0..500 {
            assert_well_formed(&g.generate_code().unwrap());
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = CouponGenerator::with_seed(7);
        let b = CouponGenerator::with_seed(7);
        for _ in 0..5 {
            assert_eq!(a.generate_code().unwrap(), b.generate_code().unwrap());
        }
    }
}
