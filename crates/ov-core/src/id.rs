use lasso::{Spur, ThreadedRodeo};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for label IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Base-36 digits emitted per random chunk. Two chunks make one id.
const CHUNK_LEN: usize = 10;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A lightweight, interned identifier for text labels.
/// Internally a 4-byte `Spur` index.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelId(Spur);

impl LabelId {
    /// Intern a string as a LabelId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        LabelId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LabelId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LabelId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(LabelId::intern(&s))
    }
}

/// Produces random, collision-resistant label ids.
///
/// Ids are two base-36 chunks drawn from a `StdRng` (20 chars, ~103 bits).
/// Not cryptographic; the store still re-draws on the rare collision.
pub struct IdGenerator {
    rng: StdRng,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator: same seed, same id sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_id(&mut self) -> LabelId {
        let mut buf = String::with_capacity(CHUNK_LEN * 2);
        push_base36_chunk(&mut buf, self.rng.next_u64());
        push_base36_chunk(&mut buf, self.rng.next_u64());
        LabelId::intern(&buf)
    }
}

/// Append exactly `CHUNK_LEN` base-36 digits of `value` (low digits, zero-padded).
fn push_base36_chunk(buf: &mut String, mut value: u64) {
    let mut digits = [b'0'; CHUNK_LEN];
    for slot in digits.iter_mut().rev() {
        *slot = BASE36[(value % 36) as usize];
        value /= 36;
    }
    // digits only contains ASCII from BASE36
    buf.extend(digits.iter().map(|&b| b as char));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn interning_roundtrip() {
        let a = LabelId::intern("caption_1");
        let b = LabelId::intern("caption_1");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "caption_1");
    }

    #[test]
    fn generated_ids_are_base36() {
        let mut ids = IdGenerator::seeded(7);
        let id = ids.next_id();
        assert_eq!(id.as_str().len(), CHUNK_LEN * 2);
        assert!(
            id.as_str()
                .bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
        );
    }

    #[test]
    fn generated_ids_are_distinct() {
        let mut ids = IdGenerator::new();
        let seen: HashSet<LabelId> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn seeded_generators_repeat() {
        let mut a = IdGenerator::seeded(42);
        let mut b = IdGenerator::seeded(42);
        assert_eq!(a.next_id(), b.next_id());
        assert_eq!(a.next_id(), b.next_id());
    }

    #[test]
    fn base36_chunk_zero_pads() {
        let mut buf = String::new();
        push_base36_chunk(&mut buf, 35);
        assert_eq!(buf, "000000000z");
    }
}
