use std::{fmt, str::FromStr};

use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Seed for the deterministic random generators used by dice and agents.
///
/// A 128-bit seed written as a 32-digit hex string, both by [`fmt::Display`] and in
/// serialized form. The same seed always yields the same sequence, so games and
/// training runs can be reproduced.
///
/// # Example
///
/// ```
/// use rand::Rng as _;
/// use shutbox_engine::Seed;
///
/// let seed = Seed::generate(&mut rand::rng());
/// let mut a = seed.rng();
/// let mut b = seed.rng();
/// assert_eq!(a.random::<u32>(), b.random::<u32>());
///
/// let text = seed.to_string();
/// assert_eq!(text.len(), 32);
/// assert_eq!(text.parse::<Seed>().unwrap(), seed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Seed(u128);

const SEED_DIGITS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid seed {text:?}: expected {SEED_DIGITS} hex digits")]
pub struct ParseSeedError {
    text: String,
}

impl Seed {
    /// Expands a `u64` into a seed, for seeds given on the command line.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self(u128::from(value))
    }

    /// Draws a fresh seed from `rng`.
    pub fn generate<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self(rng.random())
    }

    /// Creates the generator this seed describes.
    #[must_use]
    pub fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0.to_be_bytes())
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$x}", self.0, width = SEED_DIGITS)
    }
}

impl FromStr for Seed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseSeedError { text: s.to_owned() };
        if s.len() != SEED_DIGITS || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        u128::from_str_radix(s, 16).map(Self).map_err(|_| invalid())
    }
}

impl From<Seed> for String {
    fn from(seed: Seed) -> Self {
        seed.to_string()
    }
}

impl TryFrom<String> for Seed {
    type Error = ParseSeedError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}
