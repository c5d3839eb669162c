use rand::Rng as _;
use rand_pcg::Pcg32;

use super::seed::Seed;

/// Source of single die faces.
///
/// [`GameEngine`](super::GameEngine) sums one face per die for each roll, so a
/// scripted source gives exact control over whole games.
pub trait RollSource {
    /// Returns one face in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;
}

impl<T> RollSource for &mut T
where
    T: RollSource + ?Sized,
{
    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }
}

/// Fair dice backed by a seeded PCG generator.
#[derive(Debug, Clone)]
pub struct Dice {
    rng: Pcg32,
}

impl Default for Dice {
    fn default() -> Self {
        Self::new()
    }
}

impl Dice {
    /// Creates dice seeded from the thread-local generator.
    ///
    /// For reproducible rolls, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(Seed::generate(&mut rand::rng()))
    }

    #[must_use]
    pub fn with_seed(seed: Seed) -> Self {
        Self { rng: seed.rng() }
    }
}

impl RollSource for Dice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.rng.random_range(1..=sides)
    }
}

/// Dice that replay a fixed list of faces, cycling back to the start when exhausted.
///
/// # Example
///
/// ```
/// use shutbox_engine::{RollSource as _, ScriptedDice};
///
/// let mut dice = ScriptedDice::new([3, 5]);
/// assert_eq!(dice.roll_die(6), 3);
/// assert_eq!(dice.roll_die(6), 5);
/// assert_eq!(dice.roll_die(6), 3);
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    faces: Vec<u32>,
    next: usize,
}

impl ScriptedDice {
    /// # Panics
    ///
    /// Panics if `faces` is empty.
    #[must_use]
    pub fn new<I>(faces: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let faces: Vec<u32> = faces.into_iter().collect();
        assert!(!faces.is_empty(), "scripted dice need at least one face");
        Self { faces, next: 0 }
    }
}

impl RollSource for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let face = self.faces[self.next];
        self.next = (self.next + 1) % self.faces.len();
        debug_assert!((1..=sides).contains(&face), "face {face} exceeds {sides} sides");
        face
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dice_faces_in_range() {
        let mut dice = Dice::with_seed(Seed::from_u64(1));
        let mut seen = [false; 6];
        for _ in 0..600 {
            let face = dice.roll_die(6);
            assert!((1..=6).contains(&face));
            seen[face as usize - 1] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_seeded_dice_are_reproducible() {
        let mut a = Dice::with_seed(Seed::from_u64(99));
        let mut b = Dice::with_seed(Seed::from_u64(99));
        for _ in 0..50 {
            assert_eq!(a.roll_die(6), b.roll_die(6));
        }
    }

    #[test]
    fn test_one_sided_die() {
        let mut dice = Dice::with_seed(Seed::from_u64(5));
        assert!((0..20).all(|_| dice.roll_die(1) == 1));
    }
}
