use std::ops::RangeInclusive;

use crate::{
    InvalidHashError, InvalidMoveError,
    core::{BoxHash, Move, MovesHash, SwitchBox, enumerate_moves},
};

use super::{
    config::GameConfig,
    dice::{Dice, RollSource},
    seed::Seed,
};

/// A game of Shut the Box: the box of switches plus the dice.
///
/// The engine is reused across games; [`Self::reset`] starts a new one. Box state
/// is mutated in place by [`Self::apply_move`], so an engine must not be shared
/// between concurrently running games.
#[derive(Debug, Clone)]
pub struct GameEngine<D = Dice> {
    config: GameConfig,
    switches: SwitchBox,
    dice: D,
}

impl GameEngine<Dice> {
    /// Creates an engine with dice seeded from the thread-local generator.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self::with_dice(config, Dice::new())
    }

    /// Like [`Self::new`], but with seeded dice for reproducible games.
    #[must_use]
    pub fn with_seed(config: GameConfig, seed: Seed) -> Self {
        Self::with_dice(config, Dice::with_seed(seed))
    }
}

impl<D> GameEngine<D>
where
    D: RollSource,
{
    /// Creates an engine rolling from an arbitrary source.
    ///
    /// The box starts with every switch standing.
    #[must_use]
    pub fn with_dice(config: GameConfig, dice: D) -> Self {
        Self {
            config,
            switches: SwitchBox::full(config.box_high_num()),
            dice,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn dice_sides(&self) -> u32 {
        self.config.dice_sides()
    }

    #[must_use]
    pub fn num_dice(&self) -> u32 {
        self.config.num_dice()
    }

    #[must_use]
    pub fn box_high_num(&self) -> u8 {
        self.config.box_high_num()
    }

    /// Stands every switch back up.
    pub fn reset(&mut self) {
        self.switches = SwitchBox::full(self.config.box_high_num());
    }

    /// Rolls all dice and returns the total.
    pub fn roll_dice(&mut self) -> u32 {
        let sides = self.config.dice_sides();
        (0..self.config.num_dice())
            .map(|_| self.dice.roll_die(sides))
            .sum()
    }

    /// Flips down the numbers of `mv`.
    ///
    /// Fails without touching the box if any number is out of range or already
    /// down. The move is not checked against the last roll.
    pub fn apply_move(&mut self, mv: &Move) -> Result<(), InvalidMoveError> {
        self.switches.deactivate(mv)
    }

    /// Returns true iff every number has been flipped down.
    #[must_use]
    pub fn solved(&self) -> bool {
        self.switches.is_solved()
    }

    /// Returns a copy of the current box.
    #[must_use]
    pub fn switch_box(&self) -> SwitchBox {
        self.switches
    }

    /// Returns the standing numbers of the current box in ascending order.
    ///
    /// Use [`SwitchBox::active_numbers`] to inspect any other box.
    #[must_use]
    pub fn active_numbers(&self) -> Vec<u8> {
        self.switches.active_numbers()
    }

    /// Returns every roll total the dice can produce.
    #[must_use]
    pub fn all_possible_rolls(&self) -> RangeInclusive<u32> {
        self.config.rolls()
    }

    /// Returns the legal moves for `roll` on the current box, or `None` if stuck.
    #[must_use]
    pub fn actions(&self, roll: u32) -> Option<Vec<Move>> {
        enumerate_moves(&self.switches.active_numbers(), roll)
    }

    /// Returns the legal moves for `roll` on the box encoded by `hash`.
    pub fn actions_from_hash(
        &self,
        hash: BoxHash,
        roll: u32,
    ) -> Result<Option<Vec<Move>>, InvalidHashError> {
        let switches = self.box_from_hash(hash)?;
        Ok(enumerate_moves(&switches.active_numbers(), roll))
    }

    #[must_use]
    pub fn box_hash(&self) -> BoxHash {
        self.switches.hash()
    }

    pub fn box_from_hash(&self, hash: BoxHash) -> Result<SwitchBox, InvalidHashError> {
        SwitchBox::from_hash(hash, self.config.box_high_num())
    }

    #[must_use]
    pub fn moves_hash(&self, mv: &Move) -> MovesHash {
        mv.hash()
    }

    pub fn moves_from_hash(&self, hash: MovesHash) -> Result<Move, InvalidHashError> {
        Move::from_hash(hash, self.config.box_high_num())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dice::ScriptedDice;

    fn mv(values: &[u8]) -> Move {
        Move::new(values).unwrap()
    }

    #[test]
    fn test_new_engine_has_full_box() {
        let engine = GameEngine::with_seed(GameConfig::default(), Seed::from_u64(0));
        assert_eq!(engine.active_numbers(), (1..=9).collect::<Vec<_>>());
        assert_eq!(engine.box_hash().get(), 511);
        assert!(!engine.solved());
    }

    #[test]
    fn test_reset_restores_full_box() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), Seed::from_u64(0));
        engine.apply_move(&mv(&[3, 4])).unwrap();
        assert_eq!(engine.box_hash().get(), 511 - 4 - 8);
        engine.reset();
        assert_eq!(engine.box_hash().get(), 511);
    }

    #[test]
    fn test_solved_after_flipping_everything() {
        let config = GameConfig::new(6, 2, 4).unwrap();
        let mut engine = GameEngine::with_seed(config, Seed::from_u64(0));
        engine.apply_move(&mv(&[4, 1])).unwrap();
        assert!(!engine.solved());
        engine.apply_move(&mv(&[3, 2])).unwrap();
        assert!(engine.solved());
        assert!(engine.active_numbers().is_empty());
    }

    #[test]
    fn test_invalid_move_leaves_box_untouched() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), Seed::from_u64(0));
        engine.apply_move(&mv(&[5])).unwrap();
        let before = engine.switch_box();

        assert_eq!(
            engine.apply_move(&mv(&[1, 5])),
            Err(InvalidMoveError::NotActive { number: 5 })
        );
        assert_eq!(
            engine.apply_move(&mv(&[12])),
            Err(InvalidMoveError::OutOfRange {
                number: 12,
                box_high_num: 9
            })
        );
        assert_eq!(engine.switch_box(), before);
    }

    #[test]
    fn test_switch_box_is_idempotent() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), Seed::from_u64(0));
        engine.apply_move(&mv(&[2, 7])).unwrap();
        let first = engine.switch_box().switches();
        assert_eq!(engine.switch_box().switches(), first);
        assert_eq!(engine.switch_box().switches(), first);
    }

    #[test]
    fn test_roll_dice_in_range() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), Seed::from_u64(3));
        for _ in 0..500 {
            let roll = engine.roll_dice();
            assert!(engine.all_possible_rolls().contains(&roll));
        }
    }

    #[test]
    fn test_scripted_rolls() {
        let mut engine = GameEngine::with_dice(GameConfig::default(), ScriptedDice::new([6, 3, 1]));
        assert_eq!(engine.roll_dice(), 9);
        assert_eq!(engine.roll_dice(), 7);
        assert_eq!(engine.roll_dice(), 4);
    }

    #[test]
    fn test_actions_follow_current_box() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), Seed::from_u64(0));
        engine.apply_move(&mv(&[1, 2])).unwrap();
        let hashes: Vec<u64> = engine
            .actions(4)
            .unwrap()
            .iter()
            .map(|m| m.hash().get())
            .collect();
        assert_eq!(hashes, vec![1 << 4]);
        assert!(engine.actions(2).is_none());
    }

    #[test]
    fn test_actions_from_hash_matches_actions() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), Seed::from_u64(0));
        engine.apply_move(&mv(&[8, 3])).unwrap();
        for roll in engine.all_possible_rolls() {
            assert_eq!(
                engine.actions_from_hash(engine.box_hash(), roll).unwrap(),
                engine.actions(roll)
            );
        }
        assert!(engine.actions_from_hash(BoxHash::new(1 << 9), 5).is_err());
    }

    #[test]
    fn test_codecs_use_distinct_bit_conventions() {
        let config = GameConfig::default();
        let engine = GameEngine::with_seed(config, Seed::from_u64(0));
        let switches = engine.box_from_hash(BoxHash::new(0b11)).unwrap();
        assert_eq!(switches.active_numbers(), vec![1, 2]);

        let moves = engine.moves_from_hash(MovesHash::new(0b110)).unwrap();
        assert_eq!(moves.values(), &[1, 2]);
        assert_eq!(engine.moves_hash(&moves).get(), 0b110);
    }
}
