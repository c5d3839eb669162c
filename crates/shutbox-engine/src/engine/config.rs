use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, core::MAX_BOX_HIGH_NUM};

/// Dice and box dimensions of a game, fixed for the lifetime of an engine.
///
/// The classic game uses two six-sided dice and nine switches, which is the
/// [`Default`].
///
/// Deserialization runs the same validation as [`GameConfig::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedGameConfig")]
pub struct GameConfig {
    dice_sides: u32,
    num_dice: u32,
    box_high_num: u8,
}

#[derive(Deserialize)]
struct UncheckedGameConfig {
    dice_sides: u32,
    num_dice: u32,
    box_high_num: u8,
}

impl TryFrom<UncheckedGameConfig> for GameConfig {
    type Error = ConfigError;

    fn try_from(value: UncheckedGameConfig) -> Result<Self, Self::Error> {
        Self::new(value.dice_sides, value.num_dice, value.box_high_num)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            dice_sides: 6,
            num_dice: 2,
            box_high_num: 9,
        }
    }
}

impl GameConfig {
    pub fn new(dice_sides: u32, num_dice: u32, box_high_num: u8) -> Result<Self, ConfigError> {
        if dice_sides == 0 {
            return Err(ConfigError::NoDiceSides);
        }
        if num_dice == 0 {
            return Err(ConfigError::NoDice);
        }
        if box_high_num == 0 || box_high_num > MAX_BOX_HIGH_NUM {
            return Err(ConfigError::BoxHighNum {
                box_high_num,
                max: MAX_BOX_HIGH_NUM,
            });
        }
        if dice_sides.checked_mul(num_dice).is_none() {
            return Err(ConfigError::RollOverflow {
                dice_sides,
                num_dice,
            });
        }
        Ok(Self {
            dice_sides,
            num_dice,
            box_high_num,
        })
    }

    #[must_use]
    pub const fn dice_sides(&self) -> u32 {
        self.dice_sides
    }

    #[must_use]
    pub const fn num_dice(&self) -> u32 {
        self.num_dice
    }

    #[must_use]
    pub const fn box_high_num(&self) -> u8 {
        self.box_high_num
    }

    /// Returns every roll total the dice can produce, in ascending order.
    #[must_use]
    pub const fn rolls(&self) -> RangeInclusive<u32> {
        self.num_dice..=self.num_dice * self.dice_sides
    }

    /// Returns the number of distinct roll totals.
    #[must_use]
    pub const fn roll_count(&self) -> u32 {
        self.num_dice * (self.dice_sides - 1) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rolls() {
        let config = GameConfig::default();
        assert_eq!(config.rolls().collect::<Vec<_>>(), (2..=12).collect::<Vec<_>>());
        assert_eq!(config.roll_count(), 11);
    }

    #[test]
    fn test_validation() {
        assert_eq!(GameConfig::new(0, 2, 9), Err(ConfigError::NoDiceSides));
        assert_eq!(GameConfig::new(6, 0, 9), Err(ConfigError::NoDice));
        assert!(matches!(
            GameConfig::new(6, 2, 0),
            Err(ConfigError::BoxHighNum { .. })
        ));
        assert!(matches!(
            GameConfig::new(6, 2, MAX_BOX_HIGH_NUM + 1),
            Err(ConfigError::BoxHighNum { .. })
        ));
        assert!(matches!(
            GameConfig::new(u32::MAX, 2, 9),
            Err(ConfigError::RollOverflow { .. })
        ));
        assert_eq!(GameConfig::new(1, 1, 1).unwrap().rolls(), 1..=1);
    }

    #[test]
    fn test_deserialize_validates() {
        let config: GameConfig =
            serde_json::from_str(r#"{"dice_sides":4,"num_dice":3,"box_high_num":6}"#).unwrap();
        assert_eq!(config, GameConfig::new(4, 3, 6).unwrap());

        let invalid: Result<GameConfig, _> =
            serde_json::from_str(r#"{"dice_sides":4,"num_dice":0,"box_high_num":6}"#);
        assert!(invalid.is_err());
    }
}
