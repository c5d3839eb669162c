//! Epsilon-greedy action selection.
//!
//! One Bernoulli draw with success probability `epsilon` decides the branch:
//!
//! - **Greedy** (probability `epsilon`): the action with the highest estimate. Ties
//!   go to the leftmost action, so the result is deterministic given the values.
//! - **Explore** (probability `1 - epsilon`): an action chosen uniformly at random.
//!
//! Note that `epsilon` is the probability of exploiting, not of exploring:
//! `epsilon = 1` always plays greedily.

use rand::Rng;

use crate::value_table::ActionValue;

/// Which branch of the policy produced a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Branch {
    Greedy,
    Explore,
}

/// Index of the chosen action within the state's action list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub index: usize,
    pub branch: Branch,
}

/// Returns the index of the highest estimate, the leftmost one among ties.
#[must_use]
pub fn greedy_index(actions: &[ActionValue]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, action) in actions.iter().enumerate() {
        match best {
            Some((_, value)) if action.value() <= value => {}
            _ => best = Some((i, action.value())),
        }
    }
    best.map(|(i, _)| i)
}

/// Picks an action epsilon-greedily.
///
/// Returns `None` when there is no action to pick from.
///
/// # Panics
///
/// Panics if `epsilon` is not in `[0, 1]`.
pub fn epsilon_greedy<R>(
    actions: Option<&[ActionValue]>,
    epsilon: f64,
    rng: &mut R,
) -> Option<Choice>
where
    R: Rng + ?Sized,
{
    let actions = actions.filter(|a| !a.is_empty())?;
    if rng.random_bool(epsilon) {
        let index = greedy_index(actions)?;
        Some(Choice {
            index,
            branch: Branch::Greedy,
        })
    } else {
        Some(Choice {
            index: rng.random_range(0..actions.len()),
            branch: Branch::Explore,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand_pcg::Pcg32;
    use shutbox_engine::{BoxHash, GameConfig, GameEngine, Seed};

    use super::*;
    use crate::value_table::{ActionKey, Initializer, StateKey, ValueKey, ValueTable};

    const FULL_ROLL_NINE: StateKey = StateKey::new(BoxHash::new(511), 9);

    fn table() -> ValueTable {
        let engine = GameEngine::with_seed(GameConfig::default(), Seed::from_u64(0));
        let mut rng: Pcg32 = Seed::from_u64(1).rng();
        ValueTable::build(&engine, Initializer::Random, &mut rng).unwrap()
    }

    #[test]
    fn test_absent_actions() {
        let mut rng = Seed::from_u64(2).rng();
        assert_eq!(epsilon_greedy(None, 0.5, &mut rng), None);
        assert_eq!(epsilon_greedy(Some(&[][..]), 0.5, &mut rng), None);
    }

    #[test]
    fn test_epsilon_one_is_always_greedy() {
        let table = table();
        let actions = table.actions(FULL_ROLL_NINE);
        let best = greedy_index(actions.unwrap()).unwrap();
        let mut rng = Seed::from_u64(3).rng();
        for _ in 0..200 {
            let choice = epsilon_greedy(actions, 1.0, &mut rng).unwrap();
            assert_eq!(choice.branch, Branch::Greedy);
            assert_eq!(choice.index, best);
        }
    }

    #[test]
    fn test_epsilon_zero_always_explores() {
        let table = table();
        let actions = table.actions(FULL_ROLL_NINE);
        let mut rng = Seed::from_u64(4).rng();
        let mut seen = vec![false; actions.unwrap().len()];
        for _ in 0..500 {
            let choice = epsilon_greedy(actions, 0.0, &mut rng).unwrap();
            assert!(choice.branch.is_explore());
            seen[choice.index] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_greedy_picks_maximum() {
        let mut table = table();
        let actions = table.actions(FULL_ROLL_NINE).unwrap();
        let target = actions[3].moves_hash();
        table
            .set(
                ValueKey {
                    state: FULL_ROLL_NINE,
                    action: ActionKey::Move(target),
                },
                5.0,
            )
            .unwrap();
        let actions = table.actions(FULL_ROLL_NINE).unwrap();
        assert_eq!(greedy_index(actions), Some(3));
    }

    #[test]
    fn test_ties_go_to_leftmost() {
        let engine = GameEngine::with_seed(GameConfig::default(), Seed::from_u64(0));
        let mut rng: Pcg32 = Seed::from_u64(1).rng();
        let table = ValueTable::build(&engine, Initializer::One, &mut rng).unwrap();
        let actions = table.actions(FULL_ROLL_NINE).unwrap();
        assert_eq!(greedy_index(actions), Some(0));
    }
}
