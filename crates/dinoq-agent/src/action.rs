use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Largest action set arity.
pub const MAX_ACTIONS: usize = 4;

/// Discrete action sets the controller can choose from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum ActionSet {
    /// `[Jump, NoOp]`. A jump chosen while airborne is replaced by `NoOp`.
    #[default]
    Binary,
    /// `[Jump×1, Jump×2, Jump×3, NoOp]`. Extra presses are scheduled on later
    /// ticks.
    MultiJump,
}

/// One discrete choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Press jump `presses` times.
    Jump { presses: u8 },
    NoOp,
}

impl Action {
    /// Number of jump presses this action issues.
    #[must_use]
    pub fn presses(self) -> u8 {
        match self {
            Self::Jump { presses } => presses,
            Self::NoOp => 0,
        }
    }
}

impl ActionSet {
    #[must_use]
    pub fn actions(self) -> ArrayVec<Action, MAX_ACTIONS> {
        let mut actions = ArrayVec::new();
        match self {
            Self::Binary => actions.push(Action::Jump { presses: 1 }),
            Self::MultiJump => {
                for presses in 1..=3 {
                    actions.push(Action::Jump { presses });
                }
            }
        }
        actions.push(Action::NoOp);
        actions
    }

    /// Number of actions (the approximator's output length).
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::Binary => 2,
            Self::MultiJump => 4,
        }
    }

    #[must_use]
    pub fn action(self, index: usize) -> Option<Action> {
        self.actions().get(index).copied()
    }

    /// `NoOp` is always the last action.
    #[must_use]
    pub fn noop_index(self) -> usize {
        self.arity() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_layout() {
        assert_eq!(
            ActionSet::Binary.actions().as_slice(),
            &[Action::Jump { presses: 1 }, Action::NoOp]
        );
        let multi = ActionSet::MultiJump.actions();
        assert_eq!(multi.len(), ActionSet::MultiJump.arity());
        assert_eq!(multi[2], Action::Jump { presses: 3 });
        for set in [ActionSet::Binary, ActionSet::MultiJump] {
            assert_eq!(set.actions().len(), set.arity());
            assert_eq!(set.action(set.noop_index()), Some(Action::NoOp));
            assert_eq!(set.action(set.arity()), None);
        }
    }

    #[test]
    fn test_presses() {
        assert_eq!(Action::Jump { presses: 2 }.presses(), 2);
        assert_eq!(Action::NoOp.presses(), 0);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ActionSet::MultiJump).unwrap();
        assert_eq!(json, r#""multi_jump""#);
    }
}
