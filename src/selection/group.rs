use serde::Serialize;

use super::state::SelectionState;
use crate::error::FormError;

/// Acting unit for the single-action form
pub const USER_GROUP: ExclusiveGroup = ExclusiveGroup {
    id: "user",
    labels: &["1", "2", "3"],
};

/// Target of a single-target move, opponents first then allies
pub const TARGET_GROUP: ExclusiveGroup = ExclusiveGroup {
    id: "target",
    labels: &["ア", "イ", "ウ", "1", "2", "3"],
};

/// A set of labeled toggles of which at most one is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusiveGroup {
    pub id: &'static str,
    pub labels: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub label: String,
    pub on: bool,
}

/// Snapshot of a group for the page to draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupView {
    pub id: String,
    pub options: Vec<OptionView>,
    pub selected: String,
}

impl ExclusiveGroup {
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| *l == label)
    }

    /// Turns `chosen` on and every sibling off
    pub fn select(&self, state: &mut SelectionState, chosen: &str) -> Result<(), FormError> {
        if !self.contains(chosen) {
            return Err(FormError::UnknownLabel {
                group: self.id.to_string(),
                label: chosen.to_string(),
            });
        }

        for label in self.labels {
            state.set_flag(self.id, label, *label == chosen);
        }
        Ok(())
    }

    /// First label that is on, in declared order, or `default`
    pub fn current(&self, state: &SelectionState, default: &str) -> String {
        self.labels
            .iter()
            .find(|label| state.flag(self.id, label))
            .map(|label| label.to_string())
            .unwrap_or_else(|| default.to_string())
    }

    pub fn is_on(&self, state: &SelectionState, label: &str) -> bool {
        state.flag(self.id, label)
    }

    pub fn view(&self, state: &SelectionState, default: &str) -> GroupView {
        GroupView {
            id: self.id.to_string(),
            options: self
                .labels
                .iter()
                .map(|label| OptionView {
                    label: label.to_string(),
                    on: self.is_on(state, label),
                })
                .collect(),
            selected: self.current(state, default),
        }
    }
}
