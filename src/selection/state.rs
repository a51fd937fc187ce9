use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Toggle flags for one session, one record per group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    groups: BTreeMap<String, BTreeMap<String, bool>>, // group id -> label -> on
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag that was never written reads as off
    pub fn flag(&self, group_id: &str, label: &str) -> bool {
        self.groups
            .get(group_id)
            .and_then(|flags| flags.get(label))
            .copied()
            .unwrap_or(false)
    }

    pub fn set_flag(&mut self, group_id: &str, label: &str, on: bool) {
        self.groups
            .entry(group_id.to_string())
            .or_default()
            .insert(label.to_string(), on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_flags_are_off() {
        let state = SelectionState::new();
        assert!(!state.flag("user", "1"));
    }

    #[test]
    fn groups_do_not_share_labels() {
        let mut state = SelectionState::new();
        state.set_flag("user", "1", true);
        assert!(state.flag("user", "1"));
        assert!(!state.flag("target", "1"));

        state.set_flag("user", "1", false);
        assert!(!state.flag("user", "1"));
    }
}
