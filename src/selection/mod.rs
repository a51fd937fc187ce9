pub mod state;
pub mod group;

pub use state::SelectionState;
pub use group::{ExclusiveGroup, GroupView, OptionView, TARGET_GROUP, USER_GROUP};
