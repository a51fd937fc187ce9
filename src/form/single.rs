use serde::{Deserialize, Serialize};

use crate::catalog::{MoveCatalog, TargetType};
use crate::display::format_single_command;
use crate::error::FormError;
use crate::selection::{ExclusiveGroup, GroupView, SelectionState, TARGET_GROUP, USER_GROUP};

pub const UNSELECTED_USER: &str = "未選択";
pub const NO_TARGET_NOTICE: &str = "この技は対象選択が不要です";

/// Everything the single-action form keeps between requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleFormState {
    pub selected_move: Option<String>,
    pub selection: SelectionState,
}

/// A user edit posted by the page
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SingleEvent {
    SelectMove { name: Option<String> },
    Toggle { group: String, label: String },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleView {
    pub selected_move: Option<String>,
    /// Absent until a move is chosen
    pub body: Option<SingleBody>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleBody {
    pub target_type: TargetType,
    pub caption: String,
    pub user: GroupView,
    pub target: TargetSection,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetSection {
    Choose { group: GroupView },
    NotNeeded { notice: &'static str },
}

fn group_by_id(id: &str) -> Option<ExclusiveGroup> {
    [USER_GROUP, TARGET_GROUP].into_iter().find(|g| g.id == id)
}

/// Applies one edit. A rejected edit leaves `state` as it was.
pub fn apply_single_event(
    state: &mut SingleFormState,
    catalog: &MoveCatalog,
    event: SingleEvent,
) -> Result<(), FormError> {
    match event {
        SingleEvent::SelectMove { name: Some(name) } => {
            if catalog.lookup(&name).is_none() {
                return Err(FormError::UnknownMove(name));
            }
            state.selected_move = Some(name);
        }
        SingleEvent::SelectMove { name: None } => {
            state.selected_move = None;
        }
        SingleEvent::Toggle { group, label } => {
            let group = group_by_id(&group).ok_or(FormError::UnknownGroup(group))?;
            group.select(&mut state.selection, &label)?;
        }
        SingleEvent::Reset => {
            *state = SingleFormState::default();
        }
    }
    Ok(())
}

/// Derives the visible form and the output line from the current state
pub fn render_single(state: &SingleFormState, catalog: &MoveCatalog) -> SingleView {
    let selected = state
        .selected_move
        .as_deref()
        .and_then(|name| catalog.lookup(name).map(|record| (name, record)));

    let Some((move_name, record)) = selected else {
        return SingleView {
            selected_move: None,
            body: None,
        };
    };

    let target_type = record.target_type;
    let user = USER_GROUP.view(&state.selection, UNSELECTED_USER);

    let (target, selected_target) = if target_type.needs_target() {
        let group = TARGET_GROUP.view(&state.selection, "");
        let selected = group.selected.clone();
        (TargetSection::Choose { group }, selected)
    } else {
        (TargetSection::NotNeeded { notice: NO_TARGET_NOTICE }, String::new())
    };

    let output = format_single_command(&user.selected, move_name, target_type, &selected_target);

    SingleView {
        selected_move: Some(move_name.to_string()),
        body: Some(SingleBody {
            target_type,
            caption: format!("対象タイプ: {}", target_type),
            user,
            target,
            output,
        }),
    }
}
