use serde::{Deserialize, Serialize};

use crate::catalog::{MoveCatalog, TargetType};
use crate::display::{format_slot_generic, format_slot_move, format_slot_switch, join_contributions};
use crate::error::FormError;

pub const SLOT_COUNT: usize = 3;
pub const EMPTY_OUTPUT_NOTICE: &str = "入力された行動はありません";

/// Longest switch name accepted, in characters. The whole form state has to
/// fit in one session cookie.
pub const MAX_SWITCH_NAME_CHARS: usize = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[default]
    Move,
    Switch,
    Generic,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [ActionKind::Move, ActionKind::Switch, ActionKind::Generic];

    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Move => "技",
            ActionKind::Switch => "交代",
            ActionKind::Generic => "ムーブ",
        }
    }
}

/// Target choice for a single-target move in the multi-action form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotTarget {
    /// Leave the target out of the command
    #[default]
    OmitFront,
    A,
    B,
    C,
    One,
    Two,
    Three,
}

impl SlotTarget {
    pub const ALL: [SlotTarget; 7] = [
        SlotTarget::OmitFront,
        SlotTarget::A,
        SlotTarget::B,
        SlotTarget::C,
        SlotTarget::One,
        SlotTarget::Two,
        SlotTarget::Three,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SlotTarget::OmitFront => "省略",
            SlotTarget::A => "Ａ",
            SlotTarget::B => "Ｂ",
            SlotTarget::C => "Ｃ",
            SlotTarget::One => "１",
            SlotTarget::Two => "２",
            SlotTarget::Three => "３",
        }
    }

    /// Text appended to the command, if any
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            SlotTarget::OmitFront => None,
            other => Some(other.label()),
        }
    }
}

/// Raw widget values of one slot, kept across kind changes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInput {
    pub kind: ActionKind,
    pub selected_move: Option<String>,
    pub no_mega: bool,
    pub target: SlotTarget,
    pub switch_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiFormState {
    pub slots: [SlotInput; SLOT_COUNT],
    /// Last non-empty switch name entered per slot
    pub name_cache: [Option<String>; SLOT_COUNT],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MultiEvent {
    SetKind { slot: u8, kind: ActionKind },
    SelectMove { slot: u8, name: Option<String> },
    SetNoMega { slot: u8, value: bool },
    SetTarget { slot: u8, target: SlotTarget },
    SetSwitchName { slot: u8, name: String },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceView<T> {
    pub id: T,
    pub label: &'static str,
    pub on: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotDetail {
    Move {
        selected_move: Option<String>,
        no_mega: bool,
        target_type: Option<TargetType>,
        /// Present only for single-target moves
        targets: Option<Vec<ChoiceView<SlotTarget>>>,
        notice: Option<String>,
    },
    Switch {
        name: String,
    },
    Generic,
}

/// One positional unit as derived for a single render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSlot {
    pub position: u8,
    pub kinds: Vec<ChoiceView<ActionKind>>,
    pub detail: SlotDetail,
    pub contribution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiView {
    pub slots: Vec<ActionSlot>,
    pub output: String,
    pub placeholder: Option<&'static str>,
    pub name_suggestions: Vec<String>,
}

fn slot_mut(state: &mut MultiFormState, slot: u8) -> Result<&mut SlotInput, FormError> {
    match slot {
        1..=3 => Ok(&mut state.slots[slot as usize - 1]),
        _ => Err(FormError::UnknownSlot(slot)),
    }
}

/// Applies one edit. A rejected edit leaves `state` as it was.
pub fn apply_multi_event(
    state: &mut MultiFormState,
    catalog: &MoveCatalog,
    event: MultiEvent,
) -> Result<(), FormError> {
    match event {
        MultiEvent::SetKind { slot, kind } => slot_mut(state, slot)?.kind = kind,
        MultiEvent::SelectMove { slot, name } => {
            let input = slot_mut(state, slot)?;
            if let Some(name) = &name {
                if catalog.lookup(name).is_none() {
                    return Err(FormError::UnknownMove(name.clone()));
                }
            }
            input.selected_move = name;
        }
        MultiEvent::SetNoMega { slot, value } => slot_mut(state, slot)?.no_mega = value,
        MultiEvent::SetTarget { slot, target } => slot_mut(state, slot)?.target = target,
        MultiEvent::SetSwitchName { slot, name } => {
            let len = name.chars().count();
            if len > MAX_SWITCH_NAME_CHARS {
                slot_mut(state, slot)?;
                return Err(FormError::SwitchNameTooLong {
                    slot,
                    len,
                    max: MAX_SWITCH_NAME_CHARS,
                });
            }
            let trimmed = name.trim().to_string();
            slot_mut(state, slot)?.switch_name = name;
            if !trimmed.is_empty() {
                state.name_cache[slot as usize - 1] = Some(trimmed);
            }
        }
        MultiEvent::Reset => *state = MultiFormState::default(),
    }
    Ok(())
}

fn render_move(position: u8, input: &SlotInput, catalog: &MoveCatalog) -> (SlotDetail, String) {
    let record = input
        .selected_move
        .as_deref()
        .and_then(|name| catalog.lookup(name).map(|record| (name, record)));

    let Some((move_name, record)) = record else {
        let detail = SlotDetail::Move {
            selected_move: None,
            no_mega: input.no_mega,
            target_type: None,
            targets: None,
            notice: None,
        };
        return (detail, String::new());
    };

    let target_type = record.target_type;
    let (targets, notice, suffix) = if target_type.needs_target() {
        let targets = SlotTarget::ALL
            .iter()
            .map(|t| ChoiceView {
                id: *t,
                label: t.label(),
                on: *t == input.target,
            })
            .collect();
        (Some(targets), None, input.target.suffix())
    } else {
        let notice = format!("対象タイプが {} のため対象選択は不要です", target_type);
        (None, Some(notice), None)
    };

    let contribution = format_slot_move(position, input.no_mega, move_name, suffix);
    let detail = SlotDetail::Move {
        selected_move: Some(move_name.to_string()),
        no_mega: input.no_mega,
        target_type: Some(target_type),
        targets,
        notice,
    };
    (detail, contribution)
}

fn render_slot(position: u8, input: &SlotInput, catalog: &MoveCatalog) -> ActionSlot {
    let (detail, contribution) = match input.kind {
        ActionKind::Move => render_move(position, input, catalog),
        ActionKind::Switch => {
            let name = input.switch_name.trim();
            let contribution = if name.is_empty() {
                String::new()
            } else {
                format_slot_switch(position, name)
            };
            let detail = SlotDetail::Switch {
                name: input.switch_name.clone(),
            };
            (detail, contribution)
        }
        ActionKind::Generic => (SlotDetail::Generic, format_slot_generic(position)),
    };

    ActionSlot {
        position,
        kinds: ActionKind::ALL
            .iter()
            .map(|k| ChoiceView {
                id: *k,
                label: k.label(),
                on: *k == input.kind,
            })
            .collect(),
        detail,
        contribution,
    }
}

/// Derives every slot and the joined output line from the current state
pub fn render_multi(state: &MultiFormState, catalog: &MoveCatalog) -> MultiView {
    let slots: Vec<ActionSlot> = state
        .slots
        .iter()
        .zip(1u8..)
        .map(|(input, position)| render_slot(position, input, catalog))
        .collect();

    let contributions: Vec<&str> = slots.iter().map(|s| s.contribution.as_str()).collect();
    let output = join_contributions(&contributions);
    let placeholder = if output.is_empty() { Some(EMPTY_OUTPUT_NOTICE) } else { None };

    let mut name_suggestions: Vec<String> = Vec::new();
    for name in state.name_cache.iter().flatten() {
        if !name_suggestions.contains(name) {
            name_suggestions.push(name.clone());
        }
    }

    MultiView {
        slots,
        output,
        placeholder,
        name_suggestions,
    }
}
