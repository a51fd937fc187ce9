use crate::catalog::TargetType;

/// Marks a unit that will not mega evolve this turn
pub const MEGA_MARK: &str = "？";

/// Placeholder action written for the generic "move" kind
pub const GENERIC_MOVE: &str = "ムーブ";

/// Formats the single-action line.
///
/// Moves without an explicit target keep a trailing space where the target
/// would go; single-target moves append the target directly (possibly empty).
pub fn format_single_command(
    user: &str,
    move_name: &str,
    target_type: TargetType,
    target: &str,
) -> String {
    if target_type.needs_target() {
        format!("{}{}{}", user, move_name, target)
    } else {
        format!("{}{} ", user, move_name)
    }
}

/// `<position><mega-mark?><move-name><target-suffix?>`
pub fn format_slot_move(
    position: u8,
    no_mega: bool,
    move_name: &str,
    target: Option<&str>,
) -> String {
    let mega = if no_mega { MEGA_MARK } else { "" };
    format!("{}{}{}{}", position, mega, move_name, target.unwrap_or(""))
}

pub fn format_slot_switch(position: u8, name: &str) -> String {
    format!("{}{}", position, name)
}

pub fn format_slot_generic(position: u8) -> String {
    format!("{}{}", position, GENERIC_MOVE)
}

/// Joins the non-empty slot contributions with single spaces
pub fn join_contributions<S: AsRef<str>>(contributions: &[S]) -> String {
    contributions
        .iter()
        .map(|c| c.as_ref())
        .filter(|c| !c.is_empty())
        .collect::<Vec<&str>>()
        .join(" ")
}
