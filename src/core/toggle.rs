/// Outcome of flipping an id's membership in a reference set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Flips `id` in `members`: appends it when absent, otherwise removes it.
///
/// `members` is treated as a set, so stray duplicates are removed along with
/// the match.
pub fn toggle_member(members: &mut Vec<String>, id: &str) -> Toggled {
    if members.iter().any(|m| m == id) {
        members.retain(|m| m != id);
        Toggled::Removed
    } else {
        members.push(id.to_string());
        Toggled::Added
    }
}
