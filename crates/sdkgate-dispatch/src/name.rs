//! Operation name derivation.
//!
//! An operation's identity is an implementation-level path such as
//! `sdkgate::ops::send_message` or `app::Conversation::get_all-fm`. The event
//! tag clients see is the last meaningful segment, cut at the first `-`, in
//! `UpperCamelCase`: `SendMessage`, `GetAll`.

/// Event tag used when no name can be derived.
pub const FUNC_ERROR_EVENT: &str = "FuncError";

/// Derive the client-facing operation name from an identity string.
///
/// Returns `None` when nothing usable remains.
pub fn derive_operation_name(identity: &str) -> Option<String> {
    let path = strip_generics(identity);
    let last = path
        .split("::")
        .flat_map(|seg| seg.split('.'))
        .filter(|seg| !seg.is_empty() && !seg.starts_with('{'))
        .last()?;
    let trimmed = last.split('-').next().unwrap_or_default().trim();
    let name = to_upper_camel(trimmed);
    (!name.is_empty()).then_some(name)
}

fn strip_generics(identity: &str) -> String {
    let mut depth = 0_usize;
    identity
        .chars()
        .filter(|c| match c {
            '<' => {
                depth += 1;
                false
            }
            '>' => {
                depth = depth.saturating_sub(1);
                false
            }
            _ => depth == 0,
        })
        .collect()
}

fn to_upper_camel(segment: &str) -> String {
    segment
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect()
}
