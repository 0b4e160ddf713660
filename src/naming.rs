//! Naming conversion between host export labels and engine script names.
//!
//! Host methods are exported under PascalCase labels; the engine's scripting
//! convention is lower_snake_case. Script-private methods start with `_` on
//! the engine side, which is not a usable marker in a PascalCase label, so
//! host labels carry the `X_` prefix instead: `X_Ready` registers as
//! `_ready`.
//!
//! For any valid export label (PascalCase, ASCII letters and digits, at most
//! one leading private marker) the conversion round-trips:
//! `to_host_name(to_engine_name(n)) == n`.

/// Private-method marker on host export labels.
pub const HOST_PRIVATE_PREFIX: &str = "X_";

/// Private-method marker in the engine's scripting convention.
pub const ENGINE_PRIVATE_PREFIX: char = '_';

/// Convert a PascalCase host export label to the engine's snake_case name.
///
/// A leading `X_` becomes a leading `_`.
pub fn to_engine_name(host_name: &str) -> String {
    let (private, rest) = match host_name.strip_prefix(HOST_PRIVATE_PREFIX) {
        Some(rest) => (true, rest),
        None => (false, host_name),
    };

    let mut out = String::with_capacity(rest.len() + 4);
    if private {
        out.push(ENGINE_PRIVATE_PREFIX);
    }
    for (i, ch) in rest.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Convert an engine snake_case method name back to its host export label.
///
/// A leading `_` becomes a leading `X_`.
pub fn to_host_name(engine_name: &str) -> String {
    let (private, rest) = match engine_name.strip_prefix(ENGINE_PRIVATE_PREFIX) {
        Some(rest) => (true, rest),
        None => (false, engine_name),
    };

    let mut out = String::with_capacity(rest.len() + 2);
    if private {
        out.push_str(HOST_PRIVATE_PREFIX);
    }
    let mut upper_next = true;
    for ch in rest.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Strip module path segments from a `std::any::type_name` string.
///
/// `my_game::player::Player` becomes `Player`; the result is the registered
/// class name.
pub fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}
