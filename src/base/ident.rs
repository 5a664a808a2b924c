//! Identifier validation.

/// Check that `name` is a syntactically legal identifier.
///
/// Identifiers follow the Unicode XID rules with `_` allowed as a leading
/// character, matching what the generated code will accept.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || unicode_ident::is_xid_start(c) => {}
        _ => return false,
    }
    chars.all(unicode_ident::is_xid_continue)
}
