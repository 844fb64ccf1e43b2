//! Distinguished-name helpers.
//!
//! A DN is a comma-separated path, most specific component first. A comma
//! preceded by a backslash is part of the value, not a separator.

/// Byte offset of the first unescaped comma in `dn`.
fn first_separator(dn: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in dn.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ',' => return Some(idx),
            _ => {}
        }
    }
    None
}

/// The DN of the parent entry: everything after the first unescaped comma.
///
/// Returns `None` for a single-component DN.
pub fn parent_dn(dn: &str) -> Option<&str> {
    first_separator(dn).map(|idx| &dn[idx + 1..])
}

/// The left-most relative distinguished name.
pub fn rdn(dn: &str) -> &str {
    match first_separator(dn) {
        Some(idx) => &dn[..idx],
        None => dn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_dn() {
        assert_eq!(
            parent_dn("cn=admin,ou=users,dc=test"),
            Some("ou=users,dc=test")
        );
        assert_eq!(parent_dn("ou=users,dc=test"), Some("dc=test"));
        assert_eq!(parent_dn("dc=test"), None);
        assert_eq!(parent_dn(""), None);
    }

    #[test]
    fn test_parent_dn_skips_escaped_comma() {
        assert_eq!(
            parent_dn(r"cn=Smith\, John,ou=people,o=org"),
            Some("ou=people,o=org")
        );
        assert_eq!(parent_dn(r"cn=a\,b"), None);
    }

    #[test]
    fn test_parent_dn_escaped_backslash_before_comma() {
        // `\\` is an escaped backslash, so the following comma separates.
        assert_eq!(parent_dn(r"cn=a\\,o=org"), Some("o=org"));
    }

    #[test]
    fn test_parent_dn_keeps_spacing_verbatim() {
        assert_eq!(parent_dn("cn=x, o=org"), Some(" o=org"));
    }

    #[test]
    fn test_rdn() {
        assert_eq!(rdn("cn=admin,ou=users,dc=test"), "cn=admin");
        assert_eq!(rdn(r"cn=Smith\, John,o=org"), r"cn=Smith\, John");
        assert_eq!(rdn("dc=test"), "dc=test");
    }
}
