use string_cache::DefaultAtom;

/// Intern a tag name, folded to ASCII lowercase so element name matching is
/// case-insensitive everywhere downstream.
pub fn intern_tag(name: &str) -> DefaultAtom {
    DefaultAtom::from(name.to_ascii_lowercase().as_str())
}

/// Intern an attribute name. Attribute names compare case-insensitively, so
/// the folded atom is the canonical key.
pub fn intern_attr_name(name: &str) -> DefaultAtom {
    DefaultAtom::from(name.to_ascii_lowercase().as_str())
}
