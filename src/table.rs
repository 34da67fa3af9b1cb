//! The directive table: one entry per supported percent directive, giving
//! its kind, numeric range, and minimum rendered width. Both the parser and
//! the formatter recognize directives exclusively through [`lookup`], so an
//! unsupported letter fails identically in both directions.

/// How a directive consumes or produces text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// A bounded decimal number (`%Y`, `%m`, `%H`, ...)
    Numeric,
    /// A name matched against a locale table (`%a`, `%B`, `%p`, ...)
    Textual,
    /// A timezone offset or name (`%z`, `%Z`)
    Zone,
    /// Shorthand for an equivalent sub-pattern (`%F`, `%T`, ...)
    Composite,
    /// Emits or matches literal text (`%%`, `%n`, `%t`)
    Literal,
}

/// One row of the directive table.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    /// The directive letter, without the leading percent
    pub code: u8,
    pub kind: Kind,
    /// Smallest accepted numeric value (numeric directives only)
    pub min: i64,
    /// Largest accepted numeric value (numeric directives only)
    pub max: i64,
    /// Minimum rendered width; numeric parsing consumes at most this many
    /// digits
    pub width: u8,
    /// Whether rendering depends on the locale name tables
    pub locale: bool,
}

impl Entry {
    const fn numeric(code: u8, min: i64, max: i64, width: u8) -> Self {
        Self { code, kind: Kind::Numeric, min, max, width, locale: false }
    }

    const fn textual(code: u8) -> Self {
        Self { code, kind: Kind::Textual, min: 0, max: 0, width: 0, locale: true }
    }

    const fn zone(code: u8) -> Self {
        Self { code, kind: Kind::Zone, min: 0, max: 0, width: 0, locale: false }
    }

    const fn composite(code: u8) -> Self {
        Self { code, kind: Kind::Composite, min: 0, max: 0, width: 0, locale: false }
    }

    const fn literal(code: u8) -> Self {
        Self { code, kind: Kind::Literal, min: 0, max: 0, width: 0, locale: false }
    }
}

/// Every directive this crate understands.
pub const TABLE: &[Entry] = &[
    Entry::numeric(b'Y', 1, 9999, 4),
    Entry::numeric(b'y', 0, 99, 2),
    Entry::numeric(b'm', 1, 12, 2),
    Entry::numeric(b'd', 1, 31, 2),
    Entry::numeric(b'e', 1, 31, 2),
    Entry::numeric(b'H', 0, 23, 2),
    Entry::numeric(b'I', 1, 12, 2),
    Entry::numeric(b'M', 0, 59, 2),
    Entry::numeric(b'S', 0, 60, 2),
    Entry::numeric(b'j', 1, 366, 3),
    Entry::numeric(b'u', 1, 7, 1),
    Entry::numeric(b'w', 0, 6, 1),
    Entry::textual(b'a'),
    Entry::textual(b'A'),
    Entry::textual(b'b'),
    Entry::textual(b'B'),
    Entry::textual(b'h'),
    Entry::textual(b'p'),
    Entry::zone(b'z'),
    Entry::zone(b'Z'),
    Entry::composite(b'D'),
    Entry::composite(b'F'),
    Entry::composite(b'T'),
    Entry::composite(b'R'),
    Entry::literal(b'%'),
    Entry::literal(b'n'),
    Entry::literal(b't'),
];

/// Looks up the table entry for a directive letter.
pub fn lookup(code: u8) -> Option<&'static Entry> {
    TABLE.iter().find(|entry| entry.code == code)
}

/// The sub-pattern a composite directive stands for.
pub(crate) const fn expansion(code: u8) -> Option<&'static str> {
    match code {
        b'D' => Some("%m/%d/%y"),
        b'F' => Some("%Y-%m-%d"),
        b'T' => Some("%H:%M:%S"),
        b'R' => Some("%H:%M"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known() {
        let entry = lookup(b'Y').unwrap();
        assert_eq!(entry.kind, Kind::Numeric);
        assert_eq!(entry.width, 4);
        assert_eq!((entry.min, entry.max), (1, 9999));

        let entry = lookup(b'S').unwrap();
        assert_eq!(entry.max, 60, "leap second is within the grammar");

        assert_eq!(lookup(b'Z').unwrap().kind, Kind::Zone);
        assert_eq!(lookup(b'%').unwrap().kind, Kind::Literal);
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(lookup(b'Q').is_none());
        assert!(lookup(b'G').is_none());
        assert!(lookup(b'0').is_none());
    }

    #[test]
    fn test_textual_entries_are_locale_dependent() {
        for code in [b'a', b'A', b'b', b'B', b'h', b'p'] {
            assert!(lookup(code).unwrap().locale, "%{} is locale-bound", code as char);
        }
        assert!(!lookup(b'Y').unwrap().locale);
    }

    #[test]
    fn test_composite_expansions() {
        for entry in TABLE {
            let expanded = expansion(entry.code);
            assert_eq!(
                expanded.is_some(),
                entry.kind == Kind::Composite,
                "%{} expansion disagrees with its table kind",
                entry.code as char
            );
        }
        assert_eq!(expansion(b'F'), Some("%Y-%m-%d"));
        assert_eq!(expansion(b'T'), Some("%H:%M:%S"));
    }
}
