//! Zone resolution.
//!
//! Timezone database management is out of scope for this crate. What the
//! interpreter needs is narrow: a name consumed by `%Z` must resolve to an
//! offset, and formatting must know which zone to decompose a timestamp
//! into. [`ZoneResolver`] is that seam; callers with real database needs
//! implement it over whatever source they have. The shipped resolvers cover
//! UTC, anonymous fixed offsets, and small caller-built tables.

/// A resolved zone: an abbreviation (possibly empty), an offset east of
/// UTC in seconds, and whether daylight saving is in effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    abbreviation: String,
    offset: i32,
    dst: bool,
}

impl Zone {
    pub fn new(abbreviation: impl Into<String>, offset: i32, dst: bool) -> Self {
        Self { abbreviation: abbreviation.into(), offset, dst }
    }

    pub fn utc() -> Self {
        Self::new("UTC", 0, false)
    }

    /// The zone's abbreviation, which is what `%Z` renders. May be empty
    /// for zones that have none (anonymous fixed offsets).
    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    /// Seconds east of UTC
    pub const fn offset(&self) -> i32 {
        self.offset
    }

    pub const fn dst(&self) -> bool {
        self.dst
    }
}

/// The external capability both directions lean on: mapping parsed zone
/// names to offsets, and supplying the zone timestamps decompose into.
pub trait ZoneResolver {
    /// The zone a timestamp is decomposed into when formatting.
    fn zone(&self) -> Zone;

    /// Resolves a zone name consumed from parsed text.
    fn by_name(&self, name: &str) -> Option<Zone>;
}

/// Names that resolve without any configuration.
pub(crate) fn builtin(name: &str) -> Option<Zone> {
    if name.eq_ignore_ascii_case("UTC") || name.eq_ignore_ascii_case("GMT") {
        Some(Zone::utc())
    } else {
        None
    }
}

/// Resolves everything in UTC. The default for the top-level entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utc;

impl ZoneResolver for Utc {
    fn zone(&self) -> Zone {
        Zone::utc()
    }

    fn by_name(&self, name: &str) -> Option<Zone> {
        builtin(name)
    }
}

/// A fixed offset with no published abbreviation; `%Z` renders nothing
/// under it.
#[derive(Debug, Clone, Copy)]
pub struct FixedOffset {
    offset: i32,
}

impl FixedOffset {
    /// `offset` is in seconds east of UTC.
    pub const fn new(offset: i32) -> Self {
        Self { offset }
    }
}

impl ZoneResolver for FixedOffset {
    fn zone(&self) -> Zone {
        Zone::new("", self.offset, false)
    }

    fn by_name(&self, name: &str) -> Option<Zone> {
        builtin(name)
    }
}

/// A caller-built table of named zones.
///
/// Lookup is by abbreviation, ASCII case-insensitive. The table also
/// carries the zone used for formatting, UTC unless replaced.
#[derive(Debug, Clone)]
pub struct ZoneTable {
    local: Zone,
    entries: Vec<Zone>,
}

impl ZoneTable {
    pub fn new() -> Self {
        Self { local: Zone::utc(), entries: Vec::new() }
    }

    /// Replaces the zone timestamps decompose into when formatting.
    pub fn with_local(mut self, zone: Zone) -> Self {
        self.local = zone;
        self
    }

    /// Adds a named zone to the table.
    pub fn insert(&mut self, abbreviation: &str, offset: i32, dst: bool) {
        self.entries.push(Zone::new(abbreviation, offset, dst));
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneResolver for ZoneTable {
    fn zone(&self) -> Zone {
        self.local.clone()
    }

    fn by_name(&self, name: &str) -> Option<Zone> {
        self.entries
            .iter()
            .find(|zone| zone.abbreviation.eq_ignore_ascii_case(name))
            .cloned()
            .or_else(|| builtin(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        assert_eq!(builtin("UTC"), Some(Zone::utc()));
        assert_eq!(builtin("utc"), Some(Zone::utc()));
        assert_eq!(builtin("GMT"), Some(Zone::utc()));
        assert_eq!(builtin("gmt"), Some(Zone::utc()));
        assert_eq!(builtin("EST"), None);
    }

    #[test]
    fn test_utc_resolver() {
        let zone = Utc.zone();
        assert_eq!(zone.abbreviation(), "UTC");
        assert_eq!(zone.offset(), 0);
        assert!(!zone.dst());
    }

    #[test]
    fn test_fixed_offset_has_no_abbreviation() {
        let zone = FixedOffset::new(19_800).zone();
        assert_eq!(zone.abbreviation(), "");
        assert_eq!(zone.offset(), 19_800);
    }

    #[test]
    fn test_zone_table_lookup() {
        let mut table = ZoneTable::new();
        table.insert("EST", -5 * 3600, false);
        table.insert("EDT", -4 * 3600, true);

        let est = table.by_name("est").unwrap();
        assert_eq!(est.offset(), -18_000);
        assert!(!est.dst());

        let edt = table.by_name("EDT").unwrap();
        assert_eq!(edt.offset(), -14_400);
        assert!(edt.dst());

        // Builtins still resolve through a table
        assert_eq!(table.by_name("GMT"), Some(Zone::utc()));
        assert_eq!(table.by_name("PST"), None);
    }

    #[test]
    fn test_zone_table_local_zone() {
        let table = ZoneTable::new();
        assert_eq!(table.zone(), Zone::utc());

        let table =
            ZoneTable::new().with_local(Zone::new("CET", 3600, false));
        assert_eq!(table.zone().abbreviation(), "CET");
        assert_eq!(table.zone().offset(), 3600);
    }
}
