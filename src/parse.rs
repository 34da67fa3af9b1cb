//! The parsing state machine.
//!
//! A [`Parser`] holds a cursor pair, one over the layout and one over the
//! value, and walks the layout a token at a time. Literals must match at
//! the value cursor (a whitespace literal matches any run of whitespace,
//! including an empty one); directives consume the longest valid prefix
//! their grammar admits and write the result into the [`Fields`]
//! accumulator. Parsing is strict: value bytes left over once the layout
//! is exhausted fail the parse.

use crate::consts::{
    CENTURY_HIGH, CENTURY_LOW, CENTURY_PIVOT, MERIDIEM_NAMES, MONTH_ABBREVS,
    MONTH_NAMES, WEEKDAY_ABBREVS, WEEKDAY_NAMES,
};
use crate::fields::{Fields, Meridiem};
use crate::table::{self, Entry, Kind};
use crate::tz::{self, ZoneResolver};
use crate::{ArgError, ConvertError, Error};

pub(crate) struct Parser<'l, 'v, 'a> {
    layout: &'l [u8],
    value: &'v [u8],
    /// Length of the whole value, for error positions
    value_len: usize,
    fields: &'a mut Fields,
    resolver: &'a dyn ZoneResolver,
}

impl<'l, 'v, 'a> Parser<'l, 'v, 'a> {
    pub(crate) fn new(
        layout: &'l str,
        value: &'v str,
        fields: &'a mut Fields,
        resolver: &'a dyn ZoneResolver,
    ) -> Self {
        Self {
            layout: layout.as_bytes(),
            value: value.as_bytes(),
            value_len: value.len(),
            fields,
            resolver,
        }
    }

    /// Walks the whole layout and enforces that the value is fully
    /// consumed.
    pub(crate) fn run(&mut self) -> Result<(), Error> {
        self.tokens()?;
        if !self.value.is_empty() {
            return Err(ConvertError::Trailing {
                remaining: self.value.len(),
            }
            .into());
        }
        Ok(())
    }

    fn tokens(&mut self) -> Result<(), Error> {
        while let Some(&byte) = self.layout.first() {
            if byte != b'%' {
                self.literal(byte)?;
                continue;
            }
            self.bump_layout();
            let code =
                *self.layout.first().ok_or(ArgError::DanglingPercent)?;
            let entry = table::lookup(code)
                .ok_or(ArgError::UnknownDirective(char::from(code)))?;
            self.bump_layout();
            match entry.kind {
                Kind::Numeric => self.numeric(entry)?,
                Kind::Textual => self.textual(code)?,
                Kind::Zone => self.zone(code)?,
                Kind::Composite => self.composite(code)?,
                Kind::Literal => self.literal_directive(code)?,
            }
        }
        Ok(())
    }

    /// Position of the value cursor, for error reporting.
    fn at(&self) -> usize {
        self.value_len - self.value.len()
    }

    fn bump_layout(&mut self) {
        self.layout = &self.layout[1..];
    }

    fn bump_value(&mut self, n: usize) {
        self.value = &self.value[n..];
    }

    fn skip_whitespace(&mut self) {
        while self.value.first().is_some_and(u8::is_ascii_whitespace) {
            self.bump_value(1);
        }
    }

    /// A literal layout byte. Whitespace matches a run of zero or more
    /// whitespace bytes; anything else must match exactly.
    fn literal(&mut self, byte: u8) -> Result<(), Error> {
        if byte.is_ascii_whitespace() {
            self.skip_whitespace();
        } else if self.value.first() == Some(&byte) {
            self.bump_value(1);
        } else {
            return Err(ConvertError::Literal {
                expected: char::from(byte),
                at: self.at(),
            }
            .into());
        }
        self.bump_layout();
        Ok(())
    }

    /// `%%`, `%n` and `%t`.
    fn literal_directive(&mut self, code: u8) -> Result<(), Error> {
        if code == b'%' {
            if self.value.first() != Some(&b'%') {
                return Err(ConvertError::Literal {
                    expected: '%',
                    at: self.at(),
                }
                .into());
            }
            self.bump_value(1);
        } else {
            self.skip_whitespace();
        }
        Ok(())
    }

    fn numeric(&mut self, entry: &Entry) -> Result<(), Error> {
        let code = entry.code;
        // %e tolerates the leading pad spaces it emits
        if code == b'e' {
            while self.value.first() == Some(&b' ') {
                self.bump_value(1);
            }
        }
        let value = self.number(usize::from(entry.width), code)?;
        if !(entry.min..=entry.max).contains(&value) {
            return Err(ConvertError::Range {
                directive: char::from(code),
                value,
            }
            .into());
        }
        match code {
            b'Y' => self.fields.year = Some(value as u16),
            b'y' => self.fields.year = Some(century(value as u8)),
            b'm' => self.fields.month = Some(value as u8),
            b'd' | b'e' => self.fields.day = Some(value as u8),
            b'H' | b'I' => self.fields.hour = Some(value as u8),
            b'M' => self.fields.minute = Some(value as u8),
            b'S' => self.fields.second = Some(value as u8),
            b'j' => self.fields.year_day = Some(value as u16),
            // Monday=1..Sunday=7 folds onto the Sunday=0 numbering
            b'u' => self.fields.weekday = Some((value % 7) as u8),
            b'w' => self.fields.weekday = Some(value as u8),
            _ => unreachable!("non-numeric directive in numeric path"),
        }
        Ok(())
    }

    /// Consumes up to `max_digits` decimal digits, at least one.
    fn number(&mut self, max_digits: usize, code: u8) -> Result<i64, Error> {
        let mut n: i64 = 0;
        let mut digits = 0;
        while digits < max_digits {
            match self.value.get(digits) {
                Some(byte) if byte.is_ascii_digit() => {
                    n = n * 10 + i64::from(byte - b'0');
                    digits += 1;
                }
                _ => break,
            }
        }
        if digits == 0 {
            return Err(ConvertError::Parse {
                directive: char::from(code),
                at: self.at(),
            }
            .into());
        }
        self.bump_value(digits);
        Ok(n)
    }

    fn textual(&mut self, code: u8) -> Result<(), Error> {
        match code {
            b'a' | b'A' => {
                let index =
                    self.name(&WEEKDAY_NAMES, &WEEKDAY_ABBREVS, code)?;
                self.fields.weekday = Some(index as u8);
            }
            b'b' | b'B' | b'h' => {
                let index = self.name(&MONTH_NAMES, &MONTH_ABBREVS, code)?;
                self.fields.month = Some(index as u8 + 1);
            }
            b'p' => {
                let index =
                    self.name(&MERIDIEM_NAMES, &MERIDIEM_NAMES, code)?;
                self.fields.meridiem = Some(if index == 0 {
                    Meridiem::Am
                } else {
                    Meridiem::Pm
                });
            }
            _ => unreachable!("non-textual directive in textual path"),
        }
        Ok(())
    }

    /// Matches a name from the locale tables, ASCII case-insensitively.
    /// The longest matching candidate wins, so `June` is consumed whole
    /// rather than as `Jun` plus a stray byte, and both the full and the
    /// abbreviated form are accepted for either directive variant.
    fn name<const N: usize>(
        &mut self,
        full: &[&str; N],
        abbrevs: &[&str; N],
        code: u8,
    ) -> Result<usize, Error> {
        let mut best: Option<(usize, usize)> = None;
        for list in [full.as_slice(), abbrevs.as_slice()] {
            for (index, candidate) in list.iter().enumerate() {
                let len = candidate.len();
                if self.value.len() >= len
                    && self.value[..len]
                        .eq_ignore_ascii_case(candidate.as_bytes())
                    && best.is_none_or(|(_, best_len)| len > best_len)
                {
                    best = Some((index, len));
                }
            }
        }
        let (index, len) = best.ok_or(ConvertError::Parse {
            directive: char::from(code),
            at: self.at(),
        })?;
        self.bump_value(len);
        Ok(index)
    }

    fn zone(&mut self, code: u8) -> Result<(), Error> {
        if code == b'z' { self.offset() } else { self.zone_name() }
    }

    /// `%z`: `[+-]HHMM`, with an optional colon between hours and minutes.
    fn offset(&mut self) -> Result<(), Error> {
        let sign = match self.value.first() {
            Some(&b'+') => 1_i32,
            Some(&b'-') => -1_i32,
            _ => {
                return Err(ConvertError::Parse {
                    directive: 'z',
                    at: self.at(),
                }
                .into());
            }
        };
        self.bump_value(1);
        let hours = self.fixed_digits(2, b'z')?;
        if self.value.first() == Some(&b':') {
            self.bump_value(1);
        }
        let minutes = self.fixed_digits(2, b'z')?;
        if hours > 23 || minutes > 59 {
            return Err(ConvertError::Range {
                directive: 'z',
                value: i64::from(hours * 100 + minutes),
            }
            .into());
        }
        self.fields.offset = Some(sign * (hours * 3600 + minutes * 60));
        Ok(())
    }

    fn fixed_digits(&mut self, count: usize, code: u8) -> Result<i32, Error> {
        if self.value.len() < count
            || !self.value[..count].iter().all(u8::is_ascii_digit)
        {
            return Err(ConvertError::Parse {
                directive: char::from(code),
                at: self.at(),
            }
            .into());
        }
        let mut n = 0_i32;
        for byte in &self.value[..count] {
            n = n * 10 + i32::from(byte - b'0');
        }
        self.bump_value(count);
        Ok(n)
    }

    /// `%Z`: a run of alphabetic bytes resolved through the zone resolver.
    fn zone_name(&mut self) -> Result<(), Error> {
        let len = self
            .value
            .iter()
            .take_while(|byte| byte.is_ascii_alphabetic())
            .count();
        if len == 0 {
            return Err(ConvertError::Parse {
                directive: 'Z',
                at: self.at(),
            }
            .into());
        }
        let name: String =
            self.value[..len].iter().map(|&byte| char::from(byte)).collect();
        let zone = self
            .resolver
            .by_name(&name)
            .or_else(|| tz::builtin(&name))
            .ok_or_else(|| ConvertError::Zone { name: name.clone() })?;
        self.bump_value(len);
        self.fields.offset = Some(zone.offset());
        self.fields.dst = Some(zone.dst());
        self.fields.zone_abbreviation =
            Some(zone.abbreviation().to_owned());
        Ok(())
    }

    /// A composite directive recurses on its equivalent sub-layout.
    fn composite(&mut self, code: u8) -> Result<(), Error> {
        let Some(expanded) = table::expansion(code) else {
            unreachable!("non-composite directive in composite path")
        };
        let mut sub = Parser {
            layout: expanded.as_bytes(),
            value: self.value,
            value_len: self.value_len,
            fields: &mut *self.fields,
            resolver: self.resolver,
        };
        sub.tokens()?;
        self.value = sub.value;
        Ok(())
    }
}

/// The fixed century rule for two-digit years.
fn century(two_digit: u8) -> u16 {
    if two_digit >= CENTURY_PIVOT {
        CENTURY_HIGH + u16::from(two_digit)
    } else {
        CENTURY_LOW + u16::from(two_digit)
    }
}
