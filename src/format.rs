//! The formatting state machine.
//!
//! A [`Formatter`] walks the layout and emits into a bounded [`Sink`] over
//! the caller's buffer. Every write is bounds-checked; the first one that
//! would not fit fails the whole call, and no byte count is ever reported
//! for a failed call. Zero-padding widths come from the directive table.

use crate::consts::{
    MERIDIEM_NAMES, MONTH_ABBREVS, MONTH_NAMES, WEEKDAY_ABBREVS,
    WEEKDAY_NAMES,
};
use crate::fields::Civil;
use crate::table::{self, Entry, Kind};
use crate::{ArgError, Error};

pub(crate) struct Formatter<'c, 'b> {
    civil: &'c Civil,
    sink: Sink<'b>,
}

impl<'c, 'b> Formatter<'c, 'b> {
    pub(crate) fn new(civil: &'c Civil, buf: &'b mut [u8]) -> Self {
        Self { civil, sink: Sink { buf, len: 0 } }
    }

    /// Renders the whole layout, returning the byte count written.
    pub(crate) fn run(&mut self, layout: &str) -> Result<usize, Error> {
        self.walk(layout.as_bytes())?;
        Ok(self.sink.len)
    }

    fn walk(&mut self, mut layout: &[u8]) -> Result<(), Error> {
        while let Some(&byte) = layout.first() {
            if byte != b'%' {
                self.sink.push(byte)?;
                layout = &layout[1..];
                continue;
            }
            layout = &layout[1..];
            let code = *layout.first().ok_or(ArgError::DanglingPercent)?;
            let entry = table::lookup(code)
                .ok_or(ArgError::UnknownDirective(char::from(code)))?;
            layout = &layout[1..];
            match entry.kind {
                Kind::Numeric => self.numeric(entry)?,
                Kind::Textual => self.textual(code)?,
                Kind::Zone => self.zone(code)?,
                Kind::Composite => {
                    let Some(expanded) = table::expansion(code) else {
                        unreachable!(
                            "non-composite directive in composite path"
                        )
                    };
                    self.walk(expanded.as_bytes())?;
                }
                Kind::Literal => self.literal(code)?,
            }
        }
        Ok(())
    }

    fn numeric(&mut self, entry: &Entry) -> Result<(), Error> {
        let civil = self.civil;
        let value: i64 = match entry.code {
            b'Y' => i64::from(civil.year),
            b'y' => i64::from(civil.year % 100),
            b'm' => i64::from(civil.month),
            b'd' | b'e' => i64::from(civil.day),
            b'H' => i64::from(civil.hour),
            b'I' => {
                let hour = civil.hour % 12;
                i64::from(if hour == 0 { 12 } else { hour })
            }
            b'M' => i64::from(civil.minute),
            b'S' => i64::from(civil.second),
            b'j' => i64::from(civil.year_day),
            // Sunday=0 numbering renders as Monday=1..Sunday=7
            b'u' => {
                if civil.weekday == 0 {
                    7
                } else {
                    i64::from(civil.weekday)
                }
            }
            b'w' => i64::from(civil.weekday),
            _ => unreachable!("non-numeric directive in numeric path"),
        };
        let pad = if entry.code == b'e' { b' ' } else { b'0' };
        self.sink.number(value, usize::from(entry.width), pad)
    }

    fn textual(&mut self, code: u8) -> Result<(), Error> {
        let civil = self.civil;
        let name = match code {
            b'a' => WEEKDAY_ABBREVS[usize::from(civil.weekday)],
            b'A' => WEEKDAY_NAMES[usize::from(civil.weekday)],
            b'b' | b'h' => MONTH_ABBREVS[usize::from(civil.month - 1)],
            b'B' => MONTH_NAMES[usize::from(civil.month - 1)],
            b'p' => MERIDIEM_NAMES[usize::from(civil.hour >= 12)],
            _ => unreachable!("non-textual directive in textual path"),
        };
        self.sink.push_str(name)
    }

    fn zone(&mut self, code: u8) -> Result<(), Error> {
        if code == b'Z' {
            return self.sink.push_str(&self.civil.abbreviation);
        }
        // %z renders [+-]HHMM
        let offset = self.civil.offset;
        self.sink.push(if offset < 0 { b'-' } else { b'+' })?;
        let magnitude = i64::from(offset.unsigned_abs());
        self.sink.number(magnitude / 3600, 2, b'0')?;
        self.sink.number(magnitude % 3600 / 60, 2, b'0')
    }

    fn literal(&mut self, code: u8) -> Result<(), Error> {
        let byte = match code {
            b'%' => b'%',
            b'n' => b'\n',
            b't' => b'\t',
            _ => unreachable!("non-literal directive in literal path"),
        };
        self.sink.push(byte)
    }
}

/// A bounded byte sink over the caller's buffer.
struct Sink<'b> {
    buf: &'b mut [u8],
    len: usize,
}

impl Sink<'_> {
    fn push(&mut self, byte: u8) -> Result<(), Error> {
        let slot =
            self.buf.get_mut(self.len).ok_or(ArgError::BufTooShort)?;
        *slot = byte;
        self.len += 1;
        Ok(())
    }

    fn push_str(&mut self, s: &str) -> Result<(), Error> {
        for &byte in s.as_bytes() {
            self.push(byte)?;
        }
        Ok(())
    }

    /// Emits a non-negative number padded to `width` on the left.
    fn number(
        &mut self,
        value: i64,
        width: usize,
        pad: u8,
    ) -> Result<(), Error> {
        let mut digits = [0_u8; 20];
        let mut i = digits.len();
        let mut rest = value;
        loop {
            i -= 1;
            digits[i] = b'0' + (rest % 10) as u8;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }
        for _ in (digits.len() - i)..width {
            self.push(pad)?;
        }
        for &byte in &digits[i..] {
            self.push(byte)?;
        }
        Ok(())
    }
}
