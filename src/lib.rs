mod consts;
mod fields;
mod format;
mod parse;
mod prelude;
mod table;
mod tz;
mod types;

pub use consts::*;
pub use fields::{Fields, Meridiem};
pub use table::{Entry, Kind, TABLE};
pub use types::{Day, Hour, Minute, Month, Second, Year};
pub use tz::{FixedOffset, Utc, Zone, ZoneResolver, ZoneTable};

use crate::fields::Civil;
use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// A point in time: a signed count of seconds since the Unix epoch,
/// 1970-01-01T00:00:00 UTC, at one-second resolution.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    Serialize,
    Deserialize,
)]
#[display(fmt = "{_0}")]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn new(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Returns the seconds since the Unix epoch
    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for Timestamp {
    fn from(seconds: i64) -> Self {
        Self(seconds)
    }
}

impl From<Timestamp> for i64 {
    fn from(t: Timestamp) -> Self {
        t.0
    }
}

/// The call was structurally invalid and no interpretation was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    #[error("invalid layout arg: layout is empty")]
    EmptyLayout,
    #[error("invalid value arg: value is empty")]
    EmptyValue,
    #[error("buf len is too short to accommodate a result")]
    BufTooShort,
    #[error("unrecognized directive `%{0}` in layout")]
    UnknownDirective(char),
    #[error("layout ends after a bare `%`")]
    DanglingPercent,
}

/// The layout and the data were individually valid but mutually
/// inconsistent. Retrying without changing an input cannot succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("unable to parse time: `%{directive}` did not match at byte {at}")]
    Parse { directive: char, at: usize },
    #[error("unable to parse time: expected `{expected}` at byte {at}")]
    Literal { expected: char, at: usize },
    #[error("unable to parse time: {value} is out of range for `%{directive}`")]
    Range { directive: char, value: i64 },
    #[error("unable to parse time: {remaining} unmatched bytes after the layout")]
    Trailing { remaining: usize },
    #[error("unable to parse time: unknown zone name `{name}`")]
    Zone { name: String },
    #[error(
        "unable to format time: result is empty; consider amending the layout or the nonzero policy"
    )]
    EmptyOutput,
}

/// The fields were consumed successfully but do not name a real calendar
/// moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    #[error("invalid time: year {0} is not in {min}-{max}", min = MIN_YEAR, max = MAX_YEAR)]
    Year(i64),
    #[error("invalid time: month {0} is not in 1-{max}", max = MAX_MONTH)]
    Month(u8),
    #[error("invalid time: day {day} is out of range for {year:04}-{month:02}")]
    Day { year: u16, month: u8, day: u8 },
    #[error("invalid time: hour {0} is not in 0-23")]
    Hour(u8),
    #[error("invalid time: minute {0} is not in 0-59")]
    Minute(u8),
    #[error("invalid time: second {0} is not in 0-60")]
    Second(u8),
    #[error("invalid time: day {doy} does not fall within year {year:04}")]
    DayOfYear { year: u16, doy: u16 },
    #[error("invalid time: weekday {weekday} does not fall on the resolved date")]
    Weekday { weekday: u8 },
    #[error("invalid time: timestamp {0} is outside the supported calendar range")]
    Unrepresentable(i64),
}

/// Any failure this crate reports. The three families are disjoint:
/// argument errors precede all interpretation, conversion errors mean the
/// layout and data disagree, and time errors mean the consumed fields do
/// not resolve to a real moment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Arg(#[from] ArgError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Time(#[from] TimeError),
}

/// Parses the time represented by `value` against the directives in
/// `layout` and resolves it to epoch seconds, in UTC unless the layout
/// itself carries a zone. The minimum resolution of the value is one
/// second.
///
/// # Errors
/// Returns `Error::Arg` for an empty value or layout or an unrecognized
/// directive, `Error::Convert` when the value does not match the layout,
/// and `Error::Time` when the matched fields do not name a real moment.
pub fn strptime(value: &str, layout: &str) -> Result<Timestamp, Error> {
    strptime_in(value, layout, &Utc)
}

/// Like [`strptime`], resolving `%Z` names through `resolver`.
///
/// # Errors
/// As [`strptime`].
pub fn strptime_in(
    value: &str,
    layout: &str,
    resolver: &dyn ZoneResolver,
) -> Result<Timestamp, Error> {
    if layout.is_empty() {
        return Err(ArgError::EmptyLayout.into());
    }
    if value.is_empty() {
        return Err(ArgError::EmptyValue.into());
    }
    let mut fields = Fields::new();
    parse::Parser::new(layout, value, &mut fields, resolver).run()?;
    fields.to_timestamp()
}

/// Formats `t` against the directives in `layout`, writing into `buf` and
/// returning the number of bytes written. Writes are all-or-nothing: when
/// any error is returned the contents of `buf` are unspecified and no
/// count is reported.
///
/// Some valid layouts legitimately produce zero bytes, which is otherwise
/// indistinguishable from a failed conversion. `nonzero` decides for the
/// caller: when true any zero-length result is an error, when false it is
/// a success with a count of zero.
///
/// # Errors
/// Returns `Error::Arg` when `buf` is empty under the `nonzero` policy,
/// when output exceeds `buf`, or for an unrecognized directive;
/// `Error::Convert` for a zero-length result under `nonzero`; and
/// `Error::Time` when `t` falls outside the supported calendar range.
pub fn strftime(
    t: Timestamp,
    layout: &str,
    buf: &mut [u8],
    nonzero: bool,
) -> Result<usize, Error> {
    strftime_in(t, layout, buf, nonzero, &Utc)
}

/// Like [`strftime`], decomposing `t` into the zone of `resolver`.
///
/// # Errors
/// As [`strftime`].
pub fn strftime_in(
    t: Timestamp,
    layout: &str,
    buf: &mut [u8],
    nonzero: bool,
    resolver: &dyn ZoneResolver,
) -> Result<usize, Error> {
    // The only case in which the cause of a zero-length result can be
    // determined without interpreting the layout
    if buf.is_empty() {
        return if nonzero {
            Err(ArgError::BufTooShort.into())
        } else {
            Ok(0)
        };
    }
    let civil = Civil::from_timestamp(t, &resolver.zone())?;
    let written = format::Formatter::new(&civil, buf).run(layout)?;
    if nonzero && written == 0 {
        return Err(ConvertError::EmptyOutput.into());
    }
    Ok(written)
}

/// Formats `t` into an owned string, retrying internally with a larger
/// buffer whenever capacity runs out.
///
/// # Errors
/// Returns `Error::Arg` for an unrecognized directive and `Error::Time`
/// when `t` falls outside the supported calendar range.
pub fn strftime_string(t: Timestamp, layout: &str) -> Result<String, Error> {
    let mut capacity = layout.len().max(1) * 4;
    loop {
        let mut buf = vec![0_u8; capacity];
        match strftime(t, layout, &mut buf, false) {
            Ok(written) => {
                buf.truncate(written);
                return Ok(String::from_utf8_lossy(&buf).into_owned());
            }
            Err(Error::Arg(ArgError::BufTooShort)) => capacity *= 2,
            Err(err) => return Err(err),
        }
    }
}
