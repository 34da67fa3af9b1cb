//! The calendar-field accumulator shared by both directions.
//!
//! Parsing fills a [`Fields`] one directive at a time and resolves it to a
//! [`Timestamp`] at the end; formatting decomposes a timestamp into every
//! field up front and renders from there. Fields a pattern never mentions
//! stay unset and take fixed defaults at resolution: year 1900, first of
//! January, midnight, UTC.

use crate::consts::{
    DAYS_BEFORE_MONTH, DAYS_PER_ERA, DAYS_PER_WEEK, DAYS_PER_YEAR,
    DEFAULT_YEAR, EPOCH_ERA_DAYS, EPOCH_WEEKDAY, FEBRUARY, JANUARY,
    MAX_MONTH, MAX_YEAR, MIN_DAY, MIN_YEAR, SECONDS_PER_DAY,
    SECONDS_PER_HOUR, SECONDS_PER_MINUTE, YEARS_PER_ERA,
};
use crate::tz::Zone;
use crate::types::{
    Day, Hour, Minute, Month, Second, Year, days_in_month, days_in_year,
    is_leap_year,
};
use crate::{Error, TimeError, Timestamp};

/// The half-day marker parsed by `%p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

/// A partially populated calendar moment.
///
/// Every component is optional; resolution applies the documented defaults
/// and rejects combinations that do not name a real moment. Validation
/// happens at resolution, not at assignment, because directive-subset
/// patterns legitimately leave fields unset or momentarily inconsistent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    pub(crate) year: Option<u16>,
    pub(crate) month: Option<u8>,
    pub(crate) day: Option<u8>,
    pub(crate) hour: Option<u8>,
    pub(crate) minute: Option<u8>,
    pub(crate) second: Option<u8>,
    pub(crate) meridiem: Option<Meridiem>,
    /// Weekday with Sunday = 0
    pub(crate) weekday: Option<u8>,
    /// Day of the year, 1-366
    pub(crate) year_day: Option<u16>,
    /// Seconds east of UTC
    pub(crate) offset: Option<i32>,
    pub(crate) zone_abbreviation: Option<String>,
    pub(crate) dst: Option<bool>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn year(&self) -> Option<u16> {
        self.year
    }

    pub const fn month(&self) -> Option<u8> {
        self.month
    }

    pub const fn day(&self) -> Option<u8> {
        self.day
    }

    pub const fn hour(&self) -> Option<u8> {
        self.hour
    }

    pub const fn minute(&self) -> Option<u8> {
        self.minute
    }

    pub const fn second(&self) -> Option<u8> {
        self.second
    }

    pub const fn meridiem(&self) -> Option<Meridiem> {
        self.meridiem
    }

    /// Weekday with Sunday = 0
    pub const fn weekday(&self) -> Option<u8> {
        self.weekday
    }

    /// Day of the year, 1-366
    pub const fn year_day(&self) -> Option<u16> {
        self.year_day
    }

    /// Seconds east of UTC
    pub const fn offset(&self) -> Option<i32> {
        self.offset
    }

    pub fn zone_abbreviation(&self) -> Option<&str> {
        self.zone_abbreviation.as_deref()
    }

    pub const fn dst(&self) -> Option<bool> {
        self.dst
    }

    pub fn set_year(&mut self, year: u16) {
        self.year = Some(year);
    }

    pub fn set_month(&mut self, month: u8) {
        self.month = Some(month);
    }

    pub fn set_day(&mut self, day: u8) {
        self.day = Some(day);
    }

    pub fn set_hour(&mut self, hour: u8) {
        self.hour = Some(hour);
    }

    pub fn set_minute(&mut self, minute: u8) {
        self.minute = Some(minute);
    }

    pub fn set_second(&mut self, second: u8) {
        self.second = Some(second);
    }

    pub fn set_meridiem(&mut self, meridiem: Meridiem) {
        self.meridiem = Some(meridiem);
    }

    /// Weekday with Sunday = 0
    pub fn set_weekday(&mut self, weekday: u8) {
        self.weekday = Some(weekday);
    }

    /// Day of the year, 1-366
    pub fn set_year_day(&mut self, year_day: u16) {
        self.year_day = Some(year_day);
    }

    /// Seconds east of UTC
    pub fn set_offset(&mut self, offset: i32) {
        self.offset = Some(offset);
    }

    /// Resolves the accumulated fields into epoch seconds.
    ///
    /// Unset fields take the documented defaults. A day of year supplied
    /// without a month and day derives them; supplied alongside them it
    /// must agree. A weekday must match the resolved date. A second of 60
    /// folds onto 59.
    ///
    /// # Errors
    /// Returns `Error::Time` when the fields do not name a real calendar
    /// moment.
    pub fn to_timestamp(&self) -> Result<Timestamp, Error> {
        let year = Year::new(self.year.unwrap_or(DEFAULT_YEAR))?;
        let y = year.get();

        let (month_raw, day_raw) = match (self.month, self.day, self.year_day)
        {
            (None, None, Some(doy)) => month_day_from_year_day(y, doy)?,
            (month, day, _) => {
                (month.unwrap_or(JANUARY), day.unwrap_or(MIN_DAY))
            }
        };
        let month = Month::new(month_raw)?;
        let day = Day::new(day_raw, y, month.get())?;

        if let Some(doy) = self.year_day {
            let computed = year_day(y, month.get(), day.get());
            if computed != doy {
                return Err(TimeError::DayOfYear { year: y, doy }.into());
            }
        }

        let hour = Hour::new(self.hour.unwrap_or(0))?;
        let hour = match self.meridiem {
            Some(Meridiem::Am) => hour.get() % 12,
            Some(Meridiem::Pm) => hour.get() % 12 + 12,
            None => hour.get(),
        };
        let minute = Minute::new(self.minute.unwrap_or(0))?;
        let second = Second::new(self.second.unwrap_or(0))?;

        let days = days_from_civil(i64::from(y), month.get(), day.get());

        if let Some(weekday) = self.weekday {
            if weekday != weekday_from_days(days) {
                return Err(TimeError::Weekday { weekday }.into());
            }
        }

        let clock = i64::from(hour) * SECONDS_PER_HOUR
            + i64::from(minute.get()) * SECONDS_PER_MINUTE
            + i64::from(second.clamped());
        let offset = i64::from(self.offset.unwrap_or(0));

        Ok(Timestamp::new(days * SECONDS_PER_DAY + clock - offset))
    }

    /// Decomposes a timestamp into fully populated fields under `zone`.
    ///
    /// # Errors
    /// Returns `Error::Time` when the moment falls outside years 1-9999.
    pub fn from_timestamp(t: Timestamp, zone: &Zone) -> Result<Self, Error> {
        let civil = Civil::from_timestamp(t, zone)?;
        Ok(Self {
            year: Some(civil.year),
            month: Some(civil.month),
            day: Some(civil.day),
            hour: Some(civil.hour),
            minute: Some(civil.minute),
            second: Some(civil.second),
            meridiem: Some(if civil.hour < 12 {
                Meridiem::Am
            } else {
                Meridiem::Pm
            }),
            weekday: Some(civil.weekday),
            year_day: Some(civil.year_day),
            offset: Some(civil.offset),
            zone_abbreviation: Some(civil.abbreviation),
            dst: Some(civil.dst),
        })
    }
}

/// A fully populated calendar moment, what the formatter renders from.
/// Unlike [`Fields`], nothing here is optional.
#[derive(Debug, Clone)]
pub(crate) struct Civil {
    pub(crate) year: u16,
    pub(crate) month: u8,
    pub(crate) day: u8,
    pub(crate) hour: u8,
    pub(crate) minute: u8,
    pub(crate) second: u8,
    /// Sunday = 0
    pub(crate) weekday: u8,
    pub(crate) year_day: u16,
    pub(crate) offset: i32,
    pub(crate) abbreviation: String,
    pub(crate) dst: bool,
}

impl Civil {
    pub(crate) fn from_timestamp(
        t: Timestamp,
        zone: &Zone,
    ) -> Result<Self, Error> {
        let local = t
            .get()
            .checked_add(i64::from(zone.offset()))
            .ok_or(TimeError::Unrepresentable(t.get()))?;
        let days = local.div_euclid(SECONDS_PER_DAY);
        let rem = local.rem_euclid(SECONDS_PER_DAY);

        let (y, month, day) = civil_from_days(days);
        if !(i64::from(MIN_YEAR)..=i64::from(MAX_YEAR)).contains(&y) {
            return Err(TimeError::Unrepresentable(t.get()).into());
        }
        let year = y as u16;

        Ok(Self {
            year,
            month,
            day,
            hour: (rem / SECONDS_PER_HOUR) as u8,
            minute: (rem % SECONDS_PER_HOUR / SECONDS_PER_MINUTE) as u8,
            second: (rem % SECONDS_PER_MINUTE) as u8,
            weekday: weekday_from_days(days),
            year_day: year_day(year, month, day),
            offset: zone.offset(),
            abbreviation: zone.abbreviation().to_owned(),
            dst: zone.dst(),
        })
    }
}

/// Days since the Unix epoch for a proleptic-Gregorian date.
///
/// Rotates the year to start in March so the leap day lands at the end,
/// then counts in 400-year eras. See
/// <http://howardhinnant.github.io/date_algorithms.html#days_from_civil>.
pub(crate) fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let y = if month <= FEBRUARY { year - 1 } else { year };
    let era = y.div_euclid(YEARS_PER_ERA);
    let yoe = y - era * YEARS_PER_ERA;
    let mp = if month > FEBRUARY {
        i64::from(month) - 3
    } else {
        i64::from(month) + 9
    };
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * DAYS_PER_YEAR + yoe / 4 - yoe / 100 + doy;
    era * DAYS_PER_ERA + doe - EPOCH_ERA_DAYS
}

/// Inverse of [`days_from_civil`]. See
/// <http://howardhinnant.github.io/date_algorithms.html#civil_from_days>.
pub(crate) fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + EPOCH_ERA_DAYS;
    let era = z.div_euclid(DAYS_PER_ERA);
    let doe = z.rem_euclid(DAYS_PER_ERA);
    // Subtract the 4-yearly leap days, restore the centennial ones, drop
    // the quadricentennial one
    let yoe =
        (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / DAYS_PER_YEAR;
    let y = yoe + era * YEARS_PER_ERA;
    let doy = doe - (DAYS_PER_YEAR * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
    let year = if month <= FEBRUARY { y + 1 } else { y };
    (year, month, day)
}

/// Weekday for a day count since the epoch, Sunday = 0.
pub(crate) fn weekday_from_days(days: i64) -> u8 {
    (days + EPOCH_WEEKDAY).rem_euclid(DAYS_PER_WEEK) as u8
}

/// One-indexed day of the year for a date.
pub(crate) fn year_day(year: u16, month: u8, day: u8) -> u16 {
    DAYS_BEFORE_MONTH[usize::from(month)]
        + u16::from(day)
        + u16::from(month > FEBRUARY && is_leap_year(year))
}

/// Derives (month, day) from a one-indexed day of the year.
fn month_day_from_year_day(
    year: u16,
    doy: u16,
) -> Result<(u8, u8), TimeError> {
    if !(1..=days_in_year(year)).contains(&doy) {
        return Err(TimeError::DayOfYear { year, doy });
    }
    let mut remaining = doy;
    for month in JANUARY..=MAX_MONTH {
        let len = u16::from(days_in_month(year, month));
        if remaining <= len {
            return Ok((month, remaining as u8));
        }
        remaining -= len;
    }
    Err(TimeError::DayOfYear { year, doy })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tz::Zone;

    fn ymd(year: u16, month: u8, day: u8) -> Fields {
        let mut fields = Fields::new();
        fields.set_year(year);
        fields.set_month(month);
        fields.set_day(day);
        fields
    }

    #[test]
    fn test_epoch_is_zero() {
        assert_eq!(ymd(1970, 1, 1).to_timestamp().unwrap().get(), 0);
    }

    #[test]
    fn test_known_timestamps() {
        assert_eq!(
            ymd(2023, 6, 15).to_timestamp().unwrap().get(),
            1_686_787_200
        );
        // Leap day
        assert_eq!(
            ymd(2024, 2, 29).to_timestamp().unwrap().get(),
            1_709_164_800
        );
        // Pre-epoch
        assert_eq!(
            ymd(1969, 12, 31).to_timestamp().unwrap().get(),
            -86_400
        );
    }

    #[test]
    fn test_clock_fields() {
        let mut fields = ymd(2023, 6, 15);
        fields.set_hour(13);
        fields.set_minute(45);
        fields.set_second(30);
        assert_eq!(
            fields.to_timestamp().unwrap().get(),
            1_686_787_200 + 13 * 3600 + 45 * 60 + 30
        );
    }

    #[test]
    fn test_defaults_resolve_to_1900() {
        // No fields at all: 1900-01-01T00:00:00Z
        let fields = Fields::new();
        assert_eq!(fields.to_timestamp().unwrap().get(), -2_208_988_800);

        // A clock-only pattern resolves on the default date
        let mut fields = Fields::new();
        fields.set_hour(23);
        fields.set_minute(59);
        assert_eq!(
            fields.to_timestamp().unwrap().get(),
            -2_208_988_800 + 23 * 3600 + 59 * 60
        );
    }

    #[test]
    fn test_leap_second_folds_onto_59() {
        let mut fields = ymd(1970, 1, 1);
        fields.set_hour(23);
        fields.set_minute(59);
        fields.set_second(60);
        assert_eq!(fields.to_timestamp().unwrap().get(), 86_399);
    }

    #[test]
    fn test_invalid_day_for_month() {
        let result = ymd(2023, 2, 29).to_timestamp();
        assert!(matches!(
            result,
            Err(Error::Time(TimeError::Day { year: 2023, month: 2, day: 29 }))
        ));
        assert!(ymd(2023, 4, 31).to_timestamp().is_err());
    }

    #[test]
    fn test_year_out_of_range() {
        let mut fields = Fields::new();
        fields.set_year(0);
        assert!(matches!(
            fields.to_timestamp(),
            Err(Error::Time(TimeError::Year(0)))
        ));
    }

    #[test]
    fn test_year_day_derives_date() {
        let mut fields = Fields::new();
        fields.set_year(2023);
        fields.set_year_day(166);
        // Day 166 of 2023 is June 15
        assert_eq!(fields.to_timestamp().unwrap().get(), 1_686_787_200);

        // Day 60 differs between leap and non-leap years
        let mut fields = Fields::new();
        fields.set_year(2024);
        fields.set_year_day(60);
        let t = fields.to_timestamp().unwrap();
        let civil = Civil::from_timestamp(t, &Zone::utc()).unwrap();
        assert_eq!((civil.month, civil.day), (2, 29));
    }

    #[test]
    fn test_year_day_must_agree_with_date() {
        let mut fields = ymd(2023, 6, 15);
        fields.set_year_day(166);
        assert!(fields.to_timestamp().is_ok());

        fields.set_year_day(167);
        assert!(matches!(
            fields.to_timestamp(),
            Err(Error::Time(TimeError::DayOfYear { year: 2023, doy: 167 }))
        ));
    }

    #[test]
    fn test_year_day_range() {
        let mut fields = Fields::new();
        fields.set_year(2023);
        fields.set_year_day(366);
        assert!(fields.to_timestamp().is_err(), "2023 has 365 days");

        let mut fields = Fields::new();
        fields.set_year(2024);
        fields.set_year_day(366);
        assert!(fields.to_timestamp().is_ok(), "2024 has 366 days");
    }

    #[test]
    fn test_weekday_cross_check() {
        // 2023-06-15 was a Thursday (4)
        let mut fields = ymd(2023, 6, 15);
        fields.set_weekday(4);
        assert!(fields.to_timestamp().is_ok());

        fields.set_weekday(2);
        assert!(matches!(
            fields.to_timestamp(),
            Err(Error::Time(TimeError::Weekday { weekday: 2 }))
        ));
    }

    #[test]
    fn test_meridiem_mapping() {
        let mut fields = ymd(1970, 1, 1);
        fields.set_hour(11);
        fields.set_meridiem(Meridiem::Pm);
        assert_eq!(fields.to_timestamp().unwrap().get(), 23 * 3600);

        // 12 AM is midnight, 12 PM is noon
        let mut fields = ymd(1970, 1, 1);
        fields.set_hour(12);
        fields.set_meridiem(Meridiem::Am);
        assert_eq!(fields.to_timestamp().unwrap().get(), 0);

        let mut fields = ymd(1970, 1, 1);
        fields.set_hour(12);
        fields.set_meridiem(Meridiem::Pm);
        assert_eq!(fields.to_timestamp().unwrap().get(), 12 * 3600);
    }

    #[test]
    fn test_offset_shifts_the_instant() {
        let mut fields = ymd(2023, 6, 15);
        fields.set_offset(19_800); // +05:30
        assert_eq!(
            fields.to_timestamp().unwrap().get(),
            1_686_787_200 - 19_800
        );
    }

    #[test]
    fn test_decomposition() {
        let fields =
            Fields::from_timestamp(Timestamp::new(1_686_787_200), &Zone::utc())
                .unwrap();
        assert_eq!(fields.year(), Some(2023));
        assert_eq!(fields.month(), Some(6));
        assert_eq!(fields.day(), Some(15));
        assert_eq!(fields.hour(), Some(0));
        assert_eq!(fields.minute(), Some(0));
        assert_eq!(fields.second(), Some(0));
        assert_eq!(fields.weekday(), Some(4), "a Thursday");
        assert_eq!(fields.year_day(), Some(166));
        assert_eq!(fields.meridiem(), Some(Meridiem::Am));
        assert_eq!(fields.zone_abbreviation(), Some("UTC"));
        assert_eq!(fields.offset(), Some(0));
        assert_eq!(fields.dst(), Some(false));
    }

    #[test]
    fn test_decomposition_under_offset_zone() {
        // Epoch under +05:30 is 1970-01-01T05:30:00
        let zone = Zone::new("IST", 19_800, false);
        let fields =
            Fields::from_timestamp(Timestamp::new(0), &zone).unwrap();
        assert_eq!(fields.hour(), Some(5));
        assert_eq!(fields.minute(), Some(30));
        assert_eq!(fields.zone_abbreviation(), Some("IST"));
    }

    #[test]
    fn test_decomposition_pre_epoch() {
        let fields =
            Fields::from_timestamp(Timestamp::new(-1), &Zone::utc()).unwrap();
        assert_eq!(fields.year(), Some(1969));
        assert_eq!(fields.month(), Some(12));
        assert_eq!(fields.day(), Some(31));
        assert_eq!(fields.hour(), Some(23));
        assert_eq!(fields.minute(), Some(59));
        assert_eq!(fields.second(), Some(59));
    }

    #[test]
    fn test_decomposition_out_of_range() {
        // Beyond year 9999
        let result =
            Fields::from_timestamp(Timestamp::new(260_000_000_000), &Zone::utc());
        assert!(matches!(
            result,
            Err(Error::Time(TimeError::Unrepresentable(_)))
        ));
        // Before year 1
        let result =
            Fields::from_timestamp(Timestamp::new(-63_000_000_000), &Zone::utc());
        assert!(result.is_err());
    }

    #[test]
    fn test_round_trip_through_civil() {
        for &t in &[
            0_i64,
            1,
            -1,
            86_400,
            -86_400,
            1_686_787_200,
            1_709_164_800,
            -2_208_988_800,
        ] {
            let fields =
                Fields::from_timestamp(Timestamp::new(t), &Zone::utc())
                    .unwrap();
            assert_eq!(fields.to_timestamp().unwrap().get(), t, "t = {t}");
        }
    }

    #[test]
    fn test_weekday_from_days() {
        assert_eq!(weekday_from_days(0), 4, "the epoch was a Thursday");
        assert_eq!(weekday_from_days(3), 0, "Jan 4 1970 was a Sunday");
        assert_eq!(weekday_from_days(-4), 0, "Dec 28 1969 was a Sunday");
    }

    #[test]
    fn test_year_day_boundaries() {
        assert_eq!(year_day(2023, 1, 1), 1);
        assert_eq!(year_day(2023, 12, 31), 365);
        assert_eq!(year_day(2024, 12, 31), 366);
        assert_eq!(year_day(2024, 3, 1), 61);
        assert_eq!(year_day(2023, 3, 1), 60);
    }
}
