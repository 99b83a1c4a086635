use crate::tag::Tag;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use std::{error, fmt, marker::PhantomData};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// encoding is shorter or longer than allowed
    InvalidLength { kind: &'static str, len: usize },
    /// a field is not a digit or out of range
    InvalidFormat { kind: &'static str },
    /// time zone offset out of range
    InvalidOffset { kind: &'static str, sign: char },
    /// unexpected character where the time zone was expected
    GarbageOffset { kind: &'static str },
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateError::InvalidLength { kind, len } => write!(f, "Parse {} time, invalid length {}", kind, len),
            DateError::InvalidFormat { kind } => write!(f, "Parse {} time, invalid format", kind),
            DateError::InvalidOffset { kind, sign } => write!(f, "Parse {} time, {}hhmm", kind, sign),
            DateError::GarbageOffset { kind } => write!(f, "Parse {} time, garbage offset", kind),
        }
    }
}

impl error::Error for DateError {}

/// Textual representation of a `Date` (UTCTime or GeneralizedTime).
pub trait TimeRepr
where
    Self: Sized,
{
    const TAG: Tag;
    const KIND: &'static str;

    fn encode(date: &Date<Self>) -> Vec<u8>;

    fn decode(bytes: &[u8]) -> Result<Date<Self>, DateError>;
}

/// A UTC date with millisecond precision.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date<TR: TimeRepr> {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    millisecond: u16,
    _pd: PhantomData<TR>,
}

impl<TR: TimeRepr> Date<TR> {
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<Date<TR>> {
        Self::with_millis(year, month, day, hour, minute, second, 0)
    }

    pub fn with_millis(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
    ) -> Option<Date<TR>> {
        if (1..=12).contains(&month)
            && (1..=31).contains(&day)
            && hour < 24
            && minute < 60
            && second < 60
            && millisecond < 1000
            && NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day)).is_some()
        {
            Some(Self {
                year,
                month,
                day,
                hour,
                minute,
                second,
                millisecond,
                _pd: PhantomData,
            })
        } else {
            None
        }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn millisecond(&self) -> u16 {
        self.millisecond
    }

    pub fn encode(&self) -> Vec<u8> {
        TR::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DateError> {
        TR::decode(bytes)
    }

    pub fn to_date_time(&self) -> DateTime<Utc> {
        // fields are validated on construction
        Utc.with_ymd_and_hms(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
        )
        .single()
        .unwrap_or_default()
            + Duration::milliseconds(i64::from(self.millisecond))
    }

    /// Years outside `0..=9999` are clamped.
    pub fn from_date_time(date_time: &DateTime<Utc>) -> Self {
        Self {
            year: date_time.year().clamp(0, 9999) as u16,
            month: date_time.month() as u8,
            day: date_time.day() as u8,
            hour: date_time.hour() as u8,
            minute: date_time.minute() as u8,
            second: date_time.second().min(59) as u8,
            millisecond: (date_time.timestamp_subsec_millis() % 1000) as u16,
            _pd: PhantomData,
        }
    }

    fn cast<Other: TimeRepr>(self) -> Date<Other> {
        Date {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            second: self.second,
            millisecond: self.millisecond,
            _pd: PhantomData,
        }
    }
}

impl<TR: TimeRepr> From<Date<TR>> for DateTime<Utc> {
    fn from(date: Date<TR>) -> Self {
        date.to_date_time()
    }
}

impl<TR: TimeRepr> From<DateTime<Utc>> for Date<TR> {
    fn from(date_time: DateTime<Utc>) -> Self {
        Self::from_date_time(&date_time)
    }
}

impl From<UTCTime> for GeneralizedTime {
    fn from(date: UTCTime) -> Self {
        date.cast()
    }
}

trait DateDigitReader {
    fn read_digit(&self, idx: usize, kind: &'static str) -> Result<u8, DateError>;

    #[inline]
    fn read_and_merge_with_next(&self, idx: usize, kind: &'static str) -> Result<u8, DateError> {
        Ok(self.read_digit(idx, kind)? * 10 + self.read_digit(idx + 1, kind)?)
    }
}

impl DateDigitReader for [u8] {
    #[inline]
    fn read_digit(&self, idx: usize, kind: &'static str) -> Result<u8, DateError> {
        match self.get(idx) {
            Some(c) if c.is_ascii_digit() => Ok(c - b'0'),
            _ => Err(DateError::InvalidFormat { kind }),
        }
    }
}

/// Parses `MMDDhhmm[ss[.fff]](Z|+hhmm|-hhmm)` starting at `pos` and normalizes to UTC.
fn decode_tail<TR: TimeRepr>(
    bytes: &[u8],
    year: u16,
    mut pos: usize,
    allow_fraction: bool,
) -> Result<Date<TR>, DateError> {
    let kind = TR::KIND;

    let month = bytes.read_and_merge_with_next(pos, kind)?;
    let day = bytes.read_and_merge_with_next(pos + 2, kind)?;
    let hour = bytes.read_and_merge_with_next(pos + 4, kind)?;
    let minute = bytes.read_and_merge_with_next(pos + 6, kind)?;
    pos += 8;

    let mut second = 0;
    let mut millisecond = 0u16;
    if bytes.get(pos).map_or(false, u8::is_ascii_digit) {
        second = bytes.read_and_merge_with_next(pos, kind)?;
        pos += 2;

        if allow_fraction && matches!(bytes.get(pos).copied(), Some(b'.') | Some(b',')) {
            pos += 1;
            let mut precision = 0;
            while let Some(c) = bytes.get(pos).copied().filter(u8::is_ascii_digit) {
                if precision < 3 {
                    millisecond = millisecond * 10 + u16::from(c - b'0');
                    precision += 1;
                }
                pos += 1;
            }
            if precision == 0 {
                return Err(DateError::InvalidFormat { kind });
            }
            millisecond *= 10u16.pow(3 - precision);
        }
    }

    let date = Date::<TR>::with_millis(year, month, day, hour, minute, second, millisecond)
        .ok_or(DateError::InvalidFormat { kind })?;

    let offset_minutes = match bytes.get(pos).copied() {
        Some(b'Z') if pos + 1 == bytes.len() => 0,
        Some(sign @ (b'+' | b'-')) if pos + 5 == bytes.len() => {
            let sign = char::from(sign);
            let hh = bytes.read_and_merge_with_next(pos + 1, kind)?;
            let mm = bytes.read_and_merge_with_next(pos + 3, kind)?;
            if hh >= 24 || mm >= 60 {
                return Err(DateError::InvalidOffset { kind, sign });
            }
            let minutes = i64::from(hh) * 60 + i64::from(mm);
            if sign == '+' {
                minutes
            } else {
                -minutes
            }
        }
        _ => return Err(DateError::GarbageOffset { kind }),
    };

    if offset_minutes == 0 {
        Ok(date)
    } else {
        let utc = date.to_date_time() - Duration::minutes(offset_minutes);
        Ok(Date::from_date_time(&utc))
    }
}

fn encode_digits(buf: &mut Vec<u8>, value: u16, width: u32) {
    for exp in (0..width).rev() {
        buf.push(b'0' + ((value / 10u16.pow(exp)) % 10) as u8);
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct UTCTimeRepr;
pub type UTCTime = Date<UTCTimeRepr>;

impl TimeRepr for UTCTimeRepr {
    const TAG: Tag = Tag::UTC_TIME;
    const KIND: &'static str = "UTC";

    /// `YYMMDDhhmmssZ`
    fn encode(date: &Date<UTCTimeRepr>) -> Vec<u8> {
        let year = if date.year() >= 2000 {
            date.year() - 2000
        } else {
            date.year().saturating_sub(1900)
        };

        let mut encoded = Vec::with_capacity(13);
        encode_digits(&mut encoded, year % 100, 2);
        encode_digits(&mut encoded, u16::from(date.month()), 2);
        encode_digits(&mut encoded, u16::from(date.day()), 2);
        encode_digits(&mut encoded, u16::from(date.hour()), 2);
        encode_digits(&mut encoded, u16::from(date.minute()), 2);
        encode_digits(&mut encoded, u16::from(date.second()), 2);
        encoded.push(b'Z');
        encoded
    }

    fn decode(bytes: &[u8]) -> Result<Date<UTCTimeRepr>, DateError> {
        if !(11..=17).contains(&bytes.len()) {
            return Err(DateError::InvalidLength {
                kind: Self::KIND,
                len: bytes.len(),
            });
        }

        let yy = u16::from(bytes.read_and_merge_with_next(0, Self::KIND)?);
        let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
        decode_tail::<UTCTimeRepr>(bytes, year, 2, false)
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct GeneralizedTimeRepr;
pub type GeneralizedTime = Date<GeneralizedTimeRepr>;

impl TimeRepr for GeneralizedTimeRepr {
    const TAG: Tag = Tag::GENERALIZED_TIME;
    const KIND: &'static str = "Generalized";

    /// `YYYYMMDDhhmmssZ`
    fn encode(date: &Date<GeneralizedTimeRepr>) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(15);
        encode_digits(&mut encoded, date.year(), 4);
        encode_digits(&mut encoded, u16::from(date.month()), 2);
        encode_digits(&mut encoded, u16::from(date.day()), 2);
        encode_digits(&mut encoded, u16::from(date.hour()), 2);
        encode_digits(&mut encoded, u16::from(date.minute()), 2);
        encode_digits(&mut encoded, u16::from(date.second()), 2);
        encoded.push(b'Z');
        encoded
    }

    fn decode(bytes: &[u8]) -> Result<Date<GeneralizedTimeRepr>, DateError> {
        if !(13..=23).contains(&bytes.len()) {
            return Err(DateError::InvalidLength {
                kind: Self::KIND,
                len: bytes.len(),
            });
        }

        let year = u16::from(bytes.read_and_merge_with_next(0, Self::KIND)?) * 100
            + u16::from(bytes.read_and_merge_with_next(2, Self::KIND)?);
        decode_tail::<GeneralizedTimeRepr>(bytes, year, 4, true)
    }
}

impl<TR: TimeRepr> fmt::Display for Date<TR> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn utc_time_encoding() {
        let date = UTCTime::new(2019, 10, 17, 0, 11, 54).unwrap();
        assert_eq!(date.encode(), b"191017001154Z".to_vec());
        assert_eq!(UTCTime::decode(b"191017001154Z").unwrap(), date);
    }

    #[rstest]
    #[case(b"490101000000Z", 2049)]
    #[case(b"500101000000Z", 1950)]
    #[case(b"991231235959Z", 1999)]
    fn utc_time_century_window(#[case] encoded: &[u8], #[case] year: u16) {
        assert_eq!(UTCTime::decode(encoded).unwrap().year(), year);
    }

    #[test]
    fn utc_time_without_seconds() {
        let date = UTCTime::decode(b"2001020304Z").unwrap();
        assert_eq!(date, UTCTime::new(2020, 1, 2, 3, 4, 0).unwrap());
    }

    #[test]
    fn utc_time_with_offset_is_normalized() {
        let date = UTCTime::decode(b"200101003000+0100").unwrap();
        assert_eq!(date, UTCTime::new(2019, 12, 31, 23, 30, 0).unwrap());

        let date = UTCTime::decode(b"200101233000-0100").unwrap();
        assert_eq!(date, UTCTime::new(2020, 1, 2, 0, 30, 0).unwrap());
    }

    #[test]
    fn generalized_time_fraction() {
        let date = GeneralizedTime::decode(b"20500101120000.25Z").unwrap();
        assert_eq!(date.millisecond(), 250);
        assert_eq!(date.year(), 2050);
        assert_eq!(date.encode(), b"20500101120000Z".to_vec());
    }

    #[rstest]
    #[case(b"201301000000Z")]
    #[case(b"200230000000Z")]
    #[case(b"20010100a000Z")]
    fn invalid_format(#[case] encoded: &[u8]) {
        assert_eq!(
            UTCTime::decode(encoded).unwrap_err(),
            DateError::InvalidFormat { kind: "UTC" }
        );
    }

    #[test]
    fn invalid_offsets() {
        assert_eq!(
            UTCTime::decode(b"200101000000+2500").unwrap_err(),
            DateError::InvalidOffset { kind: "UTC", sign: '+' }
        );
        assert_eq!(
            UTCTime::decode(b"200101000000X").unwrap_err(),
            DateError::GarbageOffset { kind: "UTC" }
        );
        assert_eq!(
            GeneralizedTime::decode(b"20200101000000").unwrap_err(),
            DateError::GarbageOffset { kind: "Generalized" }
        );
    }

    #[test]
    fn chrono_round_trip() {
        let date_time = Utc.with_ymd_and_hms(2024, 2, 29, 13, 37, 42).unwrap() + Duration::milliseconds(5);
        let date = GeneralizedTime::from(date_time);
        assert_eq!(date.millisecond(), 5);
        assert_eq!(DateTime::<Utc>::from(date), date_time);
    }
}
