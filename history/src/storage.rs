use crate::HistoryError;
use byteorder::{
    BigEndian,
    ReadBytesExt,
    WriteBytesExt,
};
use chrono::{
    DateTime,
    Utc,
};
use std::{
    io::{
        Read,
        Write,
    },
    time::Duration,
};

pub(crate) const VERSION: u32 = 1;

pub(crate) fn write_header(w: &mut impl Write, now: DateTime<Utc>) -> Result<(), HistoryError> {
    w.write_u32::<BigEndian>(VERSION)?;
    w.write_i64::<BigEndian>(now.timestamp())?;
    Ok(())
}

/// Reads the common header and returns the creation time.
pub(crate) fn read_header(r: &mut impl Read, now: DateTime<Utc>) -> Result<DateTime<Utc>, HistoryError> {
    let version = r.read_u32::<BigEndian>()?;
    if version != VERSION {
        return Err(HistoryError::Version(version));
    }

    let created = r.read_i64::<BigEndian>()?;
    let created = DateTime::from_timestamp(created, 0).ok_or(HistoryError::CreationTime)?;
    if created > now {
        return Err(HistoryError::CreationTime);
    }

    Ok(created)
}

pub(crate) fn write_time(w: &mut impl Write, time: DateTime<Utc>) -> Result<(), HistoryError> {
    w.write_i64::<BigEndian>(time.timestamp())?;
    w.write_u32::<BigEndian>(time.timestamp_subsec_nanos())?;
    Ok(())
}

pub(crate) fn read_time(r: &mut impl Read) -> Result<DateTime<Utc>, HistoryError> {
    let secs = r.read_i64::<BigEndian>()?;
    let nsecs = r.read_u32::<BigEndian>()?;
    DateTime::from_timestamp(secs, nsecs).ok_or(HistoryError::PeriodStart)
}

pub(crate) fn write_duration(w: &mut impl Write, duration: Duration) -> Result<(), HistoryError> {
    let nanos = i64::try_from(duration.as_nanos()).map_err(|_| HistoryError::InvalidConfig("period length"))?;
    w.write_i64::<BigEndian>(nanos)?;
    Ok(())
}

pub(crate) fn read_duration(r: &mut impl Read) -> Result<Duration, HistoryError> {
    let nanos = r.read_i64::<BigEndian>()?;
    let nanos = u64::try_from(nanos).map_err(|_| HistoryError::ConfigMismatch)?;
    Ok(Duration::from_nanos(nanos))
}

pub(crate) fn write_count(w: &mut impl Write, count: usize) -> Result<(), HistoryError> {
    w.write_i64::<BigEndian>(count as i64)?;
    Ok(())
}

pub(crate) fn read_count(r: &mut impl Read) -> Result<usize, HistoryError> {
    let count = r.read_i64::<BigEndian>()?;
    usize::try_from(count).map_err(|_| HistoryError::ConfigMismatch)
}

pub(crate) fn write_f64s(w: &mut impl Write, values: &[f64]) -> Result<(), HistoryError> {
    for value in values {
        w.write_f64::<BigEndian>(*value)?;
    }
    Ok(())
}

pub(crate) fn read_f64s(r: &mut impl Read, values: &mut [f64]) -> Result<(), HistoryError> {
    r.read_f64_into::<BigEndian>(values)?;
    Ok(())
}

/// Fails unless the reader is exhausted.
pub(crate) fn expect_end(r: &mut impl Read) -> Result<(), HistoryError> {
    let mut buf = [0u8; 1];
    match r.read(&mut buf)? {
        0 => Ok(()),
        _ => Err(HistoryError::TrailingData),
    }
}

/// Start of the period containing `time`, aligned to the Unix epoch.
pub(crate) fn truncate(time: DateTime<Utc>, period: Duration) -> DateTime<Utc> {
    let (Some(nanos), Ok(period)) = (time.timestamp_nanos_opt(), i64::try_from(period.as_nanos())) else {
        return time;
    };
    if period <= 0 {
        return time;
    }
    DateTime::from_timestamp_nanos(nanos - nanos.rem_euclid(period))
}

/// Number of whole periods between two aligned period starts.
pub(crate) fn periods_between(from: DateTime<Utc>, to: DateTime<Utc>, period: Duration) -> usize {
    let (Some(delta), Ok(period)) = ((to - from).num_nanoseconds(), i64::try_from(period.as_nanos())) else {
        return usize::MAX;
    };
    if period <= 0 || delta <= 0 {
        return 0;
    }
    usize::try_from(delta / period).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_period() {
        let time = DateTime::from_timestamp(1_700_000_123, 456).unwrap();
        let start = truncate(time, Duration::from_secs(300));
        assert_eq!(start.timestamp() % 300, 0);
        assert!(start <= time);
        assert!(time - start < chrono::TimeDelta::seconds(300));
        assert_eq!(truncate(start, Duration::from_secs(300)), start);
    }

    #[test]
    fn counts_periods() {
        let from = DateTime::from_timestamp(3000, 0).unwrap();
        let to = DateTime::from_timestamp(3900, 0).unwrap();
        assert_eq!(periods_between(from, to, Duration::from_secs(300)), 3);
        assert_eq!(periods_between(to, from, Duration::from_secs(300)), 0);
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut empty: &[u8] = &[];
        assert!(expect_end(&mut empty).is_ok());
        let mut trailing: &[u8] = &[0];
        assert!(matches!(expect_end(&mut trailing), Err(HistoryError::TrailingData)));
    }
}
