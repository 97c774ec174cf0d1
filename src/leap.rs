//! TAI-UTC leap-second bookkeeping.

use hifitime::Epoch;
use lazy_static::lazy_static;
use vec1::Vec1;

/// One row of a leap-second table: TAI-UTC becomes `tai_utc` seconds at the
/// start (UTC) of `month`/`year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeapSecondEntry {
    pub year: i32,
    pub month: u8,
    pub tai_utc: i64,
}

// The integer-second IERS entries. UTC-TAI adjustments before 1972 were
// fractional and aren't representable here (or useful to difxcalc).
const IERS_ENTRIES: &[(i32, u8, i64)] = &[
    (1972, 1, 10),
    (1972, 7, 11),
    (1973, 1, 12),
    (1974, 1, 13),
    (1975, 1, 14),
    (1976, 1, 15),
    (1977, 1, 16),
    (1978, 1, 17),
    (1979, 1, 18),
    (1980, 1, 19),
    (1981, 7, 20),
    (1982, 7, 21),
    (1983, 7, 22),
    (1985, 7, 23),
    (1988, 1, 24),
    (1990, 1, 25),
    (1991, 1, 26),
    (1992, 7, 27),
    (1993, 7, 28),
    (1994, 7, 29),
    (1996, 1, 30),
    (1997, 7, 31),
    (1999, 1, 32),
    (2006, 1, 33),
    (2009, 1, 34),
    (2012, 7, 35),
    (2015, 7, 36),
    (2017, 1, 37),
];

lazy_static! {
    /// Every leap second the IERS has announced, up to and including the
    /// 2017-01-01 change (TAI-UTC = 37 s).
    pub static ref IERS: LeapSecondTable = LeapSecondTable::new(
        Vec1::try_from_vec(
            IERS_ENTRIES
                .iter()
                .map(|&(year, month, tai_utc)| LeapSecondEntry {
                    year,
                    month,
                    tai_utc,
                })
                .collect(),
        )
        .unwrap(),
    );
}

/// A time-ordered leap-second table.
///
/// Entries must ascend by effective date and their offsets must be
/// non-decreasing; the lookup assumes this and doesn't check it.
#[derive(Debug, Clone)]
pub struct LeapSecondTable(Vec1<LeapSecondEntry>);

impl LeapSecondTable {
    pub fn new(entries: Vec1<LeapSecondEntry>) -> LeapSecondTable {
        LeapSecondTable(entries)
    }

    /// The integer TAI-UTC offset \[seconds\] in effect at `time`.
    ///
    /// Instants before 1960 pre-date UTC leap-second bookkeeping and resolve
    /// to 0, as do instants before the table's first effective date. An
    /// instant at or after the last effective date resolves to the last
    /// entry's offset.
    pub fn tai_utc(&self, time: Epoch) -> i64 {
        let (year, ..) = time.to_gregorian_utc();
        if year < 1960 {
            return 0;
        }

        let mut offset = 0;
        for entry in &self.0 {
            let effective = Epoch::from_gregorian_utc_at_midnight(entry.year, entry.month, 1);
            if effective > time {
                break;
            }
            offset = entry.tai_utc;
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use hifitime::{Duration, Epoch};
    use vec1::vec1;

    use super::*;

    #[test]
    fn pre_1960_resolves_to_zero() {
        assert_eq!(IERS.tai_utc(Epoch::from_gregorian_utc_at_midnight(1959, 6, 1)), 0);
        assert_eq!(IERS.tai_utc(Epoch::from_gregorian_utc_at_midnight(1930, 1, 1)), 0);
    }

    #[test]
    fn before_the_first_entry_resolves_to_zero() {
        assert_eq!(IERS.tai_utc(Epoch::from_gregorian_utc_at_midnight(1965, 1, 1)), 0);
    }

    #[test]
    fn offsets_change_at_effective_dates() {
        // The last instant of June 1972 is still on the old offset; the first
        // instant of July 1972 picks up the new one.
        let last = Epoch::from_gregorian_utc(1972, 6, 30, 23, 59, 59, 0);
        let first = Epoch::from_gregorian_utc_at_midnight(1972, 7, 1);
        assert_eq!(IERS.tai_utc(last), 10);
        assert_eq!(IERS.tai_utc(first), 11);

        let last = Epoch::from_gregorian_utc(2016, 12, 31, 23, 59, 59, 0);
        let first = Epoch::from_gregorian_utc_at_midnight(2017, 1, 1);
        assert_eq!(IERS.tai_utc(last), 36);
        assert_eq!(IERS.tai_utc(first), 37);
    }

    #[test]
    fn table_exhaustion_uses_the_last_entry() {
        assert_eq!(IERS.tai_utc(Epoch::from_gregorian_utc_at_midnight(2024, 1, 1)), 37);
    }

    #[test]
    fn offsets_are_monotonic_in_time() {
        let mut time = Epoch::from_gregorian_utc_at_midnight(1960, 1, 1);
        let end = Epoch::from_gregorian_utc_at_midnight(2024, 1, 1);
        let step = Duration::from_days(30.0);
        let mut last_offset = IERS.tai_utc(time);
        while time < end {
            time = time + step;
            let offset = IERS.tai_utc(time);
            assert!(offset >= last_offset, "offset regressed at {time}");
            last_offset = offset;
        }
    }

    #[test]
    fn synthetic_tables_work_too() {
        let table = LeapSecondTable::new(vec1![
            LeapSecondEntry {
                year: 2000,
                month: 1,
                tai_utc: 5
            },
            LeapSecondEntry {
                year: 2000,
                month: 7,
                tai_utc: 6
            },
        ]);
        assert_eq!(table.tai_utc(Epoch::from_gregorian_utc_at_midnight(1999, 6, 1)), 0);
        assert_eq!(table.tai_utc(Epoch::from_gregorian_utc_at_midnight(2000, 3, 1)), 5);
        assert_eq!(table.tai_utc(Epoch::from_gregorian_utc_at_midnight(2000, 7, 1)), 6);
        assert_eq!(table.tai_utc(Epoch::from_gregorian_utc_at_midnight(2010, 1, 1)), 6);
    }
}
