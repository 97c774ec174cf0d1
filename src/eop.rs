//! Earth-orientation parameters.

use hifitime::Epoch;
use vec1::Vec1;

/// Earth-orientation data for an instant: everything the `.calc` EOP block
/// needs besides the leap-second count.
///
/// Implementations are injected into the writer so that the source of the
/// data (IERS finals tables, a correlator database, test fixtures) stays a
/// caller concern.
pub trait EarthOrientation {
    /// UT1-UTC \[seconds\] at `time`.
    fn ut1_utc(&self, time: Epoch) -> f64;

    /// Polar-motion components (x, y) \[arcseconds\] at `time`.
    fn polar_motion(&self, time: Epoch) -> (f64, f64);
}

/// One tabulated row of Earth-orientation data.
#[derive(Debug, Clone, Copy)]
pub struct EopRow {
    pub mjd: f64,
    /// UT1-UTC \[seconds\].
    pub ut1_utc: f64,
    /// Polar motion x \[arcseconds\].
    pub xpole: f64,
    /// Polar motion y \[arcseconds\].
    pub ypole: f64,
}

/// A sampled Earth-orientation series (e.g. rows of an IERS finals table),
/// linearly interpolated between samples and clamped outside them.
///
/// Rows must strictly ascend by MJD; the lookup assumes this and doesn't
/// check it.
#[derive(Debug, Clone)]
pub struct EopSeries(Vec1<EopRow>);

impl EopSeries {
    pub fn new(rows: Vec1<EopRow>) -> EopSeries {
        EopSeries(rows)
    }

    fn interpolate(&self, time: Epoch, field: fn(&EopRow) -> f64) -> f64 {
        let mjd = time.to_mjd_utc_days();
        let first = self.0.first();
        let last = self.0.last();
        if mjd <= first.mjd {
            return field(first);
        }
        if mjd >= last.mjd {
            return field(last);
        }
        // A linear scan, like the leap-second lookup; these tables are small.
        for pair in self.0.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            if mjd <= hi.mjd {
                let frac = (mjd - lo.mjd) / (hi.mjd - lo.mjd);
                return field(lo) + frac * (field(hi) - field(lo));
            }
        }
        unreachable!("mjd is within the table's span");
    }
}

impl EarthOrientation for EopSeries {
    fn ut1_utc(&self, time: Epoch) -> f64 {
        self.interpolate(time, |row| row.ut1_utc)
    }

    fn polar_motion(&self, time: Epoch) -> (f64, f64) {
        (
            self.interpolate(time, |row| row.xpole),
            self.interpolate(time, |row| row.ypole),
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use hifitime::Epoch;
    use vec1::vec1;

    use super::*;

    fn test_series() -> EopSeries {
        EopSeries::new(vec1![
            EopRow {
                mjd: 59000.0,
                ut1_utc: -0.1,
                xpole: 0.05,
                ypole: 0.40
            },
            EopRow {
                mjd: 59002.0,
                ut1_utc: -0.3,
                xpole: 0.07,
                ypole: 0.44
            },
        ])
    }

    #[test]
    fn interpolates_between_rows() {
        let series = test_series();
        let time = Epoch::from_mjd_utc(59001.0);
        assert_abs_diff_eq!(series.ut1_utc(time), -0.2, epsilon = 1e-9);
        let (xp, yp) = series.polar_motion(time);
        assert_abs_diff_eq!(xp, 0.06, epsilon = 1e-9);
        assert_abs_diff_eq!(yp, 0.42, epsilon = 1e-9);
    }

    #[test]
    fn clamps_outside_the_table() {
        let series = test_series();
        assert_abs_diff_eq!(series.ut1_utc(Epoch::from_mjd_utc(58990.0)), -0.1);
        assert_abs_diff_eq!(series.ut1_utc(Epoch::from_mjd_utc(59010.0)), -0.3);
    }
}
