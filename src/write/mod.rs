//! Serialisation of observation metadata into difxcalc's `.calc` format.
//!
//! difxcalc parses by key token rather than by column, but the order of the
//! lines and the number of decimal places in every numeric field are fixed by
//! the consumer; writing a field with a different precision is a correctness
//! bug, not a style choice. The literal line layouts below (including their
//! internal spacing) are kept byte-for-byte compatible.


use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use hifitime::{Duration, Unit};
use log::{debug, warn};
use thiserror::Error;

use crate::{eop::EarthOrientation, leap::LeapSecondTable, ObservationWindow, Source, Telescope};

#[derive(Error, Debug)]
pub enum WriteCalcError {
    #[error("{key} is not finite ({value}); refusing to write it to a .calc file")]
    NonFinite { key: &'static str, value: f64 },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

/// Build and write a `.calc` file describing one observation.
///
/// `telescopes` and `sources` are written in input order, and difxcalc refers
/// back to them by index (the scan in the trailer points at source 0), so
/// callers must keep that ordering stable. Telescope names must be unique.
///
/// `ofile_name` defaults to `new.calc`. `im_filename` names the delay
/// polynomial file difxcalc will produce and defaults to the output name with
/// a trailing `.calc` swapped for `.im` (see [`derive_im_filename`]).
///
/// Returns the path that was written. An existing file at that path is
/// overwritten, and a failure partway through leaves a truncated file behind;
/// rerunning the writer is the recovery strategy.
pub fn write_calc(
    telescopes: &[Telescope],
    sources: &[Source],
    window: &ObservationWindow,
    leap: &LeapSecondTable,
    eop: &dyn EarthOrientation,
    ofile_name: Option<&Path>,
    im_filename: Option<&str>,
) -> Result<PathBuf, WriteCalcError> {
    let ofile_name = ofile_name
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("new.calc"));
    let im_filename = match im_filename {
        Some(f) => f.to_string(),
        None => derive_im_filename(&ofile_name.to_string_lossy()),
    };

    let lines = build_calc_lines(telescopes, sources, window, leap, eop, &im_filename)?;

    debug!(
        "Writing {} .calc lines to {}",
        lines.len(),
        ofile_name.display()
    );
    let mut buf = BufWriter::new(File::create(&ofile_name)?);
    for line in &lines {
        writeln!(buf, "{line}")?;
    }
    buf.flush()?;

    Ok(ofile_name)
}

/// The name of the `.im` file difxcalc will write alongside the `.calc` file:
/// a trailing `.calc` becomes `.im`, any other name just gets `.im` appended.
pub fn derive_im_filename(ofile_name: &str) -> String {
    match ofile_name.strip_suffix(".calc") {
        Some(stem) => format!("{stem}.im"),
        None => format!("{ofile_name}.im"),
    }
}

/// Assemble the complete, ordered line sequence of a `.calc` file.
///
/// The block order (job header, EOPs, sources, telescopes, scan trailer) is
/// part of the format. This does no IO, so it is also the idempotence
/// guarantee: the output is purely a function of the arguments.
pub fn build_calc_lines(
    telescopes: &[Telescope],
    sources: &[Source],
    window: &ObservationWindow,
    leap: &LeapSecondTable,
    eop: &dyn EarthOrientation,
    im_filename: &str,
) -> Result<Vec<String>, WriteCalcError> {
    let mut lines =
        Vec::with_capacity(20 + 5 * 2 + 1 + 5 * sources.len() + 1 + 7 * telescopes.len() + 15);

    // Job header. The job/subjob identifiers, duty cycle and vex filename are
    // placeholders that difxcalc requires but doesn't act on.
    let start_mjd = finite("START MJD", window.start.to_mjd_utc_days())?;
    let stop_mjd = start_mjd + window.duration.to_unit(Unit::Day);
    let (year, month, day, hour, minute, second, _) = window.start.to_gregorian_utc();
    lines.extend([
        "JOB ID:             4".to_string(),
        format!("JOB START TIME:     {start_mjd:.8}"),
        format!("JOB STOP TIME:      {stop_mjd:.8}"),
        "DUTY CYCLE:         1.000".to_string(),
        "OBSCODE:            DUMMY".to_string(),
        "DIFX VERSION:       DIFX-2.6.2".to_string(),
        "DIFX LABEL:         VLBADIFX-2.6.2".to_string(),
        "SUBJOB ID:          0".to_string(),
        "SUBARRAY ID:        0".to_string(),
        "VEX FILE:           dummy.vex.obs".to_string(),
        format!("START MJD:          {start_mjd:.8}"),
        format!("START YEAR:         {year}"),
        format!("START MONTH:        {month}"),
        format!("START DAY:          {day}"),
        format!("START HOUR:         {hour}"),
        format!("START MINUTE:       {minute}"),
        format!("START SECOND:       {second}"),
        "IM FILENAME:        dummy.im".to_string(),
        "FLAG FILENAME:      dummy.flag".to_string(),
    ]);

    // Earth orientation: exactly two samples, the start of the observation
    // and one day later.
    let times = [window.start, window.start + Duration::from_days(1.0)];
    lines.push(format!("NUM EOPS: {}", times.len()));
    for (ti, &tt) in times.iter().enumerate() {
        let mjd = finite("EOP TIME", tt.to_mjd_utc_days())?.floor() as i64;
        let tai_utc = leap.tai_utc(tt);
        let ut1_utc = finite("UT1_UTC", eop.ut1_utc(tt))?;
        if ut1_utc == 0.0 {
            warn!("UT1-UTC at MJD {mjd} is exactly 0; delays may be wrong by up to 0.9 s");
        }
        let (xpole, ypole) = eop.polar_motion(tt);
        let xpole = finite("XPOLE", xpole)?;
        let ypole = finite("YPOLE", ypole)?;
        lines.extend([
            format!("EOP {ti} TIME (mjd):   {mjd}"),
            format!("EOP {ti} TAI_UTC (sec):{tai_utc}"),
            format!("EOP {ti} UT1_UTC (sec): {ut1_utc:.10}"),
            format!("EOP {ti} XPOLE (arcsec): {xpole:.10}"),
            format!("EOP {ti} YPOLE (arcsec): {ypole:.10}"),
        ]);
    }

    // Sources. CALCODE distinguishes calibrators (A/B/C) from science
    // targets; the delay computation doesn't depend on it.
    lines.push(format!("NUM SOURCES: {}", sources.len()));
    for (si, source) in sources.iter().enumerate() {
        let ra = finite("SOURCE RA", source.radec.ra)?;
        let dec = finite("SOURCE DEC", source.radec.dec)?;
        lines.extend([
            format!("SOURCE {si} NAME:      {}", source.name),
            format!("SOURCE {si} RA:        {ra:.8}"),
            format!("SOURCE {si} DEC:       {dec:.8}"),
            format!("SOURCE {si} CALCODE:   B"),
            format!("SOURCE {si} QUAL:      0"),
        ]);
    }

    // Telescopes.
    lines.push(format!("NUM TELESCOPES:     {}", telescopes.len()));
    for (ti, telescope) in telescopes.iter().enumerate() {
        let x = finite("TELESCOPE X", telescope.position.x)?;
        let y = finite("TELESCOPE Y", telescope.position.y)?;
        let z = finite("TELESCOPE Z", telescope.position.z)?;
        lines.extend([
            format!("TELESCOPE {ti} NAME:   {}", telescope.name),
            format!("TELESCOPE {ti} MOUNT:  AZEL"),
            format!("TELESCOPE {ti} OFFSET (m): 0.0000"),
            format!("TELESCOPE {ti} X (m): {x:.8}"),
            format!("TELESCOPE {ti} Y (m): {y:.8}"),
            format!("TELESCOPE {ti} Z (m): {z:.8}"),
            format!("TELESCOPE {ti} SHELF:  None"),
        ]);
    }

    // Spectral/averaging constants and a single scan spanning the window.
    // The scan duration is deliberately written without forced decimals
    // (difxcalc reads "240", not "240.00").
    let duration_sec = window.duration.to_seconds();
    lines.extend([
        "SPECTRAL AVG:       1".to_string(),
        "TAPER FUNCTION:     UNIFORM".to_string(),
        "NUM SCANS:          1".to_string(),
        "SCAN 0 IDENTIFIER:  No0004".to_string(),
        "SCAN 0 START (S):   0".to_string(),
        format!("SCAN 0 DUR (S):     {duration_sec}"),
        "SCAN 0 OBS MODE NAME:JWST".to_string(),
        "SCAN 0 UVSHIFT INTERVAL (NS):2000000000".to_string(),
        "SCAN 0 AC AVG INTERVAL (NS):2000000".to_string(),
        "SCAN 0 POINTING SRC:0".to_string(),
        "SCAN 0 NUM PHS CTRS:1".to_string(),
        "SCAN 0 PHS CTR 0:   0".to_string(),
        "NUM SPACECRAFT:     0".to_string(),
        format!("IM FILENAME:        {im_filename}"),
        format!("FLAG FILENAME:      {im_filename}.flag"),
    ]);

    Ok(lines)
}

fn finite(key: &'static str, value: f64) -> Result<f64, WriteCalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(WriteCalcError::NonFinite { key, value })
    }
}
