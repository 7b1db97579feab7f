//! Gzip compressed history snapshots in the state directory.

use chrono::{
    DateTime,
    Utc,
};
use dsl_monitor_history::{
    Bins,
    Errors,
    HistoryError,
};
use flate2::{
    read::GzDecoder,
    write::GzEncoder,
    Compression,
};
use std::{
    fs::File,
    io::{
        self,
        BufReader,
        BufWriter,
        Write as _,
    },
    path::Path,
};

const BINS_FILE: &str = "bins.dat.gz";
const ERRORS_FILE: &str = "errors.dat.gz";

#[instrument(level = "debug", skip_all, fields(dir = %dir.display()))]
pub(crate) fn load(dir: &Path, bins: &mut Bins, errors: &mut Errors, now: DateTime<Utc>) {
    let path = dir.join(BINS_FILE);
    if let Err(err) = read_file(&path, |r| bins.load(r, now)) {
        warn!(path = %path.display(), %err, "Failed to load bins history");
    }

    let path = dir.join(ERRORS_FILE);
    if let Err(err) = read_file(&path, |r| errors.load(r, now)) {
        warn!(path = %path.display(), %err, "Failed to load errors history");
    }
}

#[instrument(level = "debug", skip_all, fields(dir = %dir.display()))]
pub(crate) fn save(dir: &Path, bins: &Bins, errors: &Errors, now: DateTime<Utc>) {
    if let Err(err) = std::fs::create_dir_all(dir) {
        warn!(dir = %dir.display(), %err, "Failed to create state directory");
        return;
    }

    let path = dir.join(BINS_FILE);
    if let Err(err) = write_file(&path, |w| bins.save(w, now)) {
        warn!(path = %path.display(), %err, "Failed to save bins history");
    }

    let path = dir.join(ERRORS_FILE);
    if let Err(err) = write_file(&path, |w| errors.save(w, now)) {
        warn!(path = %path.display(), %err, "Failed to save errors history");
    }
}

/// A missing file is not an error, the history then starts empty.
fn read_file(
    path: &Path,
    f: impl FnOnce(&mut GzDecoder<BufReader<File>>) -> Result<(), HistoryError>,
) -> Result<(), HistoryError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err.into()),
    };

    let mut decoder = GzDecoder::new(BufReader::new(file));
    f(&mut decoder)?;
    debug!(path = %path.display(), "History loaded");
    Ok(())
}

fn write_file(
    path: &Path,
    f: impl FnOnce(&mut GzEncoder<BufWriter<File>>) -> Result<(), HistoryError>,
) -> Result<(), HistoryError> {
    let file = File::create(path)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    f(&mut encoder)?;
    encoder.finish()?.flush()?;
    debug!(path = %path.display(), "History saved");
    Ok(())
}
