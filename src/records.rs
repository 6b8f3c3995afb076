//! On-disk interchange: hit coordinates as `frame_id,x,y` CSV and detection
//! sequences as JSON lines, one observation per line.

use nalgebra as na;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::detection::{HitEvent, Observation, Position};
use crate::error::Error;

pub const HITS_HEADER: &str = "frame_id,x,y";

fn open(path: &Path) -> Result<BufReader<File>, Error> {
    let file = File::open(path).map_err(|e| Error::input_unavailable(path, e))?;
    Ok(BufReader::new(file))
}

pub fn write_hits<W: Write>(mut out: W, hits: &[HitEvent]) -> Result<(), Error> {
    writeln!(out, "{}", HITS_HEADER)?;

    // `{:?}` keeps the decimal point on whole numbers
    for hit in hits {
        writeln!(out, "{},{:?},{:?}", hit.frame_index, hit.x(), hit.y())?;
    }

    out.flush()?;
    Ok(())
}

pub fn save_hits<P: AsRef<Path>>(path: P, hits: &[HitEvent]) -> Result<(), Error> {
    write_hits(BufWriter::new(File::create(path)?), hits)
}

fn parse_row(line: &str, lineno: usize) -> Result<Position, Error> {
    let malformed = |reason: String| Error::MalformedRecord {
        line: lineno,
        reason,
    };

    let mut cols = line.split(',').map(str::trim);
    let (frame, x, y) = match (cols.next(), cols.next(), cols.next(), cols.next()) {
        (Some(f), Some(x), Some(y), None) => (f, x, y),
        _ => return Err(malformed(format!("expected 3 columns in {:?}", line))),
    };

    let frame_index = frame
        .parse::<usize>()
        .map_err(|e| malformed(format!("frame_id {:?}: {}", frame, e)))?;
    let x = x
        .parse::<f32>()
        .map_err(|e| malformed(format!("x {:?}: {}", x, e)))?;
    let y = y
        .parse::<f32>()
        .map_err(|e| malformed(format!("y {:?}: {}", y, e)))?;

    Ok(Position::new(frame_index, na::Point2::new(x, y)))
}

pub fn read_hits<R: BufRead>(input: R) -> Result<Vec<Position>, Error> {
    let mut lines = input.lines().enumerate();

    match lines.next() {
        Some((_, header)) => {
            let header = header?;
            if header.trim_start_matches('\u{feff}').trim() != HITS_HEADER {
                return Err(Error::MalformedRecord {
                    line: 1,
                    reason: format!("expected header {:?}, got {:?}", HITS_HEADER, header),
                });
            }
        }
        None => return Ok(Vec::new()),
    }

    let mut out = Vec::new();

    for (idx, line) in lines {
        let line = line?;

        if line.trim().is_empty() {
            continue;
        }

        out.push(parse_row(&line, idx + 1)?);
    }

    Ok(out)
}

pub fn load_hits<P: AsRef<Path>>(path: P) -> Result<Vec<Position>, Error> {
    read_hits(open(path.as_ref())?)
}

pub fn write_observations<W: Write>(mut out: W, observations: &[Observation]) -> Result<(), Error> {
    for obs in observations {
        writeln!(out, "{}", serde_json::to_string(obs)?)?;
    }

    out.flush()?;
    Ok(())
}

pub fn save_observations<P: AsRef<Path>>(path: P, observations: &[Observation]) -> Result<(), Error> {
    write_observations(BufWriter::new(File::create(path)?), observations)
}

pub fn read_observations<R: BufRead>(input: R) -> Result<Vec<Observation>, Error> {
    let mut out = Vec::new();

    for (idx, line) in input.lines().enumerate() {
        let line = line?;

        if line.trim().is_empty() {
            continue;
        }

        let obs = serde_json::from_str(&line).map_err(|e| Error::MalformedRecord {
            line: idx + 1,
            reason: e.to_string(),
        })?;

        out.push(obs);
    }

    Ok(out)
}

pub fn load_observations<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>, Error> {
    read_observations(open(path.as_ref())?)
}
