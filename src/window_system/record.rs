//! Decoder for the `app,title,x,y,width,height` enumeration records.
//!
//! The application name is read from the left up to the first unescaped
//! comma (`\,` and `\\` stand for a literal comma and backslash), and the
//! four geometry fields are taken from the right, so a title may itself
//! contain commas. Geometry that fails to parse falls back to zero; a record
//! that is structurally broken is rejected and the caller skips it.

use thiserror::Error;

use crate::db::models::WindowState;
use crate::{log_debug, log_warn};

const ENABLE_LOGS: bool = true;

const FIELD_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("expected 6 comma-separated fields, found {0}")]
    FieldCount(usize),
    #[error("record has no application name")]
    MissingApp,
}

pub fn decode_record(line: &str) -> Result<WindowState, RecordError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some((app_name, rest)) = split_app_name(line) else {
        return Err(RecordError::FieldCount(1));
    };

    let field_count = 1 + rest.split(',').count();
    if field_count < FIELD_COUNT {
        return Err(RecordError::FieldCount(field_count));
    }

    let mut tail = rest.rsplitn(5, ',');
    let (Some(height), Some(width), Some(y), Some(x), Some(window_title)) =
        (tail.next(), tail.next(), tail.next(), tail.next(), tail.next())
    else {
        return Err(RecordError::FieldCount(field_count));
    };

    let app_name = app_name.trim();
    if app_name.is_empty() {
        return Err(RecordError::MissingApp);
    }

    Ok(WindowState {
        app_name: app_name.to_string(),
        window_title: window_title.to_string(),
        x: parse_coordinate(x, "x"),
        y: parse_coordinate(y, "y"),
        width: parse_coordinate(width, "width"),
        height: parse_coordinate(height, "height"),
    })
}

/// Unescaped application name and everything after its separating comma.
fn split_app_name(line: &str) -> Option<(String, &str)> {
    let mut app_name = String::new();
    let mut chars = line.char_indices();
    while let Some((index, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => app_name.push(escaped),
                None => app_name.push('\\'),
            },
            ',' => return Some((app_name, &line[index + 1..])),
            _ => app_name.push(c),
        }
    }
    None
}

/// Decode every non-blank line, returning the good records in input order
/// and how many lines were skipped.
pub fn decode_records(text: &str) -> (Vec<WindowState>, usize) {
    let mut states = Vec::new();
    let mut skipped = 0;

    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        match decode_record(line) {
            Ok(state) => states.push(state),
            Err(err) => {
                log_warn!("Skipping window record {line:?}: {err}");
                skipped += 1;
            }
        }
    }

    (states, skipped)
}

fn parse_coordinate(raw: &str, field: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            log_debug!("Window record field {field} = {raw:?} is not a number; using 0");
            0.0
        }
    }
}
