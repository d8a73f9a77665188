// Reads the raw feed table and normalizes single rows.
//
// The table is kept positional and includes its header row; the coordinator
// decides what to skip.
use crate::error::{FeedError, Result};
use crate::types::FeedRow;
use crate::util::{display_name, field, parse_i32_safe, parse_i64_safe, parse_u32_safe};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub const UNKNOWN_COUNTRY_CODE: &str = "UUU";
pub const UNKNOWN_COUNTRY_NAME: &str = "Unknown country";
pub const UNKNOWN_CONTINENT: &str = "Unknown continent";

const COL_DAY: usize = 1;
const COL_MONTH: usize = 2;
const COL_YEAR: usize = 3;
const COL_CASES: usize = 4;
const COL_DEATHS: usize = 5;
const COL_NAME: usize = 6;
const COL_CODE: usize = 8;
const COL_POPULATION: usize = 9;
const COL_CONTINENT: usize = 10;

pub fn read_feed<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>> {
    let file = std::fs::File::open(path)?;
    read_feed_from(file)
}

pub fn read_feed_from<R: Read>(reader: R) -> Result<Vec<Vec<String>>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut table = Vec::new();
    for result in rdr.records() {
        let record = result?;
        table.push(record.iter().map(str::to_string).collect());
    }
    debug!(rows = table.len(), "feed table read");
    Ok(table)
}

/// Normalize one positional row. `line` is the 0-based row index in the
/// table, used for error messages.
///
/// Returns `Ok(None)` for a row whose fields are all blank.
pub fn clean_row<S: AsRef<str>>(line: usize, fields: &[S]) -> Result<Option<FeedRow>> {
    if fields.iter().all(|f| f.as_ref().trim().is_empty()) {
        return Ok(None);
    }
    let malformed = |what: &str, raw: &str| FeedError::MalformedRow {
        line,
        reason: format!("{} '{}' is not a valid integer", what, raw),
    };

    let raw = field(fields, COL_DAY);
    let day = parse_u32_safe(raw).ok_or_else(|| malformed("day", raw))?;
    let raw = field(fields, COL_MONTH);
    let month = parse_u32_safe(raw).ok_or_else(|| malformed("month", raw))?;
    let raw = field(fields, COL_YEAR);
    let year = parse_i32_safe(raw).ok_or_else(|| malformed("year", raw))?;
    let raw = field(fields, COL_CASES);
    let new_cases = parse_i64_safe(raw).ok_or_else(|| malformed("cases", raw))?;
    let raw = field(fields, COL_DEATHS);
    let new_deaths = parse_i64_safe(raw).ok_or_else(|| malformed("deaths", raw))?;

    let raw = field(fields, COL_POPULATION);
    let population = if raw.is_empty() {
        0
    } else {
        parse_i64_safe(raw).ok_or_else(|| malformed("population", raw))?
    };

    let (country_code, country_name) = match field(fields, COL_CODE) {
        "" => (
            UNKNOWN_COUNTRY_CODE.to_string(),
            UNKNOWN_COUNTRY_NAME.to_string(),
        ),
        code => (code.to_string(), display_name(field(fields, COL_NAME))),
    };
    let continent = match field(fields, COL_CONTINENT) {
        "" => UNKNOWN_CONTINENT.to_string(),
        name => name.to_string(),
    };

    Ok(Some(FeedRow {
        line,
        day,
        month,
        year,
        new_cases,
        new_deaths,
        country_name,
        country_code,
        population,
        continent,
    }))
}
