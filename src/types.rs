use crate::calendar::{self, Day};
use crate::error::{FeedError, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// One feed row after trimming and placeholder substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRow {
    pub line: usize,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub new_cases: i64,
    pub new_deaths: i64,
    pub country_name: String,
    pub country_code: String,
    pub population: i64,
    pub continent: String,
}

/// Daily counts placed on the reference-year time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Record {
    pub day: Day,
    pub week: u32,
    pub new_cases: i64,
    pub new_deaths: i64,
}

impl Record {
    pub fn new(day: Day, new_cases: i64, new_deaths: i64) -> Self {
        Self {
            day,
            week: day.week(),
            new_cases,
            new_deaths,
        }
    }

    pub fn from_row(row: &FeedRow) -> Result<Self> {
        let day = calendar::day_ordinal(row.year, row.month, row.day)?;
        Ok(Self::new(day, row.new_cases, row.new_deaths))
    }

    /// Same date metadata, zero counts. Used to open a new slot in a
    /// day-indexed accumulator.
    pub fn zeroed(day: Day) -> Self {
        Self::new(day, 0, 0)
    }

    pub fn count(&self, variable: Variable) -> i64 {
        match variable {
            Variable::Cases => self.new_cases,
            Variable::Deaths => self.new_deaths,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    Cases,
    Deaths,
}

impl Variable {
    pub const ALL: [Variable; 2] = [Variable::Cases, Variable::Deaths];

    pub fn as_str(self) -> &'static str {
        match self {
            Variable::Cases => "cases",
            Variable::Deaths => "deaths",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variable {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cases" => Ok(Variable::Cases),
            "deaths" => Ok(Variable::Deaths),
            other => Err(FeedError::InvalidVariableName(other.to_string())),
        }
    }
}

/// Trimmed daily series for one region and one variable, with its trailing
/// rolling average. Rebuilt from scratch after every batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesTable {
    pub start_day: u32,
    pub variable: Variable,
    pub peak: i64,
    pub values: Vec<i64>,
    pub avg_values: Vec<f64>,
    pub week_index: Vec<u32>,
    pub avg_width: usize,
}

impl SeriesTable {
    pub fn empty(variable: Variable, avg_width: usize) -> Self {
        Self {
            start_day: 0,
            variable,
            peak: 0,
            values: Vec::new(),
            avg_values: Vec::new(),
            week_index: Vec::new(),
            avg_width,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Identifies any region in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegionId {
    Country(String),
    Continent(String),
    World,
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionId::Country(code) => write!(f, "country '{}'", code),
            RegionId::Continent(name) => write!(f, "continent '{}'", name),
            RegionId::World => f.write_str("world"),
        }
    }
}

/// Outcome of one completed ingestion batch.
///
/// `rows_read` excludes the header and always equals
/// `rows_ingested + rows_skipped + rows_blank`.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub rows_read: usize,
    pub rows_ingested: usize,
    pub rows_skipped: usize,
    pub rows_blank: usize,
    pub countries: usize,
    pub continents: usize,
    pub loaded_at: DateTime<Local>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CountryRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Code")]
    #[tabled(rename = "Code")]
    pub code: String,
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub name: String,
    #[serde(rename = "Population")]
    #[tabled(rename = "Population")]
    pub population: String,
    #[serde(rename = "TotalCases")]
    #[tabled(rename = "TotalCases")]
    pub total_cases: String,
    #[serde(rename = "TotalDeaths")]
    #[tabled(rename = "TotalDeaths")]
    pub total_deaths: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RegionTotalsRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Population")]
    #[tabled(rename = "Population")]
    pub population: String,
    #[serde(rename = "TotalCases")]
    #[tabled(rename = "TotalCases")]
    pub total_cases: String,
    #[serde(rename = "TotalDeaths")]
    #[tabled(rename = "TotalDeaths")]
    pub total_deaths: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SeriesRow {
    #[serde(rename = "Day")]
    #[tabled(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Week")]
    #[tabled(rename = "Week")]
    pub week: u32,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: i64,
    #[serde(rename = "Average")]
    #[tabled(rename = "Average")]
    pub average: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub countries: usize,
    pub continents: usize,
    pub world_cases: i64,
    pub world_deaths: i64,
    pub top_country: Option<String>,
    pub rows_skipped: usize,
    pub loaded_at: String,
}
