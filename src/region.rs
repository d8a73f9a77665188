// Geographic entities and their accumulation rules.
//
// Countries keep every record they are given, in arrival order. Continents
// and the world fold same-day contributions into one record per day.
use crate::calendar::Day;
use crate::types::{Record, SeriesTable, Variable};
use std::collections::BTreeMap;

pub const AVG_WIDTH: usize = 7;

#[derive(Debug, Clone)]
pub enum RegionKind {
    Country {
        code: String,
        continent: String,
        records: Vec<Record>,
    },
    Continent {
        days: BTreeMap<Day, Record>,
    },
    World {
        days: BTreeMap<Day, Record>,
    },
}

#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub population: i64,
    pub total_cases: i64,
    pub total_deaths: i64,
    pub cases_table: SeriesTable,
    pub deaths_table: SeriesTable,
    pub kind: RegionKind,
}

impl Region {
    fn with_kind(name: String, population: i64, kind: RegionKind) -> Self {
        Self {
            name,
            population,
            total_cases: 0,
            total_deaths: 0,
            cases_table: SeriesTable::empty(Variable::Cases, AVG_WIDTH),
            deaths_table: SeriesTable::empty(Variable::Deaths, AVG_WIDTH),
            kind,
        }
    }

    pub fn country(code: &str, name: &str, population: i64, continent: &str) -> Self {
        Self::with_kind(
            name.to_string(),
            population,
            RegionKind::Country {
                code: code.to_string(),
                continent: continent.to_string(),
                records: Vec::new(),
            },
        )
    }

    pub fn continent(name: &str) -> Self {
        Self::with_kind(
            name.to_string(),
            0,
            RegionKind::Continent {
                days: BTreeMap::new(),
            },
        )
    }

    pub fn world() -> Self {
        Self::with_kind(
            "World".to_string(),
            0,
            RegionKind::World {
                days: BTreeMap::new(),
            },
        )
    }

    /// Country code, `None` for continents and the world.
    pub fn code(&self) -> Option<&str> {
        match &self.kind {
            RegionKind::Country { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn continent_name(&self) -> Option<&str> {
        match &self.kind {
            RegionKind::Country { continent, .. } => Some(continent),
            _ => None,
        }
    }

    /// Attach one record. Countries append it as is; continents and the world
    /// sum it into the slot for its day, opening a zeroed slot when needed.
    /// Totals always grow by the incoming counts.
    ///
    /// Returns `None` and leaves the region unchanged when a total or a day
    /// slot would overflow.
    #[must_use = "an overflowing record is not attached"]
    pub fn add_record(&mut self, record: &Record) -> Option<()> {
        let total_cases = self.total_cases.checked_add(record.new_cases)?;
        let total_deaths = self.total_deaths.checked_add(record.new_deaths)?;
        match &mut self.kind {
            RegionKind::Country { records, .. } => records.push(*record),
            RegionKind::Continent { days } | RegionKind::World { days } => {
                let slot = days
                    .get(&record.day)
                    .copied()
                    .unwrap_or_else(|| Record::zeroed(record.day));
                let cases = slot.new_cases.checked_add(record.new_cases)?;
                let deaths = slot.new_deaths.checked_add(record.new_deaths)?;
                days.insert(
                    record.day,
                    Record {
                        new_cases: cases,
                        new_deaths: deaths,
                        ..slot
                    },
                );
            }
        }
        self.total_cases = total_cases;
        self.total_deaths = total_deaths;
        Some(())
    }

    /// Add a member country's population. `None` on overflow.
    #[must_use = "an overflowing population is not added"]
    pub fn add_population(&mut self, population: i64) -> Option<()> {
        self.population = self.population.checked_add(population)?;
        Some(())
    }

    /// Number of stored records (slots, for day-indexed regions).
    pub fn record_count(&self) -> usize {
        match &self.kind {
            RegionKind::Country { records, .. } => records.len(),
            RegionKind::Continent { days } | RegionKind::World { days } => days.len(),
        }
    }

    /// Sum of the stored counts for `variable`, re-derived from the records.
    pub fn recount(&self, variable: Variable) -> i64 {
        match &self.kind {
            RegionKind::Country { records, .. } => records.iter().map(|r| r.count(variable)).sum(),
            RegionKind::Continent { days } | RegionKind::World { days } => {
                days.values().map(|r| r.count(variable)).sum()
            }
        }
    }

    pub fn total(&self, variable: Variable) -> i64 {
        match variable {
            Variable::Cases => self.total_cases,
            Variable::Deaths => self.total_deaths,
        }
    }

    /// In-year records in day order, prior-year records left out.
    ///
    /// Countries are sorted stably, so same-day rows keep arrival order.
    /// Day-indexed regions are made contiguous by filling missing days with
    /// zeroed records.
    pub fn ordered_records(&self) -> Vec<Record> {
        match &self.kind {
            RegionKind::Country { records, .. } => {
                let mut out: Vec<Record> = records
                    .iter()
                    .filter(|r| r.day.ordinal().is_some())
                    .copied()
                    .collect();
                out.sort_by_key(|r| r.day);
                out
            }
            RegionKind::Continent { days } | RegionKind::World { days } => {
                let mut out: Vec<Record> = Vec::with_capacity(days.len());
                let mut next: Option<u32> = None;
                for (day, record) in days.range(Day::Ordinal(0)..) {
                    let Some(n) = day.ordinal() else { continue };
                    if let Some(mut gap) = next {
                        while gap < n {
                            out.push(Record::zeroed(Day::Ordinal(gap)));
                            gap += 1;
                        }
                    }
                    out.push(*record);
                    next = Some(n + 1);
                }
                out
            }
        }
    }

    pub fn table(&self, variable: Variable) -> &SeriesTable {
        match variable {
            Variable::Cases => &self.cases_table,
            Variable::Deaths => &self.deaths_table,
        }
    }

    pub fn set_table(&mut self, table: SeriesTable) {
        match table.variable {
            Variable::Cases => self.cases_table = table,
            Variable::Deaths => self.deaths_table = table,
        }
    }
}
