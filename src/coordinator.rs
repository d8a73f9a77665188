// Batch ingestion: feed table in, consistent snapshot out.
//
// Every batch builds a brand new `Snapshot`. It only replaces the published
// one once all rows went through, so a failing batch leaves the previous
// snapshot untouched.
use crate::error::{FeedError, Result};
use crate::loader;
use crate::ranking::rank_countries;
use crate::region::Region;
use crate::series;
use crate::types::{BatchReport, FeedRow, Record, RegionId, SeriesTable, Variable};
use chrono::Local;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Regions, ranking and series tables produced by one batch.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    countries: Vec<Region>,
    country_index: HashMap<String, usize>,
    continents: Vec<Region>,
    continent_index: HashMap<String, usize>,
    world: Option<Region>,
    ranking: Vec<String>,
}

impl Snapshot {
    pub fn country(&self, code: &str) -> Option<&Region> {
        self.country_index.get(code).map(|&i| &self.countries[i])
    }

    pub fn continent(&self, name: &str) -> Option<&Region> {
        self.continent_index.get(name).map(|&i| &self.continents[i])
    }

    pub fn world(&self) -> Option<&Region> {
        self.world.as_ref()
    }

    /// Countries in the order the feed introduced them.
    pub fn countries(&self) -> &[Region] {
        &self.countries
    }

    /// Continents in the order the feed introduced them.
    pub fn continents(&self) -> &[Region] {
        &self.continents
    }

    /// Country codes, most deaths first.
    pub fn ranking(&self) -> &[String] {
        &self.ranking
    }

    pub fn ranked_countries(&self) -> impl Iterator<Item = &Region> {
        self.ranking.iter().filter_map(|code| self.country(code))
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn region(&self, id: &RegionId) -> Result<&Region> {
        let found = match id {
            RegionId::Country(code) => self.country(code),
            RegionId::Continent(name) => self.continent(name),
            RegionId::World => self.world(),
        };
        found.ok_or_else(|| FeedError::MissingRegion(id.to_string()))
    }

    /// Series table by region and variable name (`"cases"` or `"deaths"`).
    pub fn series(&self, id: &RegionId, variable_name: &str) -> Result<&SeriesTable> {
        let variable: Variable = variable_name.parse()?;
        Ok(self.region(id)?.table(variable))
    }

    fn continent_slot(&mut self, name: &str) -> usize {
        if let Some(&i) = self.continent_index.get(name) {
            return i;
        }
        debug!(continent = name, "new continent");
        self.continents.push(Region::continent(name));
        let i = self.continents.len() - 1;
        self.continent_index.insert(name.to_string(), i);
        i
    }

    /// Create a country and link it to its continent. The continent and the
    /// world gain the country's population here and only here.
    pub fn insert_country(
        &mut self,
        line: usize,
        code: &str,
        name: &str,
        population: i64,
        continent: &str,
    ) -> Result<usize> {
        if let Some(existing) = self.country(code) {
            return Err(FeedError::DuplicateRegion {
                code: code.to_string(),
                existing: existing.continent_name().unwrap_or_default().to_string(),
                requested: continent.to_string(),
            });
        }
        let ci = self.continent_slot(continent);
        let world = self.world.get_or_insert_with(Region::world);
        if world.add_population(population).is_none() {
            return Err(overflow(line, "population", &world.name));
        }
        let continent_region = &mut self.continents[ci];
        if continent_region.add_population(population).is_none() {
            return Err(overflow(line, "population", &continent_region.name));
        }
        debug!(country = code, continent, "new country");
        self.countries.push(Region::country(code, name, population, continent));
        let i = self.countries.len() - 1;
        self.country_index.insert(code.to_string(), i);
        Ok(i)
    }

    /// Existing country for the row, or a new one. A known code arriving with
    /// another continent would re-link it, which is refused.
    fn resolve_country(&mut self, row: &FeedRow) -> Result<usize> {
        match self.country_index.get(&row.country_code) {
            Some(&i) => {
                let linked = self.countries[i].continent_name().unwrap_or_default();
                if linked != row.continent {
                    return Err(FeedError::DuplicateRegion {
                        code: row.country_code.clone(),
                        existing: linked.to_string(),
                        requested: row.continent.clone(),
                    });
                }
                Ok(i)
            }
            None => self.insert_country(
                row.line,
                &row.country_code,
                &row.country_name,
                row.population,
                &row.continent,
            ),
        }
    }

    /// Attach a record to the country, its continent and the world. A count
    /// overflowing any of them fails the row.
    fn attach(&mut self, line: usize, country: usize, record: &Record) -> Result<()> {
        let continent_name = self.countries[country]
            .continent_name()
            .unwrap_or_default()
            .to_string();
        let ci = *self
            .continent_index
            .get(&continent_name)
            .ok_or_else(|| FeedError::MissingRegion(format!("continent '{}'", continent_name)))?;

        let world = self.world.get_or_insert_with(Region::world);
        let targets = [&mut self.countries[country], &mut self.continents[ci], world];
        for region in targets {
            if region.add_record(record).is_none() {
                return Err(overflow(line, "count", &region.name));
            }
        }
        Ok(())
    }

    /// Recompute every series table from the stored records.
    pub fn rebuild_series(&mut self) {
        let regions = self
            .countries
            .iter_mut()
            .chain(self.continents.iter_mut())
            .chain(self.world.iter_mut());
        for region in regions {
            series::rebuild(region);
        }
    }

    /// Build a snapshot from a raw feed table. The first row is the header.
    pub fn build<S: AsRef<str>>(table: &[Vec<S>]) -> Result<(Snapshot, BatchReport)> {
        let mut snap = Snapshot::default();
        let mut rows_ingested = 0usize;
        let mut rows_skipped = 0usize;
        let mut rows_blank = 0usize;

        for (line, fields) in table.iter().enumerate().skip(1) {
            let Some(row) = loader::clean_row(line, fields.as_slice())? else {
                rows_blank += 1;
                continue;
            };
            let record = match Record::from_row(&row) {
                Ok(r) => r,
                Err(e @ FeedError::InvalidDate { .. }) => {
                    warn!(line = row.line, country = %row.country_code, error = %e, "skipping row");
                    rows_skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            let country = snap.resolve_country(&row)?;
            snap.attach(row.line, country, &record)?;
            rows_ingested += 1;
        }

        snap.ranking = rank_countries(&snap.countries);
        snap.rebuild_series();

        let report = BatchReport {
            rows_read: table.len().saturating_sub(1),
            rows_ingested,
            rows_skipped,
            rows_blank,
            countries: snap.countries.len(),
            continents: snap.continents.len(),
            loaded_at: Local::now(),
        };
        Ok((snap, report))
    }
}

fn overflow(line: usize, what: &str, region: &str) -> FeedError {
    FeedError::MalformedRow {
        line,
        reason: format!("{} overflow in region '{}'", what, region),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Ingesting,
    Ready,
    Failed,
}

/// Owns the published snapshot and drives ingestion batches.
///
/// `ingest` takes `&mut self`, so two batches can never overlap and readers
/// cannot observe a half-built snapshot.
#[derive(Debug)]
pub struct Coordinator {
    state: BatchState,
    snapshot: Option<Snapshot>,
    last_report: Option<BatchReport>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            state: BatchState::Idle,
            snapshot: None,
            last_report: None,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Last successfully built snapshot, also while in `Failed`.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn last_report(&self) -> Option<&BatchReport> {
        self.last_report.as_ref()
    }

    /// Replace all region state with the contents of `table`.
    pub fn ingest<S: AsRef<str>>(&mut self, table: &[Vec<S>]) -> Result<BatchReport> {
        self.state = BatchState::Ingesting;
        info!(rows = table.len(), "ingesting batch");
        match Snapshot::build(table) {
            Ok((snap, report)) => {
                info!(
                    rows_ingested = report.rows_ingested,
                    rows_skipped = report.rows_skipped,
                    countries = report.countries,
                    continents = report.continents,
                    "batch ready"
                );
                self.snapshot = Some(snap);
                self.last_report = Some(report.clone());
                self.state = BatchState::Ready;
                Ok(report)
            }
            Err(e) => {
                warn!(error = %e, "batch failed, keeping previous snapshot");
                self.state = BatchState::Failed;
                Err(e)
            }
        }
    }

    /// Recompute the series tables of the published snapshot. Idempotent.
    pub fn refresh(&mut self) {
        if let Some(snap) = self.snapshot.as_mut() {
            snap.rebuild_series();
        }
    }
}
