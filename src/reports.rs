use crate::coordinator::Snapshot;
use crate::region::Region;
use crate::types::{
    BatchReport, CountryRankingRow, RegionTotalsRow, SeriesRow, SeriesTable, SummaryStats,
};
use crate::util::{format_int, format_number, short_name};

const SHORT_NAME_CHARS: usize = 12;

/// Ranked country rows, at most `limit` of them.
pub fn country_ranking(snapshot: &Snapshot, limit: usize) -> Vec<CountryRankingRow> {
    snapshot
        .ranked_countries()
        .take(limit)
        .enumerate()
        .map(|(idx, c)| CountryRankingRow {
            rank: idx + 1,
            code: c.code().unwrap_or_default().to_string(),
            name: short_name(&c.name, SHORT_NAME_CHARS),
            population: format_int(c.population),
            total_cases: format_int(c.total_cases),
            total_deaths: format_int(c.total_deaths),
        })
        .collect()
}

fn totals_row(region: &Region) -> RegionTotalsRow {
    RegionTotalsRow {
        region: region.name.clone(),
        population: format_int(region.population),
        total_cases: format_int(region.total_cases),
        total_deaths: format_int(region.total_deaths),
    }
}

/// One row per continent in feed order, followed by the world row.
pub fn continent_totals(snapshot: &Snapshot) -> Vec<RegionTotalsRow> {
    let mut rows: Vec<RegionTotalsRow> = snapshot.continents().iter().map(totals_row).collect();
    if let Some(world) = snapshot.world() {
        rows.push(totals_row(world));
    }
    rows
}

/// Day-by-day rows of a series table.
pub fn series_rows(table: &SeriesTable) -> Vec<SeriesRow> {
    table
        .values
        .iter()
        .zip(&table.avg_values)
        .zip(&table.week_index)
        .enumerate()
        .map(|(i, ((value, avg), week))| SeriesRow {
            day: table.start_day + i as u32,
            week: *week,
            value: *value,
            average: format_number(*avg, 2),
        })
        .collect()
}

pub fn generate_summary(snapshot: &Snapshot, report: &BatchReport) -> SummaryStats {
    let (world_cases, world_deaths) = snapshot
        .world()
        .map(|w| (w.total_cases, w.total_deaths))
        .unwrap_or((0, 0));
    SummaryStats {
        countries: snapshot.countries().len(),
        continents: snapshot.continents().len(),
        world_cases,
        world_deaths,
        top_country: snapshot.ranking().first().cloned(),
        rows_skipped: report.rows_skipped,
        loaded_at: report.loaded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}
