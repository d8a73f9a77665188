// Builds the published daily series for a region.
use crate::region::{Region, AVG_WIDTH};
use crate::types::{SeriesTable, Variable};

/// Compute the series table for one variable of a region.
///
/// Leading zero days are trimmed, the table starts at the first day with a
/// positive count. A region with no positive count yields an empty table.
pub fn build_table(region: &Region, variable: Variable) -> SeriesTable {
    let records = region.ordered_records();

    let Some(first_nz) = records.iter().position(|r| r.count(variable) > 0) else {
        return SeriesTable::empty(variable, AVG_WIDTH);
    };
    let trimmed = &records[first_nz..];

    let values: Vec<i64> = trimmed.iter().map(|r| r.count(variable)).collect();
    let week_index: Vec<u32> = trimmed.iter().map(|r| r.week).collect();
    let peak = values.iter().copied().max().unwrap_or(0).max(0);
    let avg_values = trailing_average(&values, AVG_WIDTH);
    // first_nz indexes an in-year record, so the ordinal is always present
    let start_day = trimmed[0].day.ordinal().unwrap_or(0);

    SeriesTable {
        start_day,
        variable,
        peak,
        values,
        avg_values,
        week_index,
        avg_width: AVG_WIDTH,
    }
}

/// Rolling mean over the `width` most recent samples ending at each position.
/// Early positions average over however many samples exist so far.
pub fn trailing_average(values: &[i64], width: usize) -> Vec<f64> {
    let width = width.max(1);
    let mut out = Vec::with_capacity(values.len());
    // i128 holds any window of i64 counts
    let mut sum: i128 = 0;
    for (i, v) in values.iter().enumerate() {
        sum += i128::from(*v);
        if i >= width {
            sum -= i128::from(values[i - width]);
        }
        let n = (i + 1).min(width);
        out.push(sum as f64 / n as f64);
    }
    out
}

/// Rebuild both variable tables of a region in place.
pub fn rebuild(region: &mut Region) {
    for variable in Variable::ALL {
        let table = build_table(region, variable);
        region.set_table(table);
    }
}
