use crate::region::Region;

/// Country codes ordered by total deaths, highest first.
///
/// The sort is stable and ties are not broken, so countries with equal
/// totals keep the order in which the feed first introduced them.
pub fn rank_countries(countries: &[Region]) -> Vec<String> {
    let mut ranked: Vec<&Region> = countries.iter().filter(|c| c.code().is_some()).collect();
    ranked.sort_by(|a, b| b.total_deaths.cmp(&a.total_deaths));
    ranked
        .into_iter()
        .filter_map(|c| c.code().map(str::to_string))
        .collect()
}
