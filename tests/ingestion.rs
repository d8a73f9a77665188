//! End-to-end ingestion through the public coordinator API.

use epi_report::calendar::Day;
use epi_report::region::RegionKind;
use epi_report::{BatchState, Coordinator, FeedError, RegionId, Variable};
use proptest::prelude::*;
use std::collections::HashSet;

const HEADER: &str = "dateRep,day,month,year,cases,deaths,countriesAndTerritories,geoId,countryterritoryCode,popData2019,continentExp";

fn feed_row(day: u32, month: u32, year: i32, cases: i64, deaths: i64, code: &str, continent: &str) -> Vec<String> {
    vec![
        format!("{:02}/{:02}/{}", day, month, year),
        day.to_string(),
        month.to_string(),
        year.to_string(),
        cases.to_string(),
        deaths.to_string(),
        format!("Land_of_{}", code),
        code[..2].to_string(),
        code.to_string(),
        "1000".to_string(),
        continent.to_string(),
    ]
}

fn with_header(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut table = vec![HEADER.split(',').map(str::to_string).collect()];
    table.extend(rows);
    table
}

#[test]
fn two_countries_one_continent() {
    let table = with_header(vec![
        feed_row(1, 1, 2020, 0, 0, "AAA", "X"),
        feed_row(2, 1, 2020, 0, 5, "AAA", "X"),
        feed_row(1, 1, 2020, 0, 10, "BBB", "X"),
    ]);
    let mut coordinator = Coordinator::new();
    assert_eq!(coordinator.state(), BatchState::Idle);
    let report = coordinator.ingest(&table).unwrap();
    assert_eq!(coordinator.state(), BatchState::Ready);
    assert_eq!(report.rows_read, 3);
    assert_eq!(report.rows_ingested, 3);

    let snap = coordinator.snapshot().unwrap();
    assert_eq!(snap.ranking(), ["BBB".to_string(), "AAA".to_string()]);
    assert_eq!(snap.continent("X").unwrap().total_deaths, 15);
    assert_eq!(snap.continent("X").unwrap().population, 2000);
    assert_eq!(snap.world().unwrap().total_deaths, 15);

    let deaths = snap.series(&RegionId::Country("AAA".into()), "deaths").unwrap();
    assert_eq!(deaths.start_day, 2);
    assert_eq!(deaths.values, vec![5]);
    assert_eq!(deaths.avg_values, vec![5.0]);
    assert_eq!(deaths.peak, 5);

    let continent = snap.series(&RegionId::Continent("X".into()), "deaths").unwrap();
    assert_eq!(continent.start_day, 1);
    assert_eq!(continent.values, vec![10, 5]);
    assert_eq!(continent.avg_values, vec![10.0, 7.5]);

    // no cases anywhere: empty, not an error
    let cases = snap.series(&RegionId::World, "cases").unwrap();
    assert!(cases.is_empty());
    assert_eq!(cases.peak, 0);
}

#[test]
fn empty_batch_clears_previous_state() {
    let mut coordinator = Coordinator::new();
    coordinator
        .ingest(&with_header(vec![feed_row(3, 1, 2020, 1, 1, "AAA", "X")]))
        .unwrap();
    assert!(!coordinator.snapshot().unwrap().is_empty());

    let report = coordinator.ingest(&with_header(vec![])).unwrap();
    assert_eq!(report.rows_read, 0);
    let snap = coordinator.snapshot().unwrap();
    assert!(snap.ranking().is_empty());
    assert!(snap.countries().is_empty());
    assert!(snap.continents().is_empty());
    assert!(snap.world().is_none());

    // a table without even a header behaves the same
    let none: Vec<Vec<String>> = Vec::new();
    coordinator.ingest(&none).unwrap();
    assert!(coordinator.snapshot().unwrap().is_empty());
}

#[test]
fn failed_batch_keeps_last_snapshot() {
    let mut coordinator = Coordinator::new();
    coordinator
        .ingest(&with_header(vec![feed_row(3, 1, 2020, 4, 1, "AAA", "X")]))
        .unwrap();

    let mut broken = feed_row(4, 1, 2020, 4, 1, "BBB", "X");
    broken[4] = "lots".to_string();
    let err = coordinator
        .ingest(&with_header(vec![feed_row(4, 1, 2020, 9, 9, "CCC", "Y"), broken]))
        .unwrap_err();
    assert!(matches!(err, FeedError::MalformedRow { line: 2, .. }));
    assert_eq!(coordinator.state(), BatchState::Failed);

    let snap = coordinator.snapshot().unwrap();
    assert!(snap.country("CCC").is_none());
    assert_eq!(snap.country("AAA").unwrap().total_cases, 4);

    // retry with a fresh table
    coordinator
        .ingest(&with_header(vec![feed_row(5, 1, 2020, 2, 0, "BBB", "X")]))
        .unwrap();
    assert_eq!(coordinator.state(), BatchState::Ready);
    assert!(coordinator.snapshot().unwrap().country("AAA").is_none());
}

#[test]
fn country_changing_continent_is_rejected() {
    let mut coordinator = Coordinator::new();
    let err = coordinator
        .ingest(&with_header(vec![
            feed_row(1, 1, 2020, 1, 0, "AAA", "X"),
            feed_row(2, 1, 2020, 1, 0, "AAA", "Y"),
        ]))
        .unwrap_err();
    assert!(matches!(err, FeedError::DuplicateRegion { ref code, .. } if code == "AAA"));
    assert!(coordinator.snapshot().is_none());
}

#[test]
fn invalid_dates_are_skipped_and_counted() {
    let table = with_header(vec![
        feed_row(28, 2, 2020, 1, 0, "AAA", "X"),
        feed_row(29, 2, 2020, 7, 0, "AAA", "X"),
        feed_row(1, 3, 2020, 2, 0, "AAA", "X"),
        feed_row(1, 1, 2021, 5, 0, "AAA", "X"),
    ]);
    let mut coordinator = Coordinator::new();
    let report = coordinator.ingest(&table).unwrap();
    assert_eq!(report.rows_ingested, 2);
    assert_eq!(report.rows_skipped, 2);

    let snap = coordinator.snapshot().unwrap();
    let aaa = snap.country("AAA").unwrap();
    assert_eq!(aaa.total_cases, 3);
    assert_eq!(snap.continent("X").unwrap().total_cases, 3);
    assert_eq!(snap.world().unwrap().total_cases, 3);
    assert_eq!(aaa.cases_table.start_day, 59);
    assert_eq!(aaa.cases_table.values, vec![1, 2]);
}

#[test]
fn leap_day_alone_creates_no_region() {
    let table = with_header(vec![feed_row(29, 2, 2020, 100, 0, "AAA", "X")]);
    let mut coordinator = Coordinator::new();
    let report = coordinator.ingest(&table).unwrap();
    assert_eq!(report.rows_ingested, 0);
    assert_eq!(report.rows_skipped, 1);
    let snap = coordinator.snapshot().unwrap();
    assert!(snap.country("AAA").is_none());
    assert!(snap.world().is_none());
}

#[test]
fn overflowing_counts_fail_the_batch() {
    let mut coordinator = Coordinator::new();
    coordinator
        .ingest(&with_header(vec![feed_row(3, 1, 2020, 4, 1, "AAA", "X")]))
        .unwrap();

    let huge = with_header(vec![
        feed_row(1, 1, 2020, i64::MAX, 0, "BBB", "X"),
        feed_row(2, 1, 2020, i64::MAX, 0, "BBB", "X"),
    ]);
    let err = coordinator.ingest(&huge).unwrap_err();
    match err {
        FeedError::MalformedRow { line, reason } => {
            assert_eq!(line, 2);
            assert!(reason.contains("overflow"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(coordinator.state(), BatchState::Failed);
    let snap = coordinator.snapshot().unwrap();
    assert!(snap.country("BBB").is_none());
    assert_eq!(snap.country("AAA").unwrap().total_cases, 4);

    // one huge count on its own is fine
    let single = with_header(vec![feed_row(1, 1, 2020, i64::MAX, 0, "BBB", "X")]);
    coordinator.ingest(&single).unwrap();
    let bbb = coordinator.snapshot().unwrap().country("BBB").unwrap();
    assert_eq!(bbb.cases_table.peak, i64::MAX);
}

#[test]
fn blank_rows_are_counted_apart() {
    let table = with_header(vec![
        feed_row(1, 1, 2020, 1, 0, "AAA", "X"),
        vec![String::new()],
        feed_row(1, 1, 2021, 1, 0, "AAA", "X"),
        vec![" ".to_string(), String::new()],
    ]);
    let mut coordinator = Coordinator::new();
    let report = coordinator.ingest(&table).unwrap();
    assert_eq!(report.rows_read, 4);
    assert_eq!(report.rows_ingested, 1);
    assert_eq!(report.rows_skipped, 1);
    assert_eq!(report.rows_blank, 2);
}

#[test]
fn prior_year_counts_in_totals_but_not_in_series() {
    let table = with_header(vec![
        feed_row(31, 12, 2019, 3, 1, "AAA", "X"),
        feed_row(30, 12, 2019, 2, 0, "BBB", "X"),
        feed_row(1, 1, 2020, 4, 0, "AAA", "X"),
    ]);
    let mut coordinator = Coordinator::new();
    coordinator.ingest(&table).unwrap();
    let snap = coordinator.snapshot().unwrap();

    let x = snap.continent("X").unwrap();
    assert_eq!(x.total_cases, 9);
    assert_eq!(x.record_count(), 2);
    assert_eq!(x.cases_table.values, vec![4]);

    let aaa = snap.country("AAA").unwrap();
    assert_eq!(aaa.total_deaths, 1);
    assert!(aaa.deaths_table.is_empty());
}

#[test]
fn unknown_variable_and_region() {
    let mut coordinator = Coordinator::new();
    coordinator
        .ingest(&with_header(vec![feed_row(1, 1, 2020, 1, 0, "AAA", "X")]))
        .unwrap();
    let snap = coordinator.snapshot().unwrap();
    assert!(matches!(
        snap.series(&RegionId::World, "recovered"),
        Err(FeedError::InvalidVariableName(ref v)) if v == "recovered"
    ));
    assert!(matches!(
        snap.series(&RegionId::Continent("Atlantis".into()), "cases"),
        Err(FeedError::MissingRegion(_))
    ));
}

#[test]
fn placeholder_country_and_continent() {
    let mut row = feed_row(2, 1, 2020, 6, 0, "AAA", "");
    row[8] = String::new();
    let mut coordinator = Coordinator::new();
    coordinator.ingest(&with_header(vec![row])).unwrap();
    let snap = coordinator.snapshot().unwrap();
    let unknown = snap.country("UUU").unwrap();
    assert_eq!(unknown.name, "Unknown country");
    assert_eq!(unknown.continent_name(), Some("Unknown continent"));
    assert!(snap.continent("Unknown continent").is_some());
}

fn arb_row() -> impl Strategy<Value = Vec<String>> {
    (
        1u32..=28,
        1u32..=4,
        prop::bool::weighted(0.1),
        0i64..500,
        0i64..50,
        prop::sample::select(vec![("AAA", "X"), ("BBB", "X"), ("CCC", "Y"), ("DDD", "Z")]),
    )
        .prop_map(|(day, month, prior, cases, deaths, (code, continent))| {
            let year = if prior { 2019 } else { 2020 };
            feed_row(day, month, year, cases, deaths, code, continent)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn totals_and_day_slots_stay_consistent(rows in prop::collection::vec(arb_row(), 0..80)) {
        let mut coordinator = Coordinator::new();
        let report = coordinator.ingest(&with_header(rows)).unwrap();
        let snap = coordinator.snapshot().unwrap();

        for region in snap.countries().iter().chain(snap.continents()).chain(snap.world()) {
            for variable in Variable::ALL {
                prop_assert_eq!(region.total(variable), region.recount(variable));
                let table = region.table(variable);
                prop_assert_eq!(table.values.len(), table.avg_values.len());
                prop_assert_eq!(table.values.len(), table.week_index.len());
                if let Some(first) = table.values.first() {
                    prop_assert!(*first > 0);
                    prop_assert_eq!(table.avg_values[0], *first as f64);
                }
            }
        }

        // one slot per distinct day across member countries
        for continent in snap.continents() {
            let days: HashSet<Day> = snap
                .countries()
                .iter()
                .filter(|c| c.continent_name() == Some(continent.name.as_str()))
                .flat_map(|c| match &c.kind {
                    RegionKind::Country { records, .. } => records.iter().map(|r| r.day).collect::<Vec<_>>(),
                    _ => Vec::new(),
                })
                .collect();
            prop_assert_eq!(continent.record_count(), days.len());
        }

        let all_days: HashSet<Day> = snap
            .countries()
            .iter()
            .flat_map(|c| match &c.kind {
                RegionKind::Country { records, .. } => records.iter().map(|r| r.day).collect::<Vec<_>>(),
                _ => Vec::new(),
            })
            .collect();
        match snap.world() {
            Some(world) => prop_assert_eq!(world.record_count(), all_days.len()),
            None => prop_assert!(all_days.is_empty()),
        }

        let counted = report.rows_ingested + report.rows_skipped + report.rows_blank;
        prop_assert_eq!(report.rows_read, counted);

        let deaths: Vec<i64> = snap.ranked_countries().map(|c| c.total_deaths).collect();
        prop_assert!(deaths.windows(2).all(|w| w[0] >= w[1]));
    }
}
