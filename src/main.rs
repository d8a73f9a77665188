// Entry point and high-level CLI flow.
//
// - Option [1] reads the feed file and runs an ingestion batch.
// - Option [2] prints the country ranking and the continent/world totals.
// - Option [3] prints the daily series of one region for one variable.
// With `--once` the feed is loaded, reports are printed and the program exits.
use anyhow::Context;
use clap::Parser;
use epi_report::config::{load_settings, Settings};
use epi_report::{loader, output, reports, util, Coordinator, RegionId, Variable};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "epi_report", about = "Regional daily case and death series from a per-country feed")]
struct Cli {
    /// Feed CSV file (overrides `feed_path` from the configuration)
    #[arg(long)]
    feed: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory to export report CSV/JSON files into
    #[arg(long)]
    export: Option<PathBuf>,

    /// Load, print the reports once and exit
    #[arg(long)]
    once: bool,
}

fn prompt(text: &str) -> String {
    print!("{}", text);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask whether to go back to the menu. Returns `true` on `Y`.
fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Option [1]: read the feed and replace the current snapshot.
fn handle_load(coordinator: &mut Coordinator, settings: &Settings) {
    let table = match loader::read_feed(&settings.feed_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to load file {}: {}\n", settings.feed_path.display(), e);
            return;
        }
    };
    match coordinator.ingest(&table) {
        Ok(report) => {
            println!(
                "Processing feed... ({} rows read, {} ingested, {} countries, {} continents)",
                util::format_int(report.rows_read),
                util::format_int(report.rows_ingested),
                util::format_int(report.countries),
                util::format_int(report.continents)
            );
            if report.rows_blank > 0 {
                println!("Note: {} blank rows ignored.", util::format_int(report.rows_blank));
            }
            if report.rows_skipped > 0 {
                println!(
                    "Note: {} rows skipped due to dates outside the reference year.",
                    util::format_int(report.rows_skipped)
                );
            }
            println!(
                "Data was last updated at: {}\n",
                report.loaded_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
        Err(e) => {
            eprintln!("Feed rejected: {}", e);
            if coordinator.snapshot().is_some() {
                eprintln!("Keeping the previously loaded data.");
            }
            println!();
        }
    }
}

/// Option [2]: ranking and totals, exported when `--export` is set.
fn handle_rankings(coordinator: &Coordinator, settings: &Settings, export: Option<&PathBuf>) {
    let (Some(snapshot), Some(report)) = (coordinator.snapshot(), coordinator.last_report()) else {
        println!("Error: No data loaded. Please load the feed first (option 1).\n");
        return;
    };

    let ranking = reports::country_ranking(snapshot, snapshot.ranking().len());
    println!("Countries by Total Deaths");
    println!("(Top {})\n", settings.ranking_rows);
    output::preview_table_rows(&ranking, settings.ranking_rows);

    let totals = reports::continent_totals(snapshot);
    println!("Continent Totals\n");
    output::preview_table_rows(&totals, totals.len());

    let summary = reports::generate_summary(snapshot, report);
    if let Some(dir) = export {
        let results = [
            output::write_csv(&dir.join("country_ranking.csv"), &ranking),
            output::write_csv(&dir.join("continent_totals.csv"), &totals),
            output::write_json(&dir.join("summary.json"), &summary),
        ];
        for r in results {
            if let Err(e) = r {
                eprintln!("Write error: {}", e);
            }
        }
        println!("(Reports exported to {})\n", dir.display());
    }
}

fn parse_region(input: &str, settings: &Settings) -> RegionId {
    match input {
        "" => RegionId::Country(settings.default_country.clone()),
        "World" | "world" => RegionId::World,
        code if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) => {
            RegionId::Country(code.to_string())
        }
        name => RegionId::Continent(name.to_string()),
    }
}

/// Option [3]: series of one region and variable.
fn handle_series(coordinator: &Coordinator, settings: &Settings) {
    let Some(snapshot) = coordinator.snapshot() else {
        println!("Error: No data loaded. Please load the feed first (option 1).\n");
        return;
    };
    let region_input = prompt(&format!(
        "Country code, continent or World [{}]: ",
        settings.default_country
    ));
    let id = parse_region(&region_input, settings);
    let variable_input = prompt("Variable (cases/deaths) [cases]: ");
    let variable_name = if variable_input.is_empty() {
        Variable::Cases.as_str()
    } else {
        variable_input.as_str()
    };

    let table = match snapshot.series(&id, variable_name) {
        Ok(t) => t,
        Err(e) => {
            println!("Error: {}\n", e);
            return;
        }
    };
    let name = snapshot.region(&id).map(|r| r.name.as_str()).unwrap_or_default();
    println!("\n{} ({})", name, table.variable);
    if table.is_empty() {
        println!("No {} recorded yet.\n", table.variable);
        return;
    }
    println!(
        "Starting day {}, {} days, peak {}, {}-day average\n",
        table.start_day,
        table.len(),
        util::format_int(table.peak),
        table.avg_width
    );
    let rows = reports::series_rows(table);
    // most recent days are the interesting ones
    let skip = rows.len().saturating_sub(settings.preview_rows);
    output::preview_table_rows(&rows[skip..], settings.preview_rows);
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref()).context("loading configuration")?;
    if let Some(feed) = cli.feed {
        settings.feed_path = feed;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(dir) = &cli.export {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating export directory {}", dir.display()))?;
    }

    let mut coordinator = Coordinator::new();

    if cli.once {
        handle_load(&mut coordinator, &settings);
        handle_rankings(&coordinator, &settings, cli.export.as_ref());
        return Ok(());
    }

    loop {
        println!("Select an option:");
        println!("[1] Load the feed");
        println!("[2] Country ranking and continent totals");
        println!("[3] Region series\n");
        match prompt("Enter choice: ").as_str() {
            "1" => handle_load(&mut coordinator, &settings),
            choice @ ("2" | "3") => {
                println!();
                if choice == "2" {
                    handle_rankings(&coordinator, &settings, cli.export.as_ref());
                } else {
                    handle_series(&coordinator, &settings);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
    Ok(())
}
