use chrono::Local;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn};
use weather_journal::app::App;
use weather_journal::config::{Cli, Commands, Config, ListArgs};
use weather_journal::query::{self, mood_summary, DateFilter, SortOrder, ViewState};
use weather_journal::store::{EntryStore, JsonFileStore};
use weather_journal::weather::WeatherClient;
use weather_journal::{logging, report, tui};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = Config::from_cli(&cli)?;
    logging::init(&config)
        .wrap_err_with(|| format!("Failed to open log in {}", config.data_dir.display()))?;

    let store = JsonFileStore::in_dir(&config.data_dir);
    info!(path = %store.path().display(), "Using journal");

    match cli.command {
        None => {
            let weather = WeatherClient::new(&config.geocoding_url, &config.forecast_url)
                .wrap_err("Failed to set up weather lookups")?;
            let today = Local::now().date_naive();
            let mut app = App::new(store, config.page_size, config.debounce, today);
            tui::run(&mut app, weather).await?;
        }
        Some(Commands::List(args)) => run_list(&store, &config, &args)?,
        Some(Commands::Moods { json }) => run_moods(&store, json)?,
    }

    Ok(())
}

fn run_list(store: &JsonFileStore, config: &Config, args: &ListArgs) -> Result<()> {
    if let Err(e) = store.ensure_identifiers() {
        warn!("Could not store assigned ids: {e}");
    }
    let entries = store.load();

    let sort = if args.oldest {
        SortOrder::OldestFirst
    } else {
        SortOrder::NewestFirst
    };
    let date_filter = if args.today {
        DateFilter::TodayOnly
    } else {
        DateFilter::All
    };
    let view = ViewState::default()
        .with_search(&args.search)
        .with_sort(sort)
        .with_date_filter(date_filter)
        .with_page(args.page);

    let page = query::query(&entries, &view, Local::now().date_naive(), config.page_size);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report::list_json(&page))?);
    } else {
        print!("{}", report::list_text(&page));
    }
    Ok(())
}

fn run_moods(store: &JsonFileStore, json: bool) -> Result<()> {
    let moods = mood_summary(&store.load());
    if json {
        println!("{}", serde_json::to_string_pretty(&report::moods_json(&moods))?);
    } else {
        print!("{}", report::moods_text(&moods));
    }
    Ok(())
}
