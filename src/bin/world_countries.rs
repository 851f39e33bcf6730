use spatial_client::countries::{AppConfig, AppContext, area_color};
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;

fn main() {
    SubscriberBuilder::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("world_countries failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let mut config = AppConfig::default();
    if let Some(path) = args.next() {
        config.db_path = PathBuf::from(path);
    }
    if let Some(table) = args.next() {
        config.countries_table = table;
    }

    let context = AppContext::load(config)?;
    for country in &context.countries {
        tracing::info!(
            code = %country.code,
            name = %country.name,
            area = country.area,
            color = area_color(country.area),
            "country"
        );
    }

    println!("{}", serde_json::to_string(&context.feature_collection()?)?);
    Ok(())
}
