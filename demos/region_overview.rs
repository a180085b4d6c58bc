use anyhow::{Context, Result};
use redfin::{Client, PropertyType, Region, RegionType, SearchResultsQuery};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG=redfin=debug shows each request.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Needs a browser-like user-agent: REDFIN_USER_AGENT or `user-agent:` in `.redfinrc`.
    let client = Client::from_env()?;

    let query = std::env::args().nth(1).unwrap_or_else(|| "12206".to_string());
    let search = client.search(&query)?;
    let region_id = client
        .region_id_from_search(&search)
        .with_context(|| format!("no Redfin region matches {query:?}"))?;
    let region = Region::new(RegionType::Zip, region_id.as_str());

    let trends = client.get_region_trends(&region, Some(PropertyType::House))?;
    println!("{trends:#}");

    let export = SearchResultsQuery::new(region_id.as_str(), RegionType::Zip).num_homes(350);
    let path = client.download_search_results_table(&export, Path::new("search_results.csv"))?;
    println!("saved {}", path.display());
    Ok(())
}
