use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use strata_http::{
    AbortSignal, ApiConfig, HttpClient, HttpClientOptions, MaxRetryStrategy, TimeoutStrategy,
};

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct PokemonPage {
    count: u32,
    results: Vec<NamedResource>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = HttpClient::with_reqwest(HttpClientOptions {
        http_request_strategy: Some(Arc::new(MaxRetryStrategy::new(3))),
        base_url: Some("https://pokeapi.co/api/v2".to_owned()),
        ..HttpClientOptions::default()
    });

    let config = ApiConfig::default().with_params(serde_json::json!({
        "offset": 0,
        "limit": 20,
    }));
    let page: PokemonPage = client.get("/pokemon", config, None).await?;

    println!("{} pokemon known, first page:", page.count);
    for pokemon in &page.results {
        println!("  {} ({})", pokemon.name, pokemon.url);
    }

    // Per-call override: bound this request to a 2 second deadline and wire
    // up a cancellation signal we could fire from elsewhere.
    let signal = AbortSignal::new();
    let config = ApiConfig::default()
        .with_strategy(Arc::new(TimeoutStrategy::new(Duration::from_secs(2))));
    let pikachu: serde_json::Value = client.get("/pokemon/25", config, Some(&signal)).await?;
    println!("pikachu weighs {}", pikachu["weight"]);

    Ok(())
}
