//! Pokedex Seeding Job
//! Mission: Mirror the PokeAPI catalog into the local database, offline

use anyhow::{Context, Result};
use clap::Parser;
use pokedex_backend::pokedex::{
    models::{Pokemon, PokemonStat},
    PokedexStore,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

const POKEAPI_BASE: &str = "https://pokeapi.co/api/v2";

#[derive(Parser, Debug)]
#[command(about = "Fetch Pokemon from PokeAPI and populate the local database")]
struct Args {
    /// Path to the sqlite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "db.sqlite3")]
    db: String,

    /// Maximum number of Pokemon to fetch
    #[arg(long, default_value_t = 2000)]
    limit: u32,
}

// ----- PokeAPI wire shapes (only the fields we mirror) -----

#[derive(Deserialize)]
struct ApiList {
    results: Vec<ApiListItem>,
}

#[derive(Deserialize)]
struct ApiListItem {
    name: String,
    url: String,
}

#[derive(Deserialize)]
struct ApiPokemon {
    id: i64,
    name: String,
    height: i64,
    weight: i64,
    types: Vec<ApiTypeSlot>,
    abilities: Vec<ApiAbilitySlot>,
    stats: Vec<ApiStatValue>,
    sprites: ApiSprites,
}

#[derive(Deserialize)]
struct ApiNamedRef {
    name: String,
}

#[derive(Deserialize)]
struct ApiTypeSlot {
    #[serde(rename = "type")]
    kind: ApiNamedRef,
}

#[derive(Deserialize)]
struct ApiAbilitySlot {
    ability: ApiNamedRef,
}

#[derive(Deserialize)]
struct ApiStatValue {
    base_stat: i64,
    stat: ApiNamedRef,
}

#[derive(Deserialize)]
struct ApiSprites {
    front_default: Option<String>,
    other: Option<ApiOtherSprites>,
}

#[derive(Deserialize)]
struct ApiOtherSprites {
    #[serde(rename = "official-artwork")]
    official_artwork: Option<ApiArtwork>,
}

#[derive(Deserialize)]
struct ApiArtwork {
    front_default: Option<String>,
}

#[derive(Deserialize)]
struct ApiSpecies {
    flavor_text_entries: Vec<ApiFlavorText>,
}

#[derive(Deserialize)]
struct ApiFlavorText {
    flavor_text: String,
    language: ApiNamedRef,
}

/// First English flavor text, whitespace-normalized (the raw entries contain
/// newlines and form feeds).
fn extract_english_description(species: &ApiSpecies) -> Option<String> {
    species
        .flavor_text_entries
        .iter()
        .find(|entry| entry.language.name == "en")
        .map(|entry| {
            entry
                .flavor_text
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
}

/// The list endpoint carries ids only inside the detail URL
/// (".../pokemon/25/").
fn id_from_url(url: &str) -> Option<i64> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

async fn fetch_pokemon(client: &reqwest::Client, id: i64) -> Result<ApiPokemon> {
    client
        .get(format!("{POKEAPI_BASE}/pokemon/{id}"))
        .send()
        .await?
        .error_for_status()?
        .json::<ApiPokemon>()
        .await
        .with_context(|| format!("Failed to decode pokemon {id}"))
}

async fn fetch_species(client: &reqwest::Client, id: i64) -> Option<ApiSpecies> {
    let response = client
        .get(format!("{POKEAPI_BASE}/pokemon-species/{id}"))
        .send()
        .await
        .ok()?
        .error_for_status()
        .ok()?;
    response.json::<ApiSpecies>().await.ok()
}

fn to_record(details: ApiPokemon, description: Option<String>) -> Pokemon {
    let sprite_official_artwork = details
        .sprites
        .other
        .and_then(|o| o.official_artwork)
        .and_then(|a| a.front_default);

    Pokemon {
        id: details.id,
        name: details.name,
        height: details.height,
        weight: details.weight,
        description,
        sprite_front_default: details.sprites.front_default,
        sprite_official_artwork,
        types: details.types.into_iter().map(|t| t.kind.name).collect(),
        abilities: details
            .abilities
            .into_iter()
            .map(|a| a.ability.name)
            .collect(),
        stats: details
            .stats
            .into_iter()
            .map(|s| PokemonStat {
                name: s.stat.name,
                base_stat: s.base_stat,
            })
            .collect(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let store = PokedexStore::new(&args.db)?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()?;

    info!("Fetching Pokemon list from PokeAPI...");
    let list = client
        .get(format!("{POKEAPI_BASE}/pokemon"))
        .query(&[("limit", args.limit)])
        .send()
        .await?
        .error_for_status()?
        .json::<ApiList>()
        .await
        .context("Failed to decode Pokemon list")?;

    let total = list.results.len();
    info!("Found {} Pokemon to mirror", total);

    let mut seeded = 0usize;
    for (idx, item) in list.results.iter().enumerate() {
        let Some(id) = id_from_url(&item.url) else {
            warn!("Skipping {}: unparseable url {}", item.name, item.url);
            continue;
        };

        info!("[{}/{}] Fetching {}...", idx + 1, total, item.name);

        let details = match fetch_pokemon(&client, id).await {
            Ok(d) => d,
            Err(e) => {
                warn!("Skipping {}: {e:#}", item.name);
                continue;
            }
        };

        let description = match fetch_species(&client, id).await {
            Some(species) => extract_english_description(&species),
            None => None,
        };

        store.upsert(&to_record(details, description))?;
        seeded += 1;
    }

    info!("✅ Seeded {}/{} Pokemon into {}", seeded, total, args.db);
    Ok(())
}
