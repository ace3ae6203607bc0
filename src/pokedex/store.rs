//! Pokedex Storage
//! Mission: Read-mostly Pokemon mirror with search and pagination

use crate::pokedex::models::{Pokemon, PokemonStat};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use serde::Deserialize;

/// Sort key for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Id,
    Name,
}

impl SortBy {
    fn as_sql(self) -> &'static str {
        match self {
            SortBy::Id => "id",
            SortBy::Name => "name",
        }
    }
}

/// Pokemon mirror with SQLite backend. Written only by the offline seeding
/// job; the server treats it as read-only.
pub struct PokedexStore {
    db_path: String,
}

const POKEMON_COLUMNS: &str = "id, name, height, weight, description, \
     sprite_front_default, sprite_official_artwork, types, abilities, stats";

impl PokedexStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS pokemon (
                id INTEGER PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                height INTEGER NOT NULL,
                weight INTEGER NOT NULL,
                description TEXT,
                sprite_front_default TEXT,
                sprite_official_artwork TEXT,
                types TEXT NOT NULL,
                abilities TEXT NOT NULL,
                stats TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    fn row_to_pokemon(row: &Row<'_>) -> rusqlite::Result<Pokemon> {
        Ok(Pokemon {
            id: row.get(0)?,
            name: row.get(1)?,
            height: row.get(2)?,
            weight: row.get(3)?,
            description: row.get(4)?,
            sprite_front_default: row.get(5)?,
            sprite_official_artwork: row.get(6)?,
            types: parse_json(row, 7)?,
            abilities: parse_json(row, 8)?,
            stats: parse_json::<Vec<PokemonStat>>(row, 9)?,
        })
    }

    /// Insert or replace a record by id (used by the seeding job and tests).
    pub fn upsert(&self, pokemon: &Pokemon) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO pokemon (id, name, height, weight, description,
                sprite_front_default, sprite_official_artwork, types, abilities, stats,
                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                height = excluded.height,
                weight = excluded.weight,
                description = excluded.description,
                sprite_front_default = excluded.sprite_front_default,
                sprite_official_artwork = excluded.sprite_official_artwork,
                types = excluded.types,
                abilities = excluded.abilities,
                stats = excluded.stats,
                updated_at = excluded.updated_at",
            params![
                pokemon.id,
                pokemon.name,
                pokemon.height,
                pokemon.weight,
                pokemon.description,
                pokemon.sprite_front_default,
                pokemon.sprite_official_artwork,
                serde_json::to_string(&pokemon.types)?,
                serde_json::to_string(&pokemon.abilities)?,
                serde_json::to_string(&pokemon.stats)?,
                now,
            ],
        )
        .context("Failed to upsert pokemon")?;

        Ok(())
    }

    /// Look up by numeric id or exact (lowercased) name.
    pub fn get(&self, name_or_id: &str) -> Result<Option<Pokemon>> {
        if let Ok(id) = name_or_id.parse::<i64>() {
            self.get_by_id(id)
        } else {
            self.get_by_name(&name_or_id.to_lowercase())
        }
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Pokemon>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {POKEMON_COLUMNS} FROM pokemon WHERE id = ?1"
        ))?;

        match stmt.query_row(params![id], Self::row_to_pokemon) {
            Ok(p) => Ok(Some(p)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<Pokemon>> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {POKEMON_COLUMNS} FROM pokemon WHERE name = ?1"
        ))?;

        match stmt.query_row(params![name], Self::row_to_pokemon) {
            Ok(p) => Ok(Some(p)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Search the catalog.
    ///
    /// An empty query lists everything. A purely numeric query tries an exact
    /// id lookup first and falls back to substring search. Returns the total
    /// match count alongside the requested page.
    pub fn search(
        &self,
        query: Option<&str>,
        offset: i64,
        limit: i64,
        sort_by: SortBy,
    ) -> Result<(i64, Vec<Pokemon>)> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());

        let Some(q) = query else {
            return self.list_all(offset, limit, sort_by);
        };

        // Exact-id fast path for numeric queries
        if q.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(id) = q.parse::<i64>() {
                if let Some(p) = self.get_by_id(id)? {
                    return Ok((1, vec![p]));
                }
            }
        }

        let needle = q.to_lowercase();
        let conn = Connection::open(&self.db_path)?;

        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pokemon WHERE instr(lower(name), ?1) > 0",
            params![needle],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {POKEMON_COLUMNS} FROM pokemon
             WHERE instr(lower(name), ?1) > 0
             ORDER BY {} LIMIT ?2 OFFSET ?3",
            sort_by.as_sql()
        ))?;

        let results = stmt
            .query_map(params![needle, limit, offset], Self::row_to_pokemon)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total, results))
    }

    fn list_all(&self, offset: i64, limit: i64, sort_by: SortBy) -> Result<(i64, Vec<Pokemon>)> {
        let conn = Connection::open(&self.db_path)?;

        let total: i64 = conn.query_row("SELECT COUNT(*) FROM pokemon", [], |row| row.get(0))?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {POKEMON_COLUMNS} FROM pokemon ORDER BY {} LIMIT ?1 OFFSET ?2",
            sort_by.as_sql()
        ))?;

        let results = stmt
            .query_map(params![limit, offset], Self::row_to_pokemon)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total, results))
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
