//! Pokedex Models
//! Mission: Pokemon records and PokeAPI-compatible response shapes

use serde::{Deserialize, Serialize};

/// A mirrored Pokemon record, populated offline by the seeding job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: i64,
    pub name: String,
    pub height: i64,
    pub weight: i64,
    pub description: Option<String>,
    pub sprite_front_default: Option<String>,
    pub sprite_official_artwork: Option<String>,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub stats: Vec<PokemonStat>,
}

/// A single (name, value) stat pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonStat {
    pub name: String,
    pub base_stat: i64,
}

// ----- List view -----

#[derive(Debug, Serialize, Deserialize)]
pub struct PokemonListItem {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub sprite: Option<String>,
    pub types: Vec<String>,
}

impl PokemonListItem {
    pub fn from_record(p: &Pokemon) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            url: format!("/pokemon/{}", p.id),
            sprite: p.sprite_front_default.clone(),
            types: p.types.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PokemonListResponse {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<PokemonListItem>,
}

// ----- Detail view (mirrors the PokeAPI nesting clients already consume) -----

#[derive(Debug, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedRef,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedRef,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatValue {
    pub base_stat: i64,
    pub stat: NamedRef,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OfficialArtwork {
    pub front_default: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OtherSprites {
    pub official_artwork: OfficialArtwork,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
    pub other: OtherSprites,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PokemonDetails {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Primary sprite: official artwork when present, front sprite otherwise.
    pub sprite: Option<String>,
    pub sprites: Sprites,
    pub types: Vec<TypeSlot>,
    pub height: i64,
    pub weight: i64,
    pub abilities: Vec<AbilitySlot>,
    pub stats: Vec<StatValue>,
}

impl PokemonDetails {
    pub fn from_record(p: &Pokemon) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            description: p.description.clone(),
            sprite: p
                .sprite_official_artwork
                .clone()
                .or_else(|| p.sprite_front_default.clone()),
            sprites: Sprites {
                front_default: p.sprite_front_default.clone(),
                other: OtherSprites {
                    official_artwork: OfficialArtwork {
                        front_default: p.sprite_official_artwork.clone(),
                    },
                },
            },
            types: p
                .types
                .iter()
                .map(|name| TypeSlot {
                    kind: NamedRef { name: name.clone() },
                })
                .collect(),
            height: p.height,
            weight: p.weight,
            abilities: p
                .abilities
                .iter()
                .map(|name| AbilitySlot {
                    ability: NamedRef { name: name.clone() },
                })
                .collect(),
            stats: p
                .stats
                .iter()
                .map(|s| StatValue {
                    base_stat: s.base_stat,
                    stat: NamedRef {
                        name: s.name.clone(),
                    },
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulbasaur() -> Pokemon {
        Pokemon {
            id: 1,
            name: "bulbasaur".to_string(),
            height: 7,
            weight: 69,
            description: Some("A strange seed was planted on its back at birth.".to_string()),
            sprite_front_default: Some("https://sprites/1.png".to_string()),
            sprite_official_artwork: Some("https://artwork/1.png".to_string()),
            types: vec!["grass".to_string(), "poison".to_string()],
            abilities: vec!["overgrow".to_string()],
            stats: vec![PokemonStat {
                name: "hp".to_string(),
                base_stat: 45,
            }],
        }
    }

    #[test]
    fn test_details_shape() {
        let details = PokemonDetails::from_record(&bulbasaur());
        let json = serde_json::to_value(&details).unwrap();

        // Official artwork wins as the primary sprite
        assert_eq!(json["sprite"], "https://artwork/1.png");
        assert_eq!(
            json["sprites"]["other"]["official_artwork"]["front_default"],
            "https://artwork/1.png"
        );
        assert_eq!(json["types"][0]["type"]["name"], "grass");
        assert_eq!(json["abilities"][0]["ability"]["name"], "overgrow");
        assert_eq!(json["stats"][0]["base_stat"], 45);
        assert_eq!(json["stats"][0]["stat"]["name"], "hp");
    }

    #[test]
    fn test_list_item_falls_back_to_front_sprite() {
        let item = PokemonListItem::from_record(&bulbasaur());
        assert_eq!(item.url, "/pokemon/1");
        assert_eq!(item.sprite.as_deref(), Some("https://sprites/1.png"));
        assert_eq!(item.types, vec!["grass", "poison"]);
    }
}
