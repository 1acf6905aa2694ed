use crate::types::{Champion, StepError};
use tracing::warn;

// Built-in champion descriptors
const DESCRIPTOR_TEXTS: [&str; 3] = [
    include_str!("../champions/bb12x14.bb"),
    include_str!("../champions/bb13x13.bb"),
    include_str!("../champions/bb13x13-updated.bb"),
];

lazy_static::lazy_static! {
    pub static ref CHAMPIONS: Vec<Champion> = load_builtin();
}

fn load_builtin() -> Vec<Champion> {
    DESCRIPTOR_TEXTS
        .iter()
        .filter_map(|text| match crate::parser::parse(text) {
            Ok(champion) => Some(champion),
            Err(e) => {
                warn!(error = %e, "failed to parse built-in descriptor");
                None
            }
        })
        .collect()
}

pub struct ChampionRegistry;

impl ChampionRegistry {
    /// Get all built-in champions in registry order
    pub fn champions() -> Vec<Champion> {
        CHAMPIONS.clone()
    }

    /// Get the number of built-in champions
    pub fn count() -> usize {
        CHAMPIONS.len()
    }

    /// Get a champion by its index
    pub fn by_index(index: usize) -> Result<Champion, StepError> {
        CHAMPIONS.get(index).cloned().ok_or_else(|| {
            StepError::ValidationError(format!("Champion index {} out of range", index))
        })
    }

    /// Get a champion by its name, ignoring case
    pub fn by_name(name: &str) -> Result<Champion, StepError> {
        CHAMPIONS
            .iter()
            .find(|champion| champion.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| StepError::ValidationError(format!("Champion '{}' not found", name)))
    }

    /// Get a champion by index if `query` is a number, by name otherwise
    pub fn lookup(query: &str) -> Result<Champion, StepError> {
        match query.parse::<usize>() {
            Ok(index) => Self::by_index(index),
            Err(_) => Self::by_name(query),
        }
    }

    /// Search for champions by name
    pub fn search(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        CHAMPIONS
            .iter()
            .enumerate()
            .filter(|(_, champion)| champion.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Get the descriptor text of a champion by its index
    pub fn text_by_index(index: usize) -> Result<&'static str, StepError> {
        DESCRIPTOR_TEXTS.get(index).copied().ok_or_else(|| {
            StepError::ValidationError(format!("Descriptor index {} out of range", index))
        })
    }

    /// Get information about a champion by its index
    pub fn info(index: usize) -> Result<ChampionInfo, StepError> {
        let champion = Self::by_index(index)?;

        Ok(ChampionInfo {
            index,
            name: champion.name,
            program: champion.program,
            multiplier: champion.recurrence.multiplier,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ChampionInfo {
    pub index: usize,
    pub name: String,
    pub program: Option<String>,
    pub multiplier: u64,
}
