//! Code/name lookup tables
//!
//! Static tables supplied by the caller: state code → state name, and
//! county FIPS → county name. Lookups are single FxHashMap reads.

use rustc_hash::FxHashMap;
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};

/// State code ↔ state name table
#[derive(Debug, Clone, Default)]
pub struct StateLookup {
    names: FxHashMap<String, String>,
}

impl StateLookup {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let names = pairs
            .into_iter()
            .map(|(code, name)| (code.into(), name.into()))
            .collect();
        Self { names }
    }

    /// Load a `{ "code": "name" }` JSON object
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state code table: {:?}", path))?;

        let names: FxHashMap<String, String> = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse state code table JSON")?;

        Ok(Self { names })
    }

    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    /// Display name for a code, falling back to the code itself
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.name_of(code).unwrap_or(code)
    }

    /// Does a state record with `code` belong to the state named `selected`?
    ///
    /// Matches on the resolved name; falls back to raw code equality so a
    /// filter given as a code ("IL") still works when the table lacks it.
    pub fn matches(&self, code: &str, selected: &str) -> bool {
        self.name_of(code) == Some(selected) || code == selected
    }

    /// All codes registered under a state name
    pub fn codes_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.names
            .iter()
            .filter(move |(_, n)| n.as_str() == name)
            .map(|(code, _)| code.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// County FIPS codes shorter than five characters are left-padded with zeros
pub fn normalize_county_fips(fips: &str) -> String {
    if fips.is_empty() || fips.len() >= 5 {
        fips.to_string()
    } else {
        format!("{:0>5}", fips)
    }
}

/// Display name derived from a district id (state code + two-digit number)
pub fn district_name_from_id(district_id: &str) -> String {
    let number = district_id.get(2..).unwrap_or("");
    if number == "00" || number == "98" {
        return "At-Large".to_string();
    }
    match number.parse::<u32>() {
        Ok(n) => format!("Congressional District {}", n),
        Err(_) => format!("Congressional District {}", number),
    }
}
