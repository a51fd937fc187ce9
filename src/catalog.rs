use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{DataLoadError, UnknownTargetType};

static CATALOG: OnceLock<MoveCatalog> = OnceLock::new();

/// How a move picks its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Single,
    All,
    #[serde(rename = "self")]
    User,
    None,
    Auto,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Single => "single",
            TargetType::All => "all",
            TargetType::User => "self",
            TargetType::None => "none",
            TargetType::Auto => "auto",
        }
    }

    /// Whether the player has to pick a target explicitly
    pub fn needs_target(&self) -> bool {
        matches!(self, TargetType::Single)
    }
}

impl FromStr for TargetType {
    type Err = UnknownTargetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(TargetType::Single),
            "all" => Ok(TargetType::All),
            "self" => Ok(TargetType::User),
            "none" => Ok(TargetType::None),
            "auto" => Ok(TargetType::Auto),
            other => Err(UnknownTargetType(other.to_string())),
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub en_name: String,
    pub target_type: TargetType,
}

/// One row of the move table as it appears on disk
#[derive(Debug, Deserialize)]
struct MoveRow {
    ja_name: String,
    en_name: String,
    target_type: String,
}

/// Display name -> move attributes, in table row order
#[derive(Debug, Default)]
pub struct MoveCatalog {
    records: HashMap<String, MoveRecord>,
    names: Vec<String>,
}

impl MoveCatalog {
    /// Loads the catalog from `csv_path` the first time it is called.
    ///
    /// Later calls return the cached catalog and never touch the file again,
    /// whatever path they pass.
    pub fn load<P: AsRef<Path>>(csv_path: P) -> Result<&'static MoveCatalog, DataLoadError> {
        if let Some(catalog) = CATALOG.get() {
            return Ok(catalog);
        }

        let path = csv_path.as_ref();
        let catalog = Self::from_path(path)?;
        log::info!("loaded {} moves from {}", catalog.len(), path.display());

        Ok(CATALOG.get_or_init(|| catalog))
    }

    /// Reads a move table file without caching it
    pub fn from_path<P: AsRef<Path>>(csv_path: P) -> Result<MoveCatalog, DataLoadError> {
        let path = csv_path.as_ref();
        let file = File::open(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Parses a move table without caching it
    pub fn from_reader<R: Read>(source: R) -> Result<MoveCatalog, DataLoadError> {
        // Fields are taken verbatim, so a name with stray spaces is a different key
        let mut reader = ReaderBuilder::new().from_reader(source);
        let headers = reader.headers()?.clone();

        let mut catalog = MoveCatalog::default();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            let row: MoveRow = record.deserialize(Some(&headers))?;

            let target_type = row.target_type.parse().map_err(|e: UnknownTargetType| {
                DataLoadError::UnknownTargetType {
                    line,
                    name: row.ja_name.clone(),
                    value: e.0,
                }
            })?;

            // A repeated name keeps its first position but takes the later attributes
            let previous = catalog.records.insert(
                row.ja_name.clone(),
                MoveRecord {
                    en_name: row.en_name,
                    target_type,
                },
            );
            if previous.is_none() {
                catalog.names.push(row.ja_name);
            } else {
                log::debug!(
                    "duplicate move `{}` on line {}, keeping the later row",
                    row.ja_name,
                    line
                );
            }
        }

        Ok(catalog)
    }

    pub fn lookup(&self, name: &str) -> Option<&MoveRecord> {
        self.records.get(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Type-ahead over display names (partial match) and English names
    /// (case-insensitive partial match), in table order
    pub fn search(&self, query: &str, limit: usize) -> Vec<&str> {
        let query = query.trim();
        let query_lower = query.to_lowercase();

        self.names
            .iter()
            .filter(|name| {
                query.is_empty()
                    || name.contains(query)
                    || self
                        .records
                        .get(name.as_str())
                        .map(|r| r.en_name.to_lowercase().contains(&query_lower))
                        .unwrap_or(false)
            })
            .take(limit)
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn test_catalog() -> MoveCatalog {
    let table = "\
ja_name,en_name,target_type
まもる,Protect,all
でんこうせっか,Quick Attack,single
ねこだまし,Fake Out,single
つるぎのまい,Swords Dance,self
じしん,Earthquake,all
おいかぜ,Tailwind,none
わるあがき,Struggle,auto
";
    MoveCatalog::from_reader(table.as_bytes()).unwrap()
}
