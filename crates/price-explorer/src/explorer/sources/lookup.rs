use super::LoadError;
use crate::explorer::domain::{NeighbourhoodLookup, NeighbourhoodRecord};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct LookupRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    neighbourhood_group: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    neighbourhood: Option<String>,
}

pub fn load_lookup<P: AsRef<Path>>(path: P) -> Result<NeighbourhoodLookup, LoadError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|err| LoadError::io(path, err))?;
    let lookup = parse_lookup(file).map_err(|err| LoadError::csv(path, err))?;

    info!(
        path = %path.display(),
        neighbourhoods = lookup.len(),
        "neighbourhood lookup loaded"
    );
    Ok(lookup)
}

/// Rows without a neighbourhood name carry nothing usable and are skipped.
pub(crate) fn parse_lookup<R: Read>(reader: R) -> Result<NeighbourhoodLookup, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<LookupRow>() {
        let row = row?;
        if let Some(name) = row.neighbourhood {
            records.push(NeighbourhoodRecord {
                group: row.neighbourhood_group,
                name,
            });
        }
    }

    Ok(NeighbourhoodLookup { records })
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
