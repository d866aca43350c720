//! Avro schema discovery and loading.
//!
//! The schema travels out of band: published payloads are schema-less Avro
//! datums, so the producer and consumer must load an identical descriptor
//! before touching the wire.

use std::path::{Path, PathBuf};

use apache_avro::Schema;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// A parsed Avro record schema for quote messages.
///
/// Loaded once per process and shared read-only across all workers.
#[derive(Debug, Clone)]
pub struct QuoteSchema {
    schema: Schema,
    namespace: String,
    name: String,
}

impl QuoteSchema {
    /// Find and parse the schema descriptor in `dir`.
    ///
    /// Exactly one `.avsc` file is expected. With none present the load
    /// fails; with several present the lexicographically first is used and
    /// a warning is logged.
    pub fn load(dir: &Path) -> Result<QuoteSchema> {
        let path = find_schema_file(dir)?;
        let contents = std::fs::read_to_string(&path)?;
        let schema = Schema::parse_str(&contents).map_err(|e| Error::MalformedSchema {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let Schema::Record(record) = &schema else {
            return Err(Error::MalformedSchema {
                path,
                reason: "top-level type is not a record".to_string(),
            });
        };
        let name = record.name.name.clone();
        let namespace = record.name.namespace.clone().unwrap_or_default();
        info!("Schema loaded: {namespace}.{name}");
        Ok(QuoteSchema {
            schema,
            namespace,
            name,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted `namespace.name` identifier, as written in the descriptor.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

fn find_schema_file(dir: &Path) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_avsc = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("avsc"));
        if path.is_file() && is_avsc {
            candidates.push(path);
        }
    }
    candidates.sort();
    if candidates.is_empty() {
        return Err(Error::NoSchemaFound(dir.to_path_buf()));
    }
    if candidates.len() > 1 {
        warn!(
            "Multiple .avsc files found in {}, using {}",
            dir.display(),
            candidates[0].display()
        );
    }
    Ok(candidates.remove(0))
}
