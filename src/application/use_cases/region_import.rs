// ============================================================
// REGION IMPORT USE CASE
// ============================================================
// Rebuild the province > regency > district > village tree from a SQL dump

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::region::{RegionLevel, RegionTuple};
use crate::infrastructure::db::regions::{RegionStore, SqliteRegionStore};

/// `('<code>','<name>')`, tolerating whitespace inside the parentheses.
/// Names may carry SQL-escaped quotes (`''`).
static REGION_TUPLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\s*'([^']*)'\s*,\s*'((?:[^']|'')*)'\s*\)").unwrap()
});

/// Extracts every `(code, name)` tuple in order of appearance. Anything
/// between tuples is ignored.
pub fn parse_region_tuples(dump: &str) -> Vec<RegionTuple> {
    REGION_TUPLE_PATTERN
        .captures_iter(dump)
        .map(|caps| RegionTuple {
            code: caps[1].to_string(),
            name: caps[2].replace("''", "'"),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    UnrecognizedCode { length: usize },
    MissingParent { parent_code: String },
    StorageFailure { message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnrecognizedCode { length } => {
                write!(f, "code length {} matches no region level", length)
            }
            SkipReason::MissingParent { parent_code } => {
                write!(f, "parent {} has not been imported", parent_code)
            }
            SkipReason::StorageFailure { message } => write!(f, "insert failed: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub code: String,
    pub name: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub tuples_found: usize,
    pub provinces: usize,
    pub regencies: usize,
    pub districts: usize,
    pub villages: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl ImportSummary {
    pub fn inserted(&self, level: RegionLevel) -> usize {
        match level {
            RegionLevel::Province => self.provinces,
            RegionLevel::Regency => self.regencies,
            RegionLevel::District => self.districts,
            RegionLevel::Village => self.villages,
        }
    }

    pub fn total_inserted(&self) -> usize {
        self.provinces + self.regencies + self.districts + self.villages
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    fn record_insert(&mut self, level: RegionLevel) {
        match level {
            RegionLevel::Province => self.provinces += 1,
            RegionLevel::Regency => self.regencies += 1,
            RegionLevel::District => self.districts += 1,
            RegionLevel::Village => self.villages += 1,
        }
    }

    fn log(&self) {
        info!(
            provinces = self.provinces,
            regencies = self.regencies,
            districts = self.districts,
            villages = self.villages,
            skipped = self.skipped_count(),
            "Region import finished"
        );
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tuples found: {}", self.tuples_found)?;
        writeln!(f, "  Provinces: {}", self.provinces)?;
        writeln!(f, "  Regencies: {}", self.regencies)?;
        writeln!(f, "  Districts: {}", self.districts)?;
        writeln!(f, "  Villages:  {}", self.villages)?;
        write!(f, "  Skipped:   {}", self.skipped_count())?;
        for skipped in &self.skipped {
            write!(f, "\n    {} ({}): {}", skipped.code, skipped.name, skipped.reason)?;
        }
        Ok(())
    }
}

/// Parent ids assigned during one run, keyed by code. Villages are leaves
/// and never cached.
#[derive(Default)]
struct ParentIds {
    provinces: HashMap<String, i64>,
    regencies: HashMap<String, i64>,
    districts: HashMap<String, i64>,
}

impl ParentIds {
    fn level(&self, level: RegionLevel) -> Option<&HashMap<String, i64>> {
        match level {
            RegionLevel::Province => Some(&self.provinces),
            RegionLevel::Regency => Some(&self.regencies),
            RegionLevel::District => Some(&self.districts),
            RegionLevel::Village => None,
        }
    }

    fn remember(&mut self, level: RegionLevel, code: &str, id: i64) {
        let cache = match level {
            RegionLevel::Province => &mut self.provinces,
            RegionLevel::Regency => &mut self.regencies,
            RegionLevel::District => &mut self.districts,
            RegionLevel::Village => return,
        };
        cache.insert(code.to_string(), id);
    }
}

/// Clears and reloads the whole region tree through `store`.
///
/// Bad tuples are skipped and reported, never fatal. Only a failure to
/// toggle integrity checks or clear the tables aborts the run, and integrity
/// checks are switched back on before any error is returned.
pub async fn load_regions<S>(store: &mut S, dump: &str) -> Result<ImportSummary>
where
    S: RegionStore + Send,
{
    store.disable_integrity().await?;
    info!("Foreign key checks disabled");

    let outcome = rebuild(store, dump).await;

    let restored = store.enable_integrity().await;
    match &restored {
        Ok(()) => info!("Foreign key checks enabled"),
        Err(e) => error!(error = %e, "Failed to re-enable foreign key checks"),
    }

    let summary = outcome?;
    restored?;
    summary.log();
    Ok(summary)
}

async fn rebuild<S>(store: &mut S, dump: &str) -> Result<ImportSummary>
where
    S: RegionStore + Send,
{
    for level in RegionLevel::CLEAR_ORDER {
        store.clear_level(level).await?;
    }
    info!("Region tables cleared");

    let tuples = parse_region_tuples(dump);
    info!(tuples = tuples.len(), "Parsed region dump");

    let mut summary = ImportSummary {
        tuples_found: tuples.len(),
        ..ImportSummary::default()
    };
    let mut parents = ParentIds::default();

    for tuple in tuples {
        let level = match RegionLevel::classify(&tuple.code) {
            Some(level) => level,
            None => {
                let length = tuple.code.len();
                warn!(code = %tuple.code, length, "Code matches no region level, skipping");
                skip(&mut summary, tuple, SkipReason::UnrecognizedCode { length });
                continue;
            }
        };

        let parent_id = match (level.parent(), level.parent_code(&tuple.code)) {
            (Some(parent_level), Some(parent_code)) => {
                let cached = parents
                    .level(parent_level)
                    .and_then(|cache| cache.get(parent_code))
                    .copied();
                match cached {
                    Some(id) => Some(id),
                    None => {
                        let parent_code = parent_code.to_string();
                        warn!(
                            code = %tuple.code,
                            level = %level,
                            parent_code = %parent_code,
                            "Parent not found, skipping"
                        );
                        skip(&mut summary, tuple, SkipReason::MissingParent { parent_code });
                        continue;
                    }
                }
            }
            _ => None,
        };

        match store
            .insert_region(level, &tuple.code, &tuple.name, parent_id)
            .await
        {
            Ok(id) => {
                parents.remember(level, &tuple.code, id);
                summary.record_insert(level);
            }
            Err(e) => {
                error!(code = %tuple.code, name = %tuple.name, error = %e, "Failed to import region");
                skip(
                    &mut summary,
                    tuple,
                    SkipReason::StorageFailure {
                        message: e.to_string(),
                    },
                );
            }
        }
    }

    Ok(summary)
}

fn skip(summary: &mut ImportSummary, tuple: RegionTuple, reason: SkipReason) {
    summary.skipped.push(SkippedRecord {
        code: tuple.code,
        name: tuple.name,
        reason,
    });
}

pub struct RegionImportUseCase {
    pool: SqlitePool,
}

impl RegionImportUseCase {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn import_file(&self, dump_path: &Path) -> Result<ImportSummary> {
        let start = Instant::now();
        let dump = tokio::fs::read_to_string(dump_path).await.map_err(|e| {
            AppError::IoError(format!(
                "Failed to read region dump {}: {}",
                dump_path.display(),
                e
            ))
        })?;
        info!(path = %dump_path.display(), bytes = dump.len(), "Region dump loaded");

        let summary = self.import_text(&dump).await?;
        info!(elapsed_ms = start.elapsed().as_millis() as u64, "Region import done");
        Ok(summary)
    }

    pub async fn import_text(&self, dump: &str) -> Result<ImportSummary> {
        let mut store = SqliteRegionStore::acquire(&self.pool).await?;
        load_regions(&mut store, dump).await
    }
}
