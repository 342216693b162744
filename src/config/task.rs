use std::fmt;
use std::path::PathBuf;

use serde::de::{Error as _, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::feature::Feature;
use crate::domain::entities::extra_write::{ExtraWrite, ExtraWrites, RowTemplate, WriteContent};
use crate::domain::entities::mapping::ColumnMapping;
use crate::domain::entities::value::CellValue;
use crate::domain::reconcile::key_matcher::DuplicateKeys;
use crate::domain::reconcile::update_planner::AcceptancePolicy;
use crate::infra::sheet::is_writable;

const FUNCTION_KEY: &str = "function";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("task `{task}`: {feature} needs at least one key column")]
    EmptyKey { task: String, feature: &'static str },
    #[error("task `{task}`: update_warehouse needs at least one update column")]
    NoUpdateColumns { task: String },
    #[error(
        "task `{task}`: update_spreadsheet lists {sources} warehouse columns but {targets} sheet columns"
    )]
    ColumnCountMismatch {
        task: String,
        sources: usize,
        targets: usize,
    },
    #[error("task `{task}`: cannot append rows to read-only spreadsheet {path}")]
    ReadOnlySheet { task: String, path: String },
    #[error("task `{task}`: invalid accept_pattern: {reason}")]
    AcceptPattern { task: String, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    pub task: String,
    #[serde(default)]
    pub debug: bool,
    pub spreadsheet: SpreadsheetConfig,
    pub warehouse: WarehouseConfig,
    pub backup: Feature<BackupConfig>,
    pub update_warehouse: Feature<UpdateWarehouseConfig>,
    pub update_spreadsheet: Feature<UpdateSpreadsheetConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpreadsheetConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WarehouseConfig {
    pub database: PathBuf,
    pub select_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackupConfig {
    pub filename: String,
    #[serde(default = "current_dir")]
    pub directory: PathBuf,
}

fn current_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateWarehouseConfig {
    pub primary_key: Vec<String>,
    pub column_mapping: ColumnMapping,
    pub update_query: String,
    pub update_columns: Vec<String>,
    #[serde(default)]
    pub duplicate_keys: DuplicateKeys,
    #[serde(default)]
    pub accept_pattern: Option<String>,
    pub dry_run: bool,
}

impl UpdateWarehouseConfig {
    pub fn acceptance_policy(&self) -> Result<AcceptancePolicy, regex::Error> {
        match &self.accept_pattern {
            Some(pattern) => AcceptancePolicy::pattern(pattern),
            None => Ok(AcceptancePolicy::Alphanumeric),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateSpreadsheetConfig {
    pub merge_on: Vec<String>,
    pub sheet_columns: Vec<String>,
    pub warehouse_columns: Vec<String>,
    #[serde(default)]
    pub extra_writes: ExtraWrites,
    #[serde(default)]
    pub duplicate_keys: DuplicateKeys,
}

impl TaskConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let task = || self.task.clone();

        if let Some(update) = self.update_warehouse.enabled() {
            if update.primary_key.is_empty() {
                return Err(ConfigError::EmptyKey {
                    task: task(),
                    feature: "update_warehouse",
                });
            }
            if update.update_columns.is_empty() {
                return Err(ConfigError::NoUpdateColumns { task: task() });
            }
            update
                .acceptance_policy()
                .map_err(|err| ConfigError::AcceptPattern {
                    task: task(),
                    reason: err.to_string(),
                })?;
        }

        if let Some(append) = self.update_spreadsheet.enabled() {
            if append.merge_on.is_empty() {
                return Err(ConfigError::EmptyKey {
                    task: task(),
                    feature: "update_spreadsheet",
                });
            }
            if append.sheet_columns.len() != append.warehouse_columns.len() {
                return Err(ConfigError::ColumnCountMismatch {
                    task: task(),
                    sources: append.warehouse_columns.len(),
                    targets: append.sheet_columns.len(),
                });
            }
            if !is_writable(&self.spreadsheet.path) {
                return Err(ConfigError::ReadOnlySheet {
                    task: task(),
                    path: self.spreadsheet.path.display().to_string(),
                });
            }
        }

        Ok(())
    }
}

fn literal_value(value: Value) -> Result<CellValue, String> {
    match value {
        Value::Null => Ok(CellValue::Empty),
        Value::String(text) => Ok(CellValue::text(text)),
        Value::Number(number) => match number.as_i64() {
            Some(int) => Ok(CellValue::Integer(int)),
            None => number
                .as_f64()
                .map(CellValue::number)
                .ok_or_else(|| format!("unsupported number {number}")),
        },
        Value::Bool(flag) => Ok(CellValue::text(flag.to_string().to_uppercase())),
        other => Err(format!("literal writes must be scalars, found {other}")),
    }
}

impl<'de> Deserialize<'de> for ExtraWrites {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExtraWritesVisitor;

        impl<'de> Visitor<'de> for ExtraWritesVisitor {
            type Value = ExtraWrites;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of column writes with an optional `function` object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut writes = Vec::new();
                while let Some(column) = map.next_key::<String>()? {
                    if column == FUNCTION_KEY {
                        let templates = map.next_value::<ColumnMapping>()?;
                        for (target, template) in templates.pairs() {
                            let template = RowTemplate::parse(template).map_err(A::Error::custom)?;
                            writes.push(ExtraWrite {
                                column: target.to_string(),
                                content: WriteContent::Template(template),
                            });
                        }
                    } else {
                        let value = literal_value(map.next_value::<Value>()?)
                            .map_err(|reason| A::Error::custom(format!("{column}: {reason}")))?;
                        writes.push(ExtraWrite {
                            column,
                            content: WriteContent::Literal(value),
                        });
                    }
                }
                Ok(ExtraWrites::new(writes))
            }
        }

        deserializer.deserialize_map(ExtraWritesVisitor)
    }
}
