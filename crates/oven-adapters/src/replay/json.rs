//! One JSON file per template under a replay directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use tracing::{debug, instrument};

use oven_core::{
    application::{ApplicationError, ports::ReplayStore},
    domain::{Context, Value},
    error::OvenResult,
};

use crate::filesystem::map_io_error;

/// On-disk shape of a replay file.
#[derive(Debug, Serialize)]
struct ReplayRecord<'a> {
    template: &'a str,
    baked_at: DateTime<Utc>,
    context: &'a Context,
}

#[derive(Debug, Deserialize)]
struct StoredRecord {
    #[serde(default)]
    baked_at: Option<DateTime<Utc>>,
    context: Map<String, Json>,
}

/// Stores each template's last context as `<dir>/<template>.json`.
#[derive(Debug, Clone)]
pub struct JsonReplayStore {
    dir: PathBuf,
}

impl JsonReplayStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the replay file for `template`.
    pub fn path_for(&self, template: &str) -> PathBuf {
        let file: String = template
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl ReplayStore for JsonReplayStore {
    #[instrument(skip(self, context), fields(dir = %self.dir.display()))]
    fn save(&self, template: &str, context: &Context) -> OvenResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| map_io_error(&self.dir, e, "create directory"))?;

        let record = ReplayRecord {
            template,
            baked_at: Utc::now(),
            context,
        };
        let json = serde_json::to_string_pretty(&record).map_err(|e| ApplicationError::ReplayFailed {
            reason: format!("failed to serialize context: {e}"),
        })?;

        let path = self.path_for(template);
        fs::write(&path, json + "\n").map_err(|e| map_io_error(&path, e, "write file"))?;
        debug!(path = %path.display(), keys = context.len(), "recorded context");
        Ok(())
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    fn load(&self, template: &str) -> OvenResult<Context> {
        let path = self.path_for(template);
        if !path.is_file() {
            return Err(ApplicationError::ReplayNotFound {
                template: template.to_string(),
                path,
            }
            .into());
        }

        let raw = fs::read_to_string(&path).map_err(|e| map_io_error(&path, e, "read file"))?;
        let record: StoredRecord = serde_json::from_str(&raw).map_err(|e| ApplicationError::ReplayFailed {
            reason: format!("{} is not a replay file: {e}", path.display()),
        })?;

        let mut context = Context::new();
        for (key, value) in record.context {
            let value = match value {
                Json::Bool(b) => Value::Flag(b),
                Json::String(s) => Value::Text(s),
                Json::Number(n) => Value::Text(n.to_string()),
                other => {
                    return Err(ApplicationError::ReplayFailed {
                        reason: format!("{}: key '{key}' holds unsupported value {other}", path.display()),
                    }
                    .into());
                }
            };
            context.insert(key, value);
        }

        debug!(
            path = %path.display(),
            keys = context.len(),
            baked_at = ?record.baked_at,
            "loaded recorded context"
        );
        Ok(context)
    }
}
