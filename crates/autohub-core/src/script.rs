//! User-authored automation scripts.
//!
//! A script is an ordered list of steps run against one browser session by
//! the `custom` task kind. Scripts are stored as JSON files:
//!
//! ```json
//! {
//!   "name": "hn-titles",
//!   "source": "hacker-news",
//!   "steps": [
//!     { "action": "goto", "url": "https://news.ycombinator.com" },
//!     { "action": "wait_for", "locator": { "css": ".titleline" } },
//!     { "action": "collect", "locator": { "css": ".titleline > a" }, "label": "title" }
//!   ]
//! }
//! ```

use crate::locator::Locator;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    Goto { url: String },
    WaitFor { locator: Locator },
    Click { locator: Locator },
    Type { locator: Locator, text: String },
    Clear { locator: Locator },
    PressEnter { locator: Locator },
    Sleep { millis: u64 },
    ExpectUrl { contains: String },
    Collect {
        locator: Locator,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribute: Option<String>,
    },
}

impl ScriptStep {
    pub fn locator(&self) -> Option<&Locator> {
        match self {
            ScriptStep::WaitFor { locator }
            | ScriptStep::Click { locator }
            | ScriptStep::Type { locator, .. }
            | ScriptStep::Clear { locator }
            | ScriptStep::PressEnter { locator }
            | ScriptStep::Collect { locator, .. } => Some(locator),
            ScriptStep::Goto { .. } | ScriptStep::Sleep { .. } | ScriptStep::ExpectUrl { .. } => {
                None
            }
        }
    }

    /// Short description for progress logs
    pub fn describe(&self) -> String {
        match self {
            ScriptStep::Goto { url } => format!("open {}", url),
            ScriptStep::WaitFor { locator } => format!("wait for {}", locator),
            ScriptStep::Click { locator } => format!("click {}", locator),
            ScriptStep::Type { locator, .. } => format!("type into {}", locator),
            ScriptStep::Clear { locator } => format!("clear {}", locator),
            ScriptStep::PressEnter { locator } => format!("press Enter in {}", locator),
            ScriptStep::Sleep { millis } => format!("sleep {}ms", millis),
            ScriptStep::ExpectUrl { contains } => format!("expect URL containing '{}'", contains),
            ScriptStep::Collect { locator, label, .. } => format!("collect {} from {}", label, locator),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Label recorded as the data source of collected values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn new(name: impl Into<String>, steps: Vec<ScriptStep>) -> Self {
        Self {
            name: name.into(),
            description: None,
            source: None,
            steps,
        }
    }

    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidScript("script name is empty".to_string()));
        }
        if self.steps.is_empty() {
            return Err(Error::InvalidScript(format!(
                "script '{}' has no steps",
                self.name
            )));
        }

        for (idx, step) in self.steps.iter().enumerate() {
            if step.locator().is_some_and(Locator::is_empty) {
                return Err(Error::InvalidScript(format!(
                    "step {} of '{}' has an empty selector",
                    idx + 1,
                    self.name
                )));
            }
            if let ScriptStep::Goto { url } = step {
                url::Url::parse(url).map_err(|e| {
                    Error::InvalidScript(format!("step {} has invalid URL '{}': {}", idx + 1, url, e))
                })?;
            }
        }

        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let script: Script = serde_json::from_reader(reader)?;
        Ok(script)
    }
}

/// Directory of `<name>.json` script files
pub struct ScriptStore {
    dir: PathBuf,
}

impl ScriptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// Names of stored scripts, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load a script by stored name, or from a path to a JSON file
    pub fn load(&self, name_or_path: &str) -> Result<Script> {
        let stored = self.path_for(name_or_path);
        let path = if stored.exists() {
            stored
        } else {
            let direct = PathBuf::from(name_or_path);
            if !direct.is_file() {
                return Err(Error::NotFound(format!("script '{}'", name_or_path)));
            }
            direct
        };

        tracing::debug!("Loading script from {}", path.display());
        Script::from_file(&path)
    }

    pub fn save(&self, script: &Script) -> Result<PathBuf> {
        script.validate()?;
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(&script.name);
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, script)?;

        tracing::debug!("Saved script '{}' to {}", script.name, path.display());
        Ok(path)
    }
}
