//! Curriculum: ordered modules of learning tasks
//!
//! The curriculum file maps module names to their definitions. Iteration
//! order is the file's insertion order (it drives "next module" lookups), so
//! deserialization goes through a map visitor into a `Vec` rather than a
//! hash map. Task names are the primary key into progress state and must be
//! unique across the whole curriculum; duplicates are rejected at load.

use crate::error::Result;
use crate::types::{NextModuleInfo, TaskRef};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// One curriculum module and its ordered tasks
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub steps: Vec<String>,
    pub short_explanation: String,
    pub reward: String,
    pub difficulty: String,
    pub notification_asset: Option<String>,
}

/// Module fields as they appear in the curriculum file
#[derive(Debug, Deserialize)]
struct ModuleSpec {
    steps: Vec<String>,
    #[serde(default)]
    short_explanation: String,
    #[serde(default)]
    reward: String,
    #[serde(default)]
    difficulty: String,
    #[serde(default, alias = "video_path")]
    notification_asset: Option<String>,
}

/// The ordered collection of modules, immutable for the run
#[derive(Debug, Clone, Default)]
pub struct Curriculum {
    modules: Vec<Module>,
}

impl<'de> Deserialize<'de> for Curriculum {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CurriculumVisitor;

        impl<'de> Visitor<'de> for CurriculumVisitor {
            type Value = Curriculum;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a map of module name to module definition")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Curriculum, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut modules = Vec::new();
                let mut seen_tasks = HashSet::new();

                while let Some((name, spec)) = map.next_entry::<String, ModuleSpec>()? {
                    for step in &spec.steps {
                        if !seen_tasks.insert(step.clone()) {
                            return Err(de::Error::custom(format!(
                                "task name '{}' appears in more than one module",
                                step
                            )));
                        }
                    }
                    modules.push(Module {
                        name,
                        steps: spec.steps,
                        short_explanation: spec.short_explanation,
                        reward: spec.reward,
                        difficulty: spec.difficulty,
                        notification_asset: spec.notification_asset,
                    });
                }

                Ok(Curriculum { modules })
            }
        }

        deserializer.deserialize_map(CurriculumVisitor)
    }
}

impl Curriculum {
    /// Load the curriculum file. A missing file is non-fatal and yields an
    /// empty curriculum with a warning; a malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "curriculum file not found, starting with an empty curriculum");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        let curriculum = Self::from_json_str(&raw)?;
        info!(
            modules = curriculum.modules.len(),
            tasks = curriculum.task_names().count(),
            "curriculum loaded"
        );
        Ok(curriculum)
    }

    /// Parse a curriculum from JSON text
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Construct from already-built modules (tests, tooling)
    pub fn from_modules(modules: Vec<Module>) -> Self {
        Self { modules }
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Every task name, in curriculum order
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.modules
            .iter()
            .flat_map(|m| m.steps.iter().map(String::as_str))
    }

    /// The module whose step list contains `task_name`
    pub fn module_of_task(&self, task_name: &str) -> Option<&Module> {
        self.modules
            .iter()
            .find(|m| m.steps.iter().any(|s| s == task_name))
    }

    /// Resolve a predicted task label to its task and owning module
    pub fn find_task(&self, task_label: &str) -> Option<TaskRef> {
        self.module_of_task(task_label).map(|m| TaskRef {
            module_name: m.name.clone(),
            task_name: task_label.to_string(),
        })
    }

    /// The module immediately after `module_name` in insertion order
    pub fn next_after(&self, module_name: &str) -> Option<NextModuleInfo> {
        let idx = self.modules.iter().position(|m| m.name == module_name)?;
        self.modules.get(idx + 1).map(|m| NextModuleInfo {
            module_name: m.name.clone(),
            short_explanation: m.short_explanation.clone(),
        })
    }
}
