use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::Canvas;
use crate::foundation::error::MergeResult;
use crate::merger::gif_merger::GifMerger;
use crate::merger::item::{ItemPatch, ItemSource};

/// A merge described as data: the sources, their overrides and an optional canvas.
///
/// ```json
/// {
///   "canvas": { "width": 320, "height": 240 },
///   "items": [
///     { "path": "background.gif", "end_of_life": "loop" },
///     { "path": "logo.gif", "left": 12, "top": 8, "scale_x": 0.5, "scale_y": 0.5 }
///   ]
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Project {
    /// Overrides the canvas derived from the items.
    #[serde(default)]
    pub canvas: Option<Canvas>,
    pub items: Vec<ProjectItem>,
}

/// One source file plus the fields to set on its item.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectItem {
    pub path: PathBuf,
    #[serde(flatten)]
    pub patch: ItemPatch,
}

impl Project {
    pub fn from_json(text: &str) -> MergeResult<Self> {
        Ok(serde_json::from_str(text).context("parse project JSON")?)
    }

    /// Read a project file; relative item paths are resolved against its directory.
    pub fn load(path: &Path) -> MergeResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read project '{}'", path.display()))?;
        let mut project = Self::from_json(&text)?;
        project.resolve_paths(path.parent().unwrap_or_else(|| Path::new(".")));
        Ok(project)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        for item in &mut self.items {
            if item.path.is_relative() {
                item.path = base.join(&item.path);
            }
        }
    }

    /// Read every source and build a merger holding them in file order.
    pub fn build(&self) -> MergeResult<GifMerger> {
        let mut sources = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let binary = std::fs::read(&item.path)
                .with_context(|| format!("read source '{}'", item.path.display()))?;
            sources.push(ItemSource::gif(binary).with_patch(item.patch.clone()));
        }

        let mut merger = GifMerger::with_sources(sources)?;
        if let Some(canvas) = self.canvas {
            merger.set_canvas(canvas.width, canvas.height)?;
        }
        Ok(merger)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/config.rs"]
mod tests;
