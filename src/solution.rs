//! Resolve the pair of projects Unity generates at the root of a project
//! directory: `Assembly-CSharp.csproj` and `Assembly-CSharp-Editor.csproj`.

use std::path::{Path, PathBuf};

use crate::csproj::{Project, ProjectParser};
use crate::diagnostics::Diagnostics;

/// Subdirectory every Unity project has.
pub const ASSETS_DIR: &str = "Assets";
/// Project file stem of the runtime scripts assembly.
pub const MAIN_PROJECT: &str = "Assembly-CSharp";
/// Project file stem of the editor scripts assembly.
pub const EDITOR_PROJECT: &str = "Assembly-CSharp-Editor";

/// The main and editor projects of one Unity project directory.  Either may
/// be missing without the solution being invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    pub directory: PathBuf,
    pub main: Option<Project>,
    pub editor: Option<Project>,
}

impl Solution {
    /// The projects that are present, main first.
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.main.iter().chain(self.editor.iter())
    }
}

/// Locates and parses the conventional project files of a Unity project.
#[derive(Debug, Clone)]
pub struct SolutionResolver {
    parser: ProjectParser,
    assets_dir: String,
    main_project: String,
    editor_project: String,
}

impl Default for SolutionResolver {
    fn default() -> Self {
        Self {
            parser: ProjectParser::default(),
            assets_dir: ASSETS_DIR.to_string(),
            main_project: MAIN_PROJECT.to_string(),
            editor_project: EDITOR_PROJECT.to_string(),
        }
    }
}

impl SolutionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser used for both project files.  Its diagnostics are the
    /// resolver's diagnostics.
    pub fn parser(mut self, parser: ProjectParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.parser = self.parser.diagnostics(diagnostics);
        self
    }

    pub fn assets_dir(mut self, name: impl Into<String>) -> Self {
        self.assets_dir = name.into();
        self
    }

    pub fn main_project(mut self, stem: impl Into<String>) -> Self {
        self.main_project = stem.into();
        self
    }

    pub fn editor_project(mut self, stem: impl Into<String>) -> Self {
        self.editor_project = stem.into();
        self
    }

    fn project_file(&self, stem: &str) -> String {
        format!("{stem}.{}", self.parser.file_extension())
    }

    /// Resolve the solution rooted at `directory`.
    ///
    /// Returns `None` for an empty or nonexistent path, a directory without
    /// an `Assets` folder, or a missing main project.  A missing editor
    /// project is only reported.
    pub fn resolve(&self, directory: impl AsRef<Path>) -> Option<Solution> {
        let directory = directory.as_ref();
        if directory.as_os_str().is_empty() || !directory.is_dir() {
            return None;
        }

        let root = directory
            .canonicalize()
            .unwrap_or_else(|_| directory.to_path_buf());
        let diagnostics = self.parser.diagnostics_handle();

        if !root.join(&self.assets_dir).is_dir() {
            diagnostics.warn(format!("Invalid Unity project path: {}", root.display()));
            return None;
        }

        let main_file = self.project_file(&self.main_project);
        let main_path = root.join(&main_file);
        if !main_path.is_file() {
            diagnostics.warn(format!("Missing {main_file} in {}", root.display()));
            return None;
        }

        let editor_file = self.project_file(&self.editor_project);
        let editor_path = root.join(&editor_file);
        let has_editor = editor_path.is_file();
        if !has_editor {
            diagnostics.warn(format!("Missing {editor_file} in {}", root.display()));
        }

        let main = self.parser.parse(&main_path);
        let editor = if has_editor {
            self.parser.parse(&editor_path)
        } else {
            None
        };

        Some(Solution { directory: root, main, editor })
    }
}

/// Resolve a solution with the default resolver (logging through `log`).
pub fn resolve_solution(directory: impl AsRef<Path>) -> Option<Solution> {
    SolutionResolver::new().resolve(directory)
}
