use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::diagnostics::Diagnostics;

/// Extension of Unity-generated project files, without the dot.
pub const PROJECT_EXTENSION: &str = "csproj";

// ═══════════════════════════════════════════════════════════════════════════════
//  Error
// ═══════════════════════════════════════════════════════════════════════════════

/// Failure while loading a project file.
///
/// [`ProjectParser::parse`] never returns this; it reports it through the
/// parser's diagnostics and hands back a best-effort [`Project`].
#[derive(Debug, Error)]
pub enum CsprojError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed project XML")]
    Xml(#[from] roxmltree::Error),
}

/// `error: cause: cause ...` for logging.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

// ═══════════════════════════════════════════════════════════════════════════════
//  ProjectParser – lenient file entry point
// ═══════════════════════════════════════════════════════════════════════════════

/// Loads `.csproj` files into [`Project`]s.
///
/// Invalid input (empty path, wrong extension, missing file) yields `None`.
/// Read and XML failures are logged through the configured diagnostics and
/// still yield `Some`, holding whatever was assembled before the failure.
#[derive(Debug, Clone)]
pub struct ProjectParser {
    extension: String,
    diagnostics: Diagnostics,
}

impl Default for ProjectParser {
    fn default() -> Self {
        Self {
            extension: PROJECT_EXTENSION.to_string(),
            diagnostics: Diagnostics::default(),
        }
    }
}

impl ProjectParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepted file extension, compared case-insensitively.  A leading dot
    /// is ignored.
    pub fn extension(mut self, extension: impl AsRef<str>) -> Self {
        self.extension = extension.as_ref().trim_start_matches('.').to_string();
        self
    }

    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn file_extension(&self) -> &str {
        &self.extension
    }

    pub(crate) fn diagnostics_handle(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Parse the project file at `path`.
    pub fn parse(&self, path: impl AsRef<Path>) -> Option<Project> {
        let path = path.as_ref();
        if !self.accepts(path) {
            return None;
        }

        let directory = path
            .canonicalize()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf));

        let mut project = match load(path) {
            Ok(project) => project,
            Err(error) => {
                self.diagnostics.error(format!(
                    "Failed to parse {}: {}",
                    path.display(),
                    error_chain(&error)
                ));
                Project::default()
            }
        };
        project.directory = directory;
        Some(project)
    }

    fn accepts(&self, path: &Path) -> bool {
        if path.as_os_str().is_empty() {
            return false;
        }
        let suffix = format!(".{}", self.extension.to_lowercase());
        path.to_string_lossy().to_lowercase().ends_with(&suffix) && path.is_file()
    }
}

fn load(path: &Path) -> Result<Project, CsprojError> {
    let source = std::fs::read_to_string(path).map_err(|source| CsprojError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Project::parse_str(&source)
}

/// Parse a project file with the default parser (logging through `log`).
pub fn parse_project(path: impl AsRef<Path>) -> Option<Project> {
    ProjectParser::new().parse(path)
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Type definitions
// ═══════════════════════════════════════════════════════════════════════════════

// Property values stay `Option<String>` whatever their logical type: `None`
// means the element is absent from the file, never a default.

/// A `<Compile Include="...">` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileItem {
    pub path: String,
}

impl CompileItem {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The include path with Windows separators turned into `/`.
    pub fn normalized_path(&self) -> String {
        self.path.replace('\\', "/")
    }
}

/// A `<Reference Include="...">` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceItem {
    pub name: Option<String>,
    pub hint_path: Option<String>,
}

impl ReferenceItem {
    pub fn new(name: Option<String>, hint_path: Option<String>) -> Self {
        Self { name, hint_path }
    }
}

/// The build configurations Unity generates a conditioned group for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Configuration {
    Debug,
    Release,
}

impl Configuration {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
        }
    }
}

impl std::fmt::Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A conditioned `<PropertyGroup>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyGroup {
    pub debug_symbols: Option<String>,
    pub debug_type: Option<String>,
    pub optimize: Option<String>,
    pub output_path: Option<String>,
    pub define_constants: Option<String>,
    pub error_report: Option<String>,
    pub warning_level: Option<String>,
    pub allow_unsafe_blocks: Option<String>,
    /// Raw `Condition` attribute.
    pub condition: Option<String>,
    /// Child elements not captured by the typed fields above.
    pub other: HashMap<String, String>,
}

impl PropertyGroup {
    /// `DefineConstants` split on `;`.
    pub fn defines(&self) -> Vec<&str> {
        self.define_constants
            .as_deref()
            .map(|d| d.split(';').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// Root representation of a `.csproj` file (`<Project>`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    pub compile_items: Vec<CompileItem>,
    pub reference_items: Vec<ReferenceItem>,

    pub assembly_name: Option<String>,
    pub schema_version: Option<String>,
    pub product_version: Option<String>,
    pub target_framework_version: Option<String>,
    pub file_alignment: Option<String>,
    pub base_directory: Option<String>,
    pub output_type: Option<String>,
    pub project_guid: Option<String>,

    pub debug: Option<PropertyGroup>,
    pub release: Option<PropertyGroup>,

    /// Directory containing the project file.  `None` for
    /// [`Project::parse_str`].
    pub directory: Option<PathBuf>,
}

impl Project {
    /// Parse project XML.  Unlike [`ProjectParser::parse`] this reports
    /// malformed XML as an error.
    pub fn parse_str(source: &str) -> Result<Self, CsprojError> {
        let doc = roxmltree::Document::parse(source)?;
        Ok(Self::from_root(doc.root_element()))
    }

    pub fn property_group(&self, configuration: Configuration) -> Option<&PropertyGroup> {
        match configuration {
            Configuration::Debug => self.debug.as_ref(),
            Configuration::Release => self.release.as_ref(),
        }
    }

    /// Compile items resolved against [`directory`](Self::directory) when
    /// it is known.
    pub fn source_files(&self) -> Vec<PathBuf> {
        self.compile_items
            .iter()
            .map(|item| {
                let relative = item.normalized_path();
                match &self.directory {
                    Some(dir) => dir.join(relative),
                    None => PathBuf::from(relative),
                }
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Parsing – roxmltree → owned types
// ═══════════════════════════════════════════════════════════════════════════════

/// Names of the typed children of a conditioned `<PropertyGroup>`.
const CONFIGURED_PROPERTIES: [&str; 8] = [
    "DebugSymbols",
    "DebugType",
    "Optimize",
    "OutputPath",
    "DefineConstants",
    "ErrorReport",
    "WarningLevel",
    "AllowUnsafeBlocks",
];

/// Assign `$target.$field` from the first `$tag` child of `$node`.  Missing
/// elements clear the field.
macro_rules! read_elements {
    ($target:expr, $scope:expr, $node:expr, $($tag:literal => $field:ident),* $(,)?) => {
        $(
            $target.$field = $scope.first($node, $tag).map(element_value);
        )*
    };
}

/// Element lookups qualified by the document's default namespace.
#[derive(Debug, Clone, Copy)]
struct Scope<'a> {
    namespace: Option<&'a str>,
}

impl Scope<'_> {
    fn is(&self, node: &roxmltree::Node, name: &str) -> bool {
        node.is_element()
            && node.tag_name().name() == name
            && node.tag_name().namespace() == self.namespace
    }

    fn in_scope(&self, node: &roxmltree::Node) -> bool {
        node.is_element() && node.tag_name().namespace() == self.namespace
    }

    fn first<'a, 'input>(
        &self,
        parent: roxmltree::Node<'a, 'input>,
        name: &str,
    ) -> Option<roxmltree::Node<'a, 'input>> {
        parent.children().find(|n| self.is(n, name))
    }
}

impl Project {
    fn from_root(root: roxmltree::Node) -> Self {
        let scope = Scope { namespace: root.tag_name().namespace() };
        let mut project = Self::default();

        for group in root.children().filter(|n| scope.is(n, "ItemGroup")) {
            for item in group.children().filter(|n| scope.in_scope(n)) {
                match item.tag_name().name() {
                    "Compile" => {
                        if let Some(include) = item.attribute("Include") {
                            project.compile_items.push(CompileItem::new(include));
                        }
                    }
                    "Reference" => {
                        project.reference_items.push(ReferenceItem::new(
                            item.attribute("Include").map(String::from),
                            scope.first(item, "HintPath").map(element_value),
                        ));
                    }
                    _ => {}
                }
            }
        }

        for group in root.children().filter(|n| scope.is(n, "PropertyGroup")) {
            match group.attribute("Condition") {
                None => project.read_main_properties(scope, group),
                Some(cond) if cond.contains("Debug") => {
                    project.debug = Some(PropertyGroup::parse(scope, group, cond));
                }
                Some(cond) if cond.contains("Release") => {
                    project.release = Some(PropertyGroup::parse(scope, group, cond));
                }
                Some(_) => {}
            }
        }

        project
    }

    /// Every unconditioned group rewrites all eight fields; the last one in
    /// the document wins.
    fn read_main_properties(&mut self, scope: Scope, group: roxmltree::Node) {
        read_elements!(self, scope, group,
            "AssemblyName" => assembly_name,
            "BaseDirectory" => base_directory,
            "FileAlignment" => file_alignment,
            "OutputType" => output_type,
            "ProductVersion" => product_version,
            "ProjectGuid" => project_guid,
            "SchemaVersion" => schema_version,
            "TargetFrameworkVersion" => target_framework_version,
        );
    }
}

impl PropertyGroup {
    fn parse(scope: Scope, node: roxmltree::Node, cond: &str) -> Self {
        let mut pg = Self {
            condition: Some(cond.to_string()),
            ..Default::default()
        };

        read_elements!(pg, scope, node,
            "DebugSymbols" => debug_symbols,
            "DebugType" => debug_type,
            "Optimize" => optimize,
            "OutputPath" => output_path,
            "DefineConstants" => define_constants,
            "ErrorReport" => error_report,
            "WarningLevel" => warning_level,
            "AllowUnsafeBlocks" => allow_unsafe_blocks,
        );

        for child in node.children().filter(|n| scope.in_scope(n)) {
            let tag = child.tag_name().name();
            if !CONFIGURED_PROPERTIES.contains(&tag) {
                pg.other
                    .entry(tag.to_string())
                    .or_insert_with(|| element_value(child));
            }
        }

        pg
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Concatenated text of all descendants; an empty element yields `""`.
fn element_value(node: roxmltree::Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
