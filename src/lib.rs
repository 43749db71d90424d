pub mod csproj;
pub mod diagnostics;
pub mod solution;

pub use csproj::{
    CompileItem, Configuration, CsprojError, Project, ProjectParser, PropertyGroup, ReferenceItem,
    parse_project,
};
pub use diagnostics::{DiagnosticSink, Diagnostics, LogSink};
pub use solution::{Solution, SolutionResolver, resolve_solution};
