//! pyproject.toml parser for Python projects
//!
//! Handles:
//! - tool.poetry.dependencies (Poetry)
//! - tool.poetry.group.<name>.dependencies (Poetry 1.2+)
//! - project.dependencies (PEP 621)
//!
//! Poetry constraints are turned into exact pins by stripping their loose
//! marker (`^1.2` becomes `==1.2`).

use crate::domain::{ManifestKind, PackageSpec, VersionReq};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Parser for pyproject.toml files
pub struct PyprojectTomlParser;

#[derive(Debug, Default, Deserialize)]
struct PyProject {
    #[serde(default)]
    project: Option<ProjectTable>,
    #[serde(default)]
    tool: Option<ToolTable>,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectTable {
    #[serde(default)]
    dependencies: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ToolTable {
    #[serde(default)]
    poetry: Option<PoetryTable>,
}

#[derive(Debug, Default, Deserialize)]
struct PoetryTable {
    #[serde(default)]
    dependencies: BTreeMap<String, PoetryDependency>,
    #[serde(default)]
    group: BTreeMap<String, PoetryGroup>,
}

#[derive(Debug, Default, Deserialize)]
struct PoetryGroup {
    #[serde(default)]
    dependencies: BTreeMap<String, PoetryDependency>,
}

/// `name = "^1.0"`, `name = { version = "^1.0", extras = [...] }` or a list of those
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PoetryDependency {
    Version(String),
    Detailed {
        #[serde(default)]
        version: Option<String>,
    },
    Multiple(Vec<PoetryDependency>),
}

impl PoetryDependency {
    fn version(&self) -> Option<&str> {
        match self {
            PoetryDependency::Version(v) => Some(v),
            PoetryDependency::Detailed { version } => version.as_deref(),
            // Per-interpreter alternatives; only a single one names a usable version
            PoetryDependency::Multiple(alternatives) => match alternatives.as_slice() {
                [only] => only.version(),
                _ => None,
            },
        }
    }
}

impl ManifestParser for PyprojectTomlParser {
    fn parse(&self, content: &str) -> Result<Vec<PackageSpec>, ManifestError> {
        let pyproject: PyProject = toml::from_str(content).map_err(|e| {
            ManifestError::toml_parse_error(PathBuf::from("pyproject.toml"), e.to_string())
        })?;

        let mut packages = Vec::new();

        if let Some(poetry) = pyproject.tool.and_then(|t| t.poetry) {
            for (name, dep) in &poetry.dependencies {
                packages.push(pin_from_constraint(name, dep.version()));
            }
            for group in poetry.group.values() {
                for (name, dep) in &group.dependencies {
                    packages.push(pin_from_constraint(name, dep.version()));
                }
            }
        }

        if let Some(project) = pyproject.project {
            for dep in &project.dependencies {
                if let Some(spec) = PackageSpec::parse(dep) {
                    packages.push(exact_or_bare(spec));
                }
            }
        }

        Ok(packages)
    }

    fn kind(&self) -> ManifestKind {
        ManifestKind::Pyproject
    }
}

/// Turn a Poetry constraint into `name==version`, or a bare name when no
/// single version can be read from it.
pub fn pin_from_constraint(name: &str, constraint: Option<&str>) -> PackageSpec {
    let Some(constraint) = constraint.map(str::trim) else {
        return PackageSpec::bare(name);
    };

    if constraint.is_empty() || constraint == "*" {
        return PackageSpec::bare(name);
    }

    // Compound or upper-bounded constraints have no single version to pin
    if constraint.contains([',', '<', '!', '|', ' ']) {
        return PackageSpec::bare(name);
    }

    let version = ["~=", "==", ">=", "^", "~", "="]
        .iter()
        .find_map(|marker| constraint.strip_prefix(marker))
        .unwrap_or(constraint)
        .trim();

    let starts_alphanumeric = version
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric());

    if !starts_alphanumeric || version.contains('*') {
        return PackageSpec::bare(name);
    }

    PackageSpec::pinned(name, version)
}

fn exact_or_bare(spec: PackageSpec) -> PackageSpec {
    match spec.requirement {
        VersionReq::Pinned(_) => spec,
        _ => spec.to_bare(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Vec<PackageSpec> {
        PyprojectTomlParser.parse(content).unwrap()
    }

    #[test]
    fn test_parse_poetry_dependencies() {
        let content = r#"
[tool.poetry]
name = "demo"

[tool.poetry.dependencies]
python = "^3.11"
requests = "^2.31.0"
toml = "0.10.2"
"#;
        let packages = parse(content);
        assert_eq!(
            packages,
            vec![
                PackageSpec::pinned("python", "3.11"),
                PackageSpec::pinned("requests", "2.31.0"),
                PackageSpec::pinned("toml", "0.10.2"),
            ]
        );
    }

    #[test]
    fn test_parse_poetry_inline_table() {
        let content = r#"
[tool.poetry.dependencies]
uvicorn = { version = "^0.23.0", extras = ["standard"] }
mylib = { path = "../mylib" }
"#;
        let packages = parse(content);
        assert_eq!(
            packages,
            vec![
                PackageSpec::bare("mylib"),
                PackageSpec::pinned("uvicorn", "0.23.0"),
            ]
        );
    }

    #[test]
    fn test_parse_poetry_multiple_constraints() {
        let content = r#"
[tool.poetry.dependencies]
foo = [
    { version = "<=1.9", python = ">=3.6,<3.8" },
    { version = "^2.0", python = ">=3.8" },
]
"#;
        assert_eq!(parse(content), vec![PackageSpec::bare("foo")]);
    }

    #[test]
    fn test_parse_poetry_single_alternative() {
        let content = r#"
[tool.poetry.dependencies]
foo = [{ version = "^2.0", python = ">=3.8" }]
"#;
        assert_eq!(parse(content), vec![PackageSpec::pinned("foo", "2.0")]);
    }

    #[test]
    fn test_parse_poetry_groups() {
        let content = r#"
[tool.poetry.dependencies]
rich = "^13.0"

[tool.poetry.group.dev.dependencies]
pytest = "^7.4"
"#;
        let packages = parse(content);
        assert!(packages.contains(&PackageSpec::pinned("rich", "13.0")));
        assert!(packages.contains(&PackageSpec::pinned("pytest", "7.4")));
    }

    #[test]
    fn test_parse_pep621_dependencies() {
        let content = r#"
[project]
name = "demo"
dependencies = ["httpx==0.25.0", "pydantic>=2", "click"]
"#;
        assert_eq!(
            parse(content),
            vec![
                PackageSpec::pinned("httpx", "0.25.0"),
                PackageSpec::bare("pydantic"),
                PackageSpec::bare("click"),
            ]
        );
    }

    #[test]
    fn test_parse_without_dependency_tables() {
        let content = r#"
[build-system]
requires = ["setuptools"]
"#;
        assert!(parse(content).is_empty());
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = PyprojectTomlParser.parse("[tool.poetry\nbroken");
        assert!(matches!(result, Err(ManifestError::TomlParseError { .. })));
    }

    #[test]
    fn test_pin_from_constraint_markers() {
        assert_eq!(
            pin_from_constraint("a", Some("^1.2.3")),
            PackageSpec::pinned("a", "1.2.3")
        );
        assert_eq!(
            pin_from_constraint("a", Some("~1.2")),
            PackageSpec::pinned("a", "1.2")
        );
        assert_eq!(
            pin_from_constraint("a", Some("~=1.2")),
            PackageSpec::pinned("a", "1.2")
        );
        assert_eq!(
            pin_from_constraint("a", Some(">=1.2")),
            PackageSpec::pinned("a", "1.2")
        );
        assert_eq!(
            pin_from_constraint("a", Some("1.2")),
            PackageSpec::pinned("a", "1.2")
        );
    }

    #[test]
    fn test_pin_from_constraint_unpinnable() {
        assert_eq!(pin_from_constraint("a", None), PackageSpec::bare("a"));
        assert_eq!(pin_from_constraint("a", Some("*")), PackageSpec::bare("a"));
        assert_eq!(pin_from_constraint("a", Some("1.*")), PackageSpec::bare("a"));
        assert_eq!(pin_from_constraint("a", Some(">=1,<2")), PackageSpec::bare("a"));
        assert_eq!(pin_from_constraint("a", Some("<2")), PackageSpec::bare("a"));
        assert_eq!(pin_from_constraint("a", Some(">1")), PackageSpec::bare("a"));
    }
}
