//! Integration tests for nowpy
//!
//! These tests verify:
//! - Manifest discovery and precedence across directory levels
//! - Import scanning combined with reconciliation
//! - Environment store pruning

use nowpy::domain::{InstalledSet, ManifestKind, PackageSpec};
use nowpy::environment::{
    parse_freeze_output, EnvironmentId, EnvironmentMetadata, EnvironmentStore,
};
use nowpy::manifest::{find_declared, ManifestLocator};
use nowpy::reconcile::reconcile;
use nowpy::scanner::{scan_file, third_party, to_distributions};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture: a temp dir acting as home with a project below it
fn create_test_dir() -> (TempDir, PathBuf, ManifestLocator) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let project = temp_dir.path().join("project");
    fs::create_dir(&project).unwrap();
    let locator = ManifestLocator::new(Some(temp_dir.path().to_path_buf()));
    (temp_dir, project, locator)
}

mod manifest_discovery {
    use super::*;

    #[test]
    fn test_nearest_requirements_used() {
        let (_dir, project, locator) = create_test_dir();
        let nested = project.join("src").join("tools");
        fs::create_dir_all(&nested).unwrap();
        fs::write(project.join("requirements.txt"), "flask==3.0.0\n").unwrap();
        fs::write(nested.join("requirements.txt"), "click\n").unwrap();
        let script = nested.join("run.py");
        fs::write(&script, "").unwrap();

        let manifest = find_declared(&locator, &script).unwrap();
        assert_eq!(manifest.path, nested.join("requirements.txt"));
        assert_eq!(manifest.packages, vec![PackageSpec::bare("click")]);
    }

    #[test]
    fn test_requirements_anywhere_beats_pyproject() {
        let (_dir, project, locator) = create_test_dir();
        let nested = project.join("app");
        fs::create_dir(&nested).unwrap();
        fs::write(
            nested.join("pyproject.toml"),
            "[tool.poetry.dependencies]\nrich = \"13.0\"\n",
        )
        .unwrap();
        fs::write(project.join("requirements.txt"), "flask\n").unwrap();
        let script = nested.join("main.py");
        fs::write(&script, "").unwrap();

        let manifest = find_declared(&locator, &script).unwrap();
        assert_eq!(manifest.kind, ManifestKind::Requirements);
    }

    #[test]
    fn test_search_stops_at_home() {
        let (dir, project, locator) = create_test_dir();
        fs::write(dir.path().join("requirements.txt"), "flask\n").unwrap();
        let script = project.join("main.py");
        fs::write(&script, "").unwrap();

        assert!(find_declared(&locator, &script).is_none());
    }

    #[test]
    fn test_parent_components_in_script_path() {
        let (dir, project, locator) = create_test_dir();
        let other = dir.path().join("other");
        fs::create_dir(&other).unwrap();
        fs::write(project.join("requirements.txt"), "wrongpkg==1.0\n").unwrap();
        fs::write(dir.path().join("requirements.txt"), "homepkg\n").unwrap();
        let script = project.join("..").join("other").join("x.py");
        fs::write(&script, "").unwrap();

        assert!(find_declared(&locator, &script).is_none());

        fs::write(other.join("requirements.txt"), "click\n").unwrap();
        let manifest = find_declared(&locator, &script).unwrap();
        assert_eq!(manifest.path, other.join("requirements.txt"));
    }

    #[test]
    fn test_pep621_and_poetry_groups() {
        let (_dir, project, locator) = create_test_dir();
        let pyproject = r#"[project]
name = "demo"
dependencies = ["httpx==0.27.0", "anyio>=4"]

[tool.poetry.dependencies]
python = "^3.11"
requests = "^2.31"

[tool.poetry.group.dev.dependencies]
pytest = "8.0.0"
"#;
        fs::write(project.join("pyproject.toml"), pyproject).unwrap();
        let script = project.join("main.py");
        fs::write(&script, "").unwrap();

        let manifest = find_declared(&locator, &script).unwrap();
        let specs: Vec<String> = manifest.packages.iter().map(ToString::to_string).collect();
        assert!(specs.contains(&"requests==2.31".to_string()));
        assert!(specs.contains(&"pytest==8.0.0".to_string()));
        assert!(specs.contains(&"httpx==0.27.0".to_string()));
        assert!(specs.contains(&"anyio".to_string()));
    }
}

mod scan_and_reconcile {
    use super::*;

    fn missing_for(script: &Path, declared: &[PackageSpec], freeze: &str) -> Vec<String> {
        let imports = to_distributions(&third_party(&scan_file(script).unwrap(), script));
        reconcile(declared, &imports, &parse_freeze_output(freeze)).to_strings()
    }

    #[test]
    fn test_nested_and_conditional_imports() {
        let (_dir, project, _locator) = create_test_dir();
        let source = r#"
import json

def main():
    import requests
    try:
        import ujson as fastjson
    except ImportError:
        fastjson = json

class Tool:
    def run(self):
        from bs4 import BeautifulSoup

if __name__ == "__main__":
    from . import sibling
    main()
"#;
        let script = project.join("main.py");
        fs::write(&script, source).unwrap();

        assert_eq!(
            missing_for(&script, &[], ""),
            vec!["beautifulsoup4", "requests", "ujson"]
        );
    }

    #[test]
    fn test_local_modules_not_installed() {
        let (_dir, project, _locator) = create_test_dir();
        fs::write(project.join("helpers.py"), "").unwrap();
        fs::create_dir(project.join("mypkg")).unwrap();
        fs::write(project.join("mypkg").join("__init__.py"), "").unwrap();
        let script = project.join("main.py");
        fs::write(&script, "import helpers\nimport mypkg.sub\nimport numpy\n").unwrap();

        assert_eq!(missing_for(&script, &[], ""), vec!["numpy"]);
    }

    #[test]
    fn test_installed_environment_satisfies_everything() {
        let (_dir, project, _locator) = create_test_dir();
        let script = project.join("main.py");
        fs::write(&script, "import numpy\nimport yaml\n").unwrap();

        let declared = vec![PackageSpec::pinned("numpy", "1.26.0")];
        let freeze = "numpy==1.26.0\nPyYAML==6.0.1\n\n";
        assert!(missing_for(&script, &declared, freeze).is_empty());
    }

    #[test]
    fn test_reconcile_never_contains_installed_names() {
        let declared = vec![
            PackageSpec::pinned("a", "1"),
            PackageSpec::bare("b"),
            PackageSpec::pinned("c", "3"),
        ];
        let installed = InstalledSet::new(vec![
            PackageSpec::pinned("A", "0.1"),
            PackageSpec::pinned("c", "2"),
        ]);
        let missing = reconcile(&declared, &Default::default(), &installed);
        assert_eq!(missing.to_strings(), vec!["b"]);
    }
}

mod environment_store {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_prune_keeps_most_recent_and_current() {
        let dir = tempfile::tempdir().unwrap();
        let store = EnvironmentStore::new(dir.path());
        let now = Utc::now();

        let mut ids = Vec::new();
        for (i, project) in ["/p/one", "/p/two", "/p/three", "/p/four"].iter().enumerate() {
            let id = EnvironmentId::for_project(Path::new(project));
            let path = store.path(&id);
            fs::create_dir_all(&path).unwrap();
            EnvironmentMetadata::new(*project)
                .used_at(now - Duration::hours(10 - i as i64))
                .save(&path)
                .unwrap();
            ids.push(id);
        }

        // The oldest environment is the current one and must survive
        let report = store.prune(2, &ids[0]);
        assert_eq!(report.removed, vec![ids[1].clone(), ids[2].clone()]);
        assert!(report.failed.is_empty());
        assert!(store.exists(&ids[0]));
        assert!(store.exists(&ids[3]));
    }
}
