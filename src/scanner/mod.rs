//! Import scanning for Python scripts
//!
//! The script is parsed into a full AST; a syntax error aborts the scan.
//! Every statement body is walked (functions, classes, conditionals, loops,
//! `with`, `try`, `match`) and the first dotted segment of each absolute
//! import is collected.

mod aliases;
mod stdlib;

pub use aliases::{distribution_name, to_distributions};
pub use stdlib::is_stdlib_module;

use crate::domain::ImportSet;
use crate::error::ScanError;
use rustpython_parser::{ast, Parse};
use std::path::Path;
use tracing::debug;

/// Parse a script file and collect its top-level imported module names
pub fn scan_file(path: &Path) -> Result<ImportSet, ScanError> {
    let source = std::fs::read_to_string(path).map_err(|e| ScanError::read_error(path, e))?;
    scan_source(&source, path)
}

/// Parse source text and collect its top-level imported module names
pub fn scan_source(source: &str, path: &Path) -> Result<ImportSet, ScanError> {
    let suite = ast::Suite::parse(source, &path.to_string_lossy())
        .map_err(|e| ScanError::syntax_error(path, e.to_string()))?;

    let mut imports = ImportSet::new();
    collect_imports(&suite, &mut imports);
    debug!(path = %path.display(), count = imports.len(), "scanned imports");
    Ok(imports)
}

/// Drop standard-library modules and modules that live next to the script
pub fn third_party(imports: &ImportSet, script: &Path) -> ImportSet {
    let script_dir = script.parent().unwrap_or_else(|| Path::new("."));

    imports
        .iter()
        .filter(|module| {
            if is_stdlib_module(module) {
                return false;
            }
            if is_local_module(script_dir, module) {
                debug!(module, "import resolves to a local module");
                return false;
            }
            true
        })
        .collect()
}

/// True if `module` is a sibling `module.py` or a package directory beside the script
pub fn is_local_module(script_dir: &Path, module: &str) -> bool {
    script_dir.join(format!("{module}.py")).is_file()
        || script_dir.join(module).join("__init__.py").is_file()
}

fn top_level(module: &str) -> &str {
    module.split('.').next().unwrap_or(module)
}

fn collect_imports(body: &[ast::Stmt], imports: &mut ImportSet) {
    for stmt in body {
        match stmt {
            ast::Stmt::Import(import) => {
                for alias in &import.names {
                    imports.insert(top_level(alias.name.as_str()));
                }
            }
            ast::Stmt::ImportFrom(import) => {
                // `from . import x` and `from .mod import x` refer to the script's own package
                let relative = import.level.as_ref().is_some_and(|l| l.to_u32() > 0);
                if relative {
                    continue;
                }
                if let Some(module) = &import.module {
                    imports.insert(top_level(module.as_str()));
                }
            }
            ast::Stmt::FunctionDef(def) => collect_imports(&def.body, imports),
            ast::Stmt::AsyncFunctionDef(def) => collect_imports(&def.body, imports),
            ast::Stmt::ClassDef(def) => collect_imports(&def.body, imports),
            ast::Stmt::If(stmt) => {
                collect_imports(&stmt.body, imports);
                collect_imports(&stmt.orelse, imports);
            }
            ast::Stmt::For(stmt) => {
                collect_imports(&stmt.body, imports);
                collect_imports(&stmt.orelse, imports);
            }
            ast::Stmt::AsyncFor(stmt) => {
                collect_imports(&stmt.body, imports);
                collect_imports(&stmt.orelse, imports);
            }
            ast::Stmt::While(stmt) => {
                collect_imports(&stmt.body, imports);
                collect_imports(&stmt.orelse, imports);
            }
            ast::Stmt::With(stmt) => collect_imports(&stmt.body, imports),
            ast::Stmt::AsyncWith(stmt) => collect_imports(&stmt.body, imports),
            ast::Stmt::Match(stmt) => {
                for case in &stmt.cases {
                    collect_imports(&case.body, imports);
                }
            }
            ast::Stmt::Try(stmt) => {
                collect_imports(&stmt.body, imports);
                collect_handlers(&stmt.handlers, imports);
                collect_imports(&stmt.orelse, imports);
                collect_imports(&stmt.finalbody, imports);
            }
            ast::Stmt::TryStar(stmt) => {
                collect_imports(&stmt.body, imports);
                collect_handlers(&stmt.handlers, imports);
                collect_imports(&stmt.orelse, imports);
                collect_imports(&stmt.finalbody, imports);
            }
            _ => {}
        }
    }
}

fn collect_handlers(handlers: &[ast::ExceptHandler], imports: &mut ImportSet) {
    for handler in handlers {
        match handler {
            ast::ExceptHandler::ExceptHandler(h) => collect_imports(&h.body, imports),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scan(source: &str) -> Vec<String> {
        scan_source(source, Path::new("test.py"))
            .unwrap()
            .iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_plain_imports() {
        assert_eq!(scan("import requests\nimport os\n"), vec!["os", "requests"]);
    }

    #[test]
    fn test_dotted_and_aliased_imports() {
        let source = "import os.path\nimport numpy as np\nimport xml.etree.ElementTree as ET\n";
        assert_eq!(scan(source), vec!["numpy", "os", "xml"]);
    }

    #[test]
    fn test_multiple_names_in_one_import() {
        assert_eq!(scan("import json, yaml, toml\n"), vec!["json", "toml", "yaml"]);
    }

    #[test]
    fn test_from_imports() {
        let source = "from flask import Flask\nfrom google.cloud import storage\n";
        assert_eq!(scan(source), vec!["flask", "google"]);
    }

    #[test]
    fn test_relative_imports_ignored() {
        let source = "from . import helpers\nfrom .models import User\nfrom ..core import x\n";
        assert!(scan(source).is_empty());
    }

    #[test]
    fn test_nested_imports() {
        let source = r#"
def load():
    import pandas
    return pandas

class Model:
    import torch

if True:
    import rich
else:
    import colorama

try:
    import ujson as json
except ImportError:
    import simplejson as json
finally:
    import atexit

for _ in range(1):
    import tqdm

with open("x") as f:
    import attr

async def main():
    import aiohttp
"#;
        assert_eq!(
            scan(source),
            vec![
                "aiohttp", "atexit", "attr", "colorama", "pandas", "rich", "simplejson", "torch",
                "tqdm", "ujson"
            ]
        );
    }

    #[test]
    fn test_duplicates_collapse() {
        assert_eq!(
            scan("import requests\nimport requests.adapters\nfrom requests import get\n"),
            vec!["requests"]
        );
    }

    #[test]
    fn test_no_imports() {
        assert!(scan("print('hello')\n").is_empty());
    }

    #[test]
    fn test_syntax_error() {
        let result = scan_source("import (\n", Path::new("broken.py"));
        match result {
            Err(ScanError::SyntaxError { path, .. }) => assert_eq!(path, Path::new("broken.py")),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_file_missing() {
        let result = scan_file(Path::new("/definitely/not/here.py"));
        assert!(matches!(result, Err(ScanError::ReadError { .. })));
    }

    #[test]
    fn test_third_party_filters_stdlib() {
        let imports: ImportSet = ["os", "sys", "requests", "json"].into_iter().collect();
        let filtered = third_party(&imports, Path::new("/nonexistent/script.py"));
        assert_eq!(filtered.iter().collect::<Vec<_>>(), vec!["requests"]);
    }

    #[test]
    fn test_third_party_filters_local_modules() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("helpers.py"), "").unwrap();
        fs::create_dir(dir.path().join("mypkg")).unwrap();
        fs::write(dir.path().join("mypkg").join("__init__.py"), "").unwrap();
        let script = dir.path().join("main.py");

        let imports: ImportSet = ["helpers", "mypkg", "requests"].into_iter().collect();
        let filtered = third_party(&imports, &script);
        assert_eq!(filtered.iter().collect::<Vec<_>>(), vec!["requests"]);
    }
}
