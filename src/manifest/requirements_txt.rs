//! requirements.txt parser
//!
//! Handles:
//! - bare names and `name==version` pins
//! - any other PEP 508 specifier, kept verbatim
//! - `#` comments and pip option lines (skipped)

use crate::domain::{ManifestKind, PackageSpec};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use tracing::debug;

/// Parser for requirements.txt files
pub struct RequirementsTxtParser;

impl ManifestParser for RequirementsTxtParser {
    fn parse(&self, content: &str) -> Result<Vec<PackageSpec>, ManifestError> {
        let mut packages = Vec::new();

        for raw in content.lines() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }

            // -r, -e, --index-url and friends configure pip, they are not packages
            if line.starts_with('-') {
                debug!(line, "skipping pip option in requirements file");
                continue;
            }

            if line.contains("://") && !line.contains(" @ ") {
                debug!(line, "skipping bare URL in requirements file");
                continue;
            }

            match PackageSpec::parse(line) {
                Some(spec) => packages.push(spec),
                None => debug!(line, "ignoring unrecognized requirement line"),
            }
        }

        Ok(packages)
    }

    fn kind(&self) -> ManifestKind {
        ManifestKind::Requirements
    }
}

fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find(" #") {
        Some(idx) => &line[..idx],
        None => line,
    }
}
