//! Dependency reconciliation
//!
//! Combines declared packages (D), scanned imports (I) and installed packages (E)
//! into the install list:
//!
//! ```text
//! missing_imports  = { m in I : bare(m) not in bare(D) and bare(m) not in bare(E) }
//! missing_declared = { d in D : bare(d) not in bare(E) }
//! missing          = dedup_by_bare_name(missing_declared ∪ missing_imports) - runtime
//! ```
//!
//! A versioned spec always wins over a bare one with the same name. This is a
//! pure function: no filesystem or process access.

use crate::domain::{ImportSet, InstalledSet, MissingSet, PackageSpec};
use std::collections::{BTreeMap, HashSet};

/// Pseudo-requirement naming the interpreter itself (Poetry's `python = "^3.11"`)
pub const RUNTIME_PACKAGE: &str = "python";

/// Compute the packages that must be installed before running the script
pub fn reconcile(
    declared: &[PackageSpec],
    imports: &ImportSet,
    installed: &InstalledSet,
) -> MissingSet {
    let declared_names: HashSet<String> = declared.iter().map(PackageSpec::key).collect();
    let installed_names = installed.bare_names();

    let missing_declared = declared
        .iter()
        .filter(|spec| !installed_names.contains(&spec.key()))
        .cloned();

    let missing_imports = imports.iter().map(PackageSpec::bare).filter(|spec| {
        let key = spec.key();
        !declared_names.contains(&key) && !installed_names.contains(&key)
    });

    let mut merged: BTreeMap<String, PackageSpec> = BTreeMap::new();
    for spec in missing_declared.chain(missing_imports) {
        merge_preferring_versioned(&mut merged, spec);
    }
    merged.remove(RUNTIME_PACKAGE);

    MissingSet::from_sorted(merged.into_values().collect())
}

/// Insert `spec` unless an entry with the same bare name already carries a
/// version; a versioned spec replaces a bare one. Among two versioned specs
/// the first one seen is kept.
fn merge_preferring_versioned(merged: &mut BTreeMap<String, PackageSpec>, spec: PackageSpec) {
    let key = spec.key();
    match merged.get(&key) {
        Some(existing) if existing.is_versioned() || !spec.is_versioned() => {}
        _ => {
            merged.insert(key, spec);
        }
    }
}
