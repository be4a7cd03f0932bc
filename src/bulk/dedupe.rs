//! Name deduplication for apps that are about to become file names
//!
//! App names are not unique on the server. The first app with a given name
//! keeps it; every later one gets a marked name carrying a prefix of its id.

use crate::api::models::App;
use std::collections::HashSet;
use std::fmt;

/// Prefix of every synthesized name
pub const DUPLICATE_MARKER: &str = "【same】";

/// A rename applied to a colliding app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRecord {
    pub original_name: String,
    pub final_name: String,
}

impl fmt::Display for RenameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.original_name, self.final_name)
    }
}

/// First `-`-separated segment of an id (the leading 8 hex digits of a UUID)
pub fn id_prefix(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

pub fn duplicate_name(name: &str, id: &str) -> String {
    format!("{}{}-{}", DUPLICATE_MARKER, name, id_prefix(id))
}

/// Rename apps whose name was already taken by an earlier app.
///
/// Only original names enter the seen set; a synthesized name is never checked
/// against later apps. Output order matches input order and ids are untouched.
pub fn dedupe(apps: &[App]) -> (Vec<App>, Vec<RenameRecord>) {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut renamed = Vec::with_capacity(apps.len());
    let mut collisions = Vec::new();

    for app in apps {
        if seen.contains(app.name.as_str()) {
            let final_name = duplicate_name(&app.name, &app.id);
            collisions.push(RenameRecord {
                original_name: app.name.clone(),
                final_name: final_name.clone(),
            });
            renamed.push(App {
                name: final_name,
                ..app.clone()
            });
        } else {
            seen.insert(app.name.as_str());
            renamed.push(app.clone());
        }
    }

    (renamed, collisions)
}
