//! Solver discovery from the toolchain's `--solvers` listing.

use crate::config::DiscoveryConfig;
use crate::toolchain::Toolchain;
use tracing::{info, warn};

/// Pull solver identifiers out of a `--solvers` listing.
///
/// For every line holding a parenthesised group, the first comma-separated
/// token inside the first group is the identifier. Only identifiers containing
/// one of `allow_list` (case-insensitive) are kept. Duplicates collapse to the
/// first occurrence.
pub fn parse_solver_listing(listing: &str, allow_list: &[String]) -> Vec<String> {
    let allow: Vec<String> = allow_list.iter().map(|a| a.to_lowercase()).collect();
    let mut found: Vec<String> = Vec::new();

    for line in listing.lines() {
        if !(line.contains('(') && line.contains(')')) {
            continue;
        }
        let Some((_, after)) = line.split_once('(') else {
            continue;
        };
        let group = after.split(['(', ')']).next().unwrap_or("");
        let id = group.split(',').next().unwrap_or("").trim();
        if id.is_empty() {
            continue;
        }

        let lowered = id.to_lowercase();
        if !allow.iter().any(|a| lowered.contains(a.as_str())) {
            continue;
        }
        if !found.iter().any(|f| f == id) {
            found.push(id.to_string());
        }
    }

    found
}

/// Ask the toolchain which solvers it has, falling back to the configured pair.
pub async fn discover_solvers(toolchain: &dyn Toolchain, config: &DiscoveryConfig) -> Vec<String> {
    match toolchain.list_solvers().await {
        Ok(listing) => {
            let found = parse_solver_listing(&listing, &config.allow_list);
            if found.is_empty() {
                warn!(
                    toolchain = toolchain.name(),
                    fallback = ?config.fallback_solvers,
                    "no known solvers in listing, using fallback"
                );
                config.fallback_solvers.clone()
            } else {
                info!(toolchain = toolchain.name(), solvers = ?found, "detected solvers");
                found
            }
        }
        Err(e) => {
            warn!(
                error = %e,
                fallback = ?config.fallback_solvers,
                "solver listing failed, using fallback"
            );
            config.fallback_solvers.clone()
        }
    }
}

/// An explicit list wins. Otherwise discover.
pub async fn resolve_solvers(
    explicit: Option<&[String]>,
    toolchain: &dyn Toolchain,
    config: &DiscoveryConfig,
) -> Vec<String> {
    match explicit {
        Some(list) if !list.is_empty() => list.to_vec(),
        _ => discover_solvers(toolchain, config).await,
    }
}
