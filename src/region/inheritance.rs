//! Resolution of environment properties along the region inheritance chain.
//!
//! Lookup order for an unset property: the region's own metadata, each
//! ancestor via `parent_region_id`, the base region, then the map defaults.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Region;

/// Environment defaults carried by the map itself.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapEnvironment {
    #[serde(default)]
    pub environment_id: Option<String>,
    #[serde(default)]
    pub biome: Option<String>,
    #[serde(default)]
    pub climate: Option<String>,
    #[serde(default)]
    pub danger_level: Option<u8>,
    #[serde(default)]
    pub creatures: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "regionId")]
pub enum PropertySource {
    /// The region itself or one of its ancestors.
    Region(String),
    Base,
    Map,
    Unset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved<T> {
    pub value: Option<T>,
    pub source: PropertySource,
}

impl<T> Resolved<T> {
    pub fn is_inherited_from(&self, region_id: &str) -> bool {
        !matches!(&self.source, PropertySource::Region(id) if id == region_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEnvironment {
    pub environment_id: Resolved<String>,
    pub biome: Resolved<String>,
    pub climate: Resolved<String>,
    pub danger_level: Resolved<u8>,
    pub creatures: Resolved<Vec<String>>,
}

/// Region, then ancestors, then the base region. Stops at unknown parents
/// and never revisits a region, so malformed parent links cannot loop.
pub fn inheritance_chain<'a>(region_id: &str, regions: &'a [Region]) -> Vec<&'a Region> {
    let find = |id: &str| regions.iter().find(|region| region.id == id);
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = find(region_id);

    while let Some(region) = cursor {
        if !seen.insert(region.id.as_str()) {
            tracing::warn!(region_id = %region.id, "region parent chain loops; truncating");
            break;
        }
        chain.push(region);
        cursor = region.parent_region_id.as_deref().and_then(find);
    }

    if let Some(base) = regions.iter().find(|region| region.is_base()) {
        if !seen.contains(base.id.as_str()) {
            chain.push(base);
        }
    }
    chain
}

pub fn resolve_environment(
    region_id: &str,
    regions: &[Region],
    map: &MapEnvironment,
) -> Option<ResolvedEnvironment> {
    let chain = inheritance_chain(region_id, regions);
    if chain.is_empty() || chain[0].id != region_id {
        return None;
    }

    Some(ResolvedEnvironment {
        environment_id: resolve(&chain, |r| r.environment_id.clone(), map.environment_id.clone()),
        biome: resolve(&chain, |r| r.metadata.biome.clone(), map.biome.clone()),
        climate: resolve(&chain, |r| r.metadata.climate.clone(), map.climate.clone()),
        danger_level: resolve(&chain, |r| r.metadata.danger_level, map.danger_level),
        creatures: resolve(&chain, |r| r.metadata.creatures.clone(), map.creatures.clone()),
    })
}

fn resolve<T>(
    chain: &[&Region],
    project: impl Fn(&Region) -> Option<T>,
    map_default: Option<T>,
) -> Resolved<T> {
    for region in chain {
        if let Some(value) = project(region) {
            let source = if region.is_base() {
                PropertySource::Base
            } else {
                PropertySource::Region(region.id.clone())
            };
            return Resolved {
                value: Some(value),
                source,
            };
        }
    }

    match map_default {
        Some(value) => Resolved {
            value: Some(value),
            source: PropertySource::Map,
        },
        None => Resolved {
            value: None,
            source: PropertySource::Unset,
        },
    }
}
