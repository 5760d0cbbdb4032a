// src/pipeline/sourcemap.rs

//! Source map bookkeeping around a pipeline's transform chain.
//!
//! [`init`] runs before the first transform and [`write`] after the last, so
//! the maps describe the output of the whole chain. Transforms never have to
//! know about maps; provenance flows through [`Asset::sources`].
//!
//! The emitted maps are provenance-only: `file` and `sources` are filled in,
//! `mappings` and `names` stay empty. Tools that can report positions see
//! which inputs an output came from, not where each line came from.

use std::path::PathBuf;

use serde::Serialize;

use crate::errors::Result;
use crate::pipeline::asset::Asset;

/// Version 3 source map, serialized as JSON next to the output file.
/// Carries no segment mappings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceMap {
    pub version: u8,
    pub file: String,
    pub sources: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    fn for_asset(asset: &Asset) -> Self {
        Self {
            version: 3,
            file: file_name(&asset.path_str()),
            sources: asset
                .sources
                .iter()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .collect(),
            names: Vec::new(),
            mappings: String::new(),
        }
    }
}

/// Attach an empty map to every asset.
pub fn init(assets: &mut [Asset]) {
    for asset in assets.iter_mut() {
        asset.source_map = Some(SourceMap::for_asset(asset));
    }
}

/// Emit a `<file>.map` asset for every mapped asset and link it from the
/// output with a `sourceMappingURL` comment (CSS and JS only).
pub fn write(assets: Vec<Asset>) -> Result<Vec<Asset>> {
    let mut out = Vec::with_capacity(assets.len() * 2);

    for mut asset in assets {
        if asset.source_map.take().is_none() {
            out.push(asset);
            continue;
        }

        // Refresh against the final path and provenance.
        let map = SourceMap::for_asset(&asset);
        let map_name = format!("{}.map", map.file);
        let map_path = PathBuf::from(format!("{}.map", asset.path_str()));

        if let Some(comment) = mapping_comment(&asset.path_str(), &map_name) {
            if !asset.contents.ends_with(b"\n") && !asset.contents.is_empty() {
                asset.contents.push(b'\n');
            }
            asset.contents.extend_from_slice(comment.as_bytes());
        }

        let json = serde_json::to_vec(&map)?;
        let mut map_asset = Asset::new(map_path, json);
        map_asset.sources = asset.sources.clone();

        out.push(asset);
        out.push(map_asset);
    }

    Ok(out)
}

fn mapping_comment(path: &str, map_name: &str) -> Option<String> {
    if path.ends_with(".css") {
        Some(format!("/*# sourceMappingURL={map_name} */\n"))
    } else if path.ends_with(".js") {
        Some(format!("//# sourceMappingURL={map_name}\n"))
    } else {
        None
    }
}

fn file_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}
