use crate::atlas::pair::AtlasPair;
use crate::foundation::error::{SpritebakeError, SpritebakeResult};
use anyhow::Context as _;
use std::path::{Path, PathBuf};

/// Suffix appended to the diffuse file stem to name the normal map.
pub const NORMAL_MAP_SUFFIX: &str = "NormalMap";

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> SpritebakeResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Sibling path of the normal map for `diffuse_path`: `<dir>/<stem>NormalMap.png`.
pub fn normal_map_path(diffuse_path: &Path) -> SpritebakeResult<PathBuf> {
    let stem = diffuse_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            SpritebakeError::validation(format!(
                "'{}' has no usable file name",
                diffuse_path.display()
            ))
        })?;
    Ok(diffuse_path.with_file_name(format!("{stem}{NORMAL_MAP_SUFFIX}.png")))
}

/// Write both atlases as lossless PNGs and return `(diffuse_path, normal_path)`.
///
/// The diffuse file is always written with a `.png` extension.
pub fn save_png_pair(
    pair: &AtlasPair,
    diffuse_path: impl AsRef<Path>,
) -> SpritebakeResult<(PathBuf, PathBuf)> {
    if pair.diffuse.size() != pair.normal.size() {
        return Err(SpritebakeError::validation(
            "diffuse and normal atlases must have identical dimensions",
        ));
    }

    let diffuse_path = diffuse_path.as_ref().with_extension("png");
    let normal_path = normal_map_path(&diffuse_path)?;
    ensure_parent_dir(&diffuse_path)?;

    for (img, path) in [
        (pair.diffuse.image(), &diffuse_path),
        (pair.normal.image(), &normal_path),
    ] {
        img.save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
    }
    tracing::info!(
        diffuse = %diffuse_path.display(),
        normal = %normal_path.display(),
        "atlas pair saved"
    );
    Ok((diffuse_path, normal_path))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png_pair.rs"]
mod tests;
