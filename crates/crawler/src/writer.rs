use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::{Recipe, Result};

/// Compact JSON for a batch of recipes. Non-ASCII text is written as UTF-8,
/// not as `\u` escapes.
pub fn to_json_string(recipes: &[Recipe]) -> Result<String> {
    Ok(serde_json::to_string(recipes)?)
}

/// Write the batch as one compact JSON array, replacing any existing file.
pub fn write_recipes(path: impl AsRef<Path>, recipes: &[Recipe]) -> Result<()> {
    let path = path.as_ref();
    info!("Writing {} recipes to {}", recipes.len(), path.display());

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, recipes)?;
    writer.flush()?;

    Ok(())
}
