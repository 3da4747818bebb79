//! Watermark command implementation.

use super::Destination;
use pressmigrate_engine::WatermarkStore;
use std::error::Error;

/// Prints every stored watermark.
pub fn show(dest: &Destination) -> Result<(), Box<dyn Error>> {
    let marks = dest.watermarks().all()?;
    if marks.is_empty() {
        println!("No watermarks in {}", dest.watermarks_path().display());
    }
    for (post_type, cursor) in marks {
        println!("{post_type:<24} {cursor}");
    }
    Ok(())
}

/// Drops the watermark of `post_type`. Refused while an import holds the
/// run lock.
pub fn reset(dest: &Destination, post_type: &str) -> Result<(), Box<dyn Error>> {
    let marks = dest.watermarks();
    let _lock = marks.lock_run()?;
    marks.reset(post_type)?;
    println!("Watermark for '{post_type}' reset");
    Ok(())
}
