use std::path::Path;

use anyhow::{Context, Result};
use noticeboard_core::storage::KeyValueStore;
use noticeboard_core::EventStore;
use owo_colors::OwoColorize;

pub fn run<S: KeyValueStore>(store: &EventStore<S>, output: &Path) -> Result<()> {
    let export = store.export();

    if output == Path::new("-") {
        println!("{}", export.to_json()?);
        return Ok(());
    }

    export
        .write_to(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{}",
        format!(
            "  Exported {} default and {} of your events to {}",
            export.base.len(),
            export.user.len(),
            output.display()
        )
        .green()
    );

    Ok(())
}
