//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::generator::Generator;
use crate::Site;

/// Generate the static site
pub fn run(site: &Site) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(site, site.repository())?;
    let stats = generator.generate()?;

    tracing::info!(
        "Generated {} pages for {} posts ({} assets) in {:.2}s",
        stats.pages,
        stats.posts,
        stats.assets,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Watch for file changes and regenerate
pub fn watch(site: &Site) -> Result<()> {
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for path in site.watch_paths() {
        debouncer
            .watcher()
            .watch(&path, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    for result in rx {
        match result {
            Ok(events) if events.is_empty() => {}
            Ok(_) => {
                tracing::info!("File changed, regenerating...");
                // Config edits are picked up by reloading the site
                match Site::new(&site.base_dir).and_then(|site| run(&site)) {
                    Ok(()) => {}
                    Err(e) => tracing::error!("Generation failed: {}", e),
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}
