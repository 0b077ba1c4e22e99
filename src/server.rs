//! Development server: every saved change to the run configuration triggers a
//! fresh recompute pass and a browser reload.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use axum::Router;
use notify::{Event, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_livereload::LiveReloadLayer;
use tracing::{error, info};

use crate::config::{Overrides, RunConfig};
use crate::io::FormatRegistry;
use crate::report::Report;

/// Run one recompute pass from the config file and write the page
pub fn regenerate(
    config: &Path,
    overrides: &Overrides,
    output: &Path,
) -> anyhow::Result<Report> {
    let mut run_config = RunConfig::from_path(config)?;
    run_config.apply(overrides);
    let run = run_config.resolve()?;
    let report = Report::build(&run)?;

    let registry = FormatRegistry::with_defaults();
    let writer = registry
        .writer_for_format("html")
        .ok_or_else(|| anyhow::anyhow!("HTML writer not found"))?;
    writer.write(&report, output)?;
    Ok(report)
}

/// Run [`regenerate`] on the blocking pool so GIF encoding never stalls the
/// async workers
pub async fn regenerate_blocking(
    config: PathBuf,
    overrides: Overrides,
    output: PathBuf,
) -> anyhow::Result<Report> {
    tokio::task::spawn_blocking(move || regenerate(&config, &overrides, &output)).await?
}

/// Whether a watcher event is a write to the config file itself. Writes to
/// generated files sharing the directory must not trigger another pass.
fn is_config_change(event: &Event, config_name: &OsStr) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(config_name))
}

/// Start the development server with hot reload
pub async fn serve(
    config: &Path,
    overrides: &Overrides,
    output: &Path,
    port: u16,
) -> anyhow::Result<()> {
    // Generate initial page
    regenerate_blocking(config.to_path_buf(), overrides.clone(), output.to_path_buf()).await?;
    println!("Generated initial page in {}", output.display());

    // Create channel for file change notifications
    let (tx, mut rx) = mpsc::channel::<()>(1);

    let config_name = config
        .file_name()
        .map(OsStr::to_os_string)
        .ok_or_else(|| anyhow::anyhow!("config path has no file name: {}", config.display()))?;
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            if is_config_change(&event, &config_name) {
                // Notify the regeneration task
                let _ = tx.blocking_send(());
            }
        }
    })?;

    // Watch the config file's parent directory (editors often replace the file)
    let watch_path = config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    watcher.watch(&watch_path, RecursiveMode::NonRecursive)?;

    // Spawn regeneration task
    let config_for_regen = config.to_path_buf();
    let output_for_regen = output.to_path_buf();
    let overrides_for_regen = overrides.clone();
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            // Debounce: wait a bit for rapid changes to settle
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

            // Drain any additional notifications
            while rx.try_recv().is_ok() {}

            let pass = regenerate_blocking(
                config_for_regen.clone(),
                overrides_for_regen.clone(),
                output_for_regen.clone(),
            );
            match pass.await {
                Ok(report) => info!(
                    acceleration = report.result.acceleration,
                    warnings = report.warnings.len(),
                    "regenerated page"
                ),
                Err(e) => error!("error regenerating: {e:#}"),
            }
        }
    });

    // Create live reload layer
    let livereload = LiveReloadLayer::new();
    let reloader = livereload.reloader();

    // Reload the browser whenever the page or its artifacts change
    let mut output_watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
        if let Ok(event) = res {
            if event.kind.is_modify() || event.kind.is_create() {
                reloader.reload();
            }
        }
    })?;
    output_watcher.watch(output, RecursiveMode::Recursive)?;

    // Build the router
    let app = Router::new()
        .fallback_service(ServeDir::new(output))
        .layer(livereload);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("Development server running at http://localhost:{port}");
    println!("Watching {} for changes...", config.display());
    println!("Press Ctrl+C to stop");

    // Keep watchers alive
    let _watcher = watcher;
    let _output_watcher = output_watcher;

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn regenerate_writes_page_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("run.yaml");
        fs::write(&config, "problem: sled\nmode: word_problem\n").unwrap();
        let output = dir.path().join("site");

        let overrides = Overrides {
            no_animation: true,
            ..Default::default()
        };
        let report = regenerate(&config, &overrides, &output).unwrap();

        assert_eq!(report.result.acceleration, 5.0);
        assert!(output.join("index.html").exists());
        assert!(output.join("position.svg").exists());
    }

    #[tokio::test]
    async fn regenerate_blocking_runs_pass_off_the_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("run.yaml");
        fs::write(&config, "mass: 2.0\nforce: 6.0\n").unwrap();
        let output = dir.path().join("site");

        let overrides = Overrides {
            no_animation: true,
            ..Default::default()
        };
        let report = regenerate_blocking(config, overrides, output.clone())
            .await
            .unwrap();

        assert_eq!(report.result.acceleration, 3.0);
        assert!(output.join("index.html").exists());
    }

    #[test]
    fn only_config_writes_trigger_regeneration() {
        use notify::EventKind;
        use notify::event::{CreateKind, ModifyKind, RemoveKind};

        let config_name = OsStr::new("run.yaml");
        let dir = PathBuf::from("/work");
        let modify = || EventKind::Modify(ModifyKind::Any);

        let config_write = Event::new(modify()).add_path(dir.join("run.yaml"));
        assert!(is_config_change(&config_write, config_name));

        let config_replace = Event::new(EventKind::Create(CreateKind::File))
            .add_path(dir.join("run.yaml"));
        assert!(is_config_change(&config_replace, config_name));

        for generated in ["index.html", "velocity.svg", "animation.gif"] {
            let event = Event::new(modify()).add_path(dir.join(generated));
            assert!(!is_config_change(&event, config_name), "{generated}");
        }

        let removed = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(dir.join("run.yaml"));
        assert!(!is_config_change(&removed, config_name));
    }

    #[test]
    fn regenerate_fails_on_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("run.yaml");
        fs::write(&config, "mass: 0.0\n").unwrap();

        let output = dir.path().join("site");
        let err = regenerate(&config, &Overrides::default(), &output).unwrap_err();
        assert!(err.to_string().contains("mass must be at least 0.1"));
    }
}
