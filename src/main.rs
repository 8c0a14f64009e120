//! Headless dashboard session
//!
//! Loads the dataset bundle from disk, starts the dashboard and reads
//! commands from stdin while pumping playback timers.
//!
//! Run with: cargo run --features cli --bin demographics-cli

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use demographics_dashboard::config::DashboardConfig;
    use demographics_dashboard::core::{load_all, DataSource};
    use demographics_dashboard::dashboard::{command::HELP, Dashboard, UiCommand};
    use demographics_dashboard::time::now_seconds;
    use std::path::PathBuf;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tracing::{error, info, warn};
    use tracing_subscriber::{fmt, EnvFilter};

    /// Dataset files under one directory.
    struct DirSource(PathBuf);

    impl DataSource for DirSource {
        async fn fetch(&self, file_name: &'static str) -> Result<String, String> {
            let path = self.0.join(file_name);
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| format!("{}: {e}", path.display()))
        }
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,demographics_dashboard=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let config = DashboardConfig::from_env()?;
    info!(data_dir = %config.data_dir, "Loading datasets");
    let source = DirSource(PathBuf::from(&config.data_dir));
    let datasets = match load_all(&source).await {
        Ok(datasets) => datasets,
        Err(e) => {
            error!(error = %e, "Startup aborted");
            return Err(e.into());
        }
    };

    let frame = std::time::Duration::from_millis(config.rotation_interval_ms.max(1));
    let mut dashboard = Dashboard::start(config, datasets)?;
    info!("Ready, type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(frame);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match UiCommand::parse(&line) {
                    Ok(UiCommand::Quit) => break,
                    Ok(UiCommand::Help) => println!("{HELP}"),
                    Ok(UiCommand::Status) => println!("{}", dashboard.status_line()),
                    Ok(command) => {
                        if let Err(e) = dashboard.apply(command, now_seconds()) {
                            warn!(error = %e, "Command failed");
                        }
                    }
                    Err(e) => warn!(error = %e, "Bad command"),
                }
            }
            _ = ticker.tick() => {
                dashboard.tick(now_seconds());
            }
        }
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
