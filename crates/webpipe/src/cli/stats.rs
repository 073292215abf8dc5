//! The `webpipe stats` command: lifetime conversion statistics.

use clap::Args;
use webpipe_core::{AppState, Config, StateStore};

use super::format_bytes;

/// Arguments for the `stats` command.
#[derive(Args, Debug, Default)]
pub struct StatsArgs {
    /// Print the persisted state as JSON
    #[arg(long)]
    pub json: bool,

    /// Zero the lifetime counters (remembered directories are kept)
    #[arg(long)]
    pub reset: bool,
}

/// Execute the stats command.
pub fn execute(args: StatsArgs, config: &Config) -> anyhow::Result<()> {
    let store = StateStore::new(config.state_file());
    let mut state = store.load();

    if args.reset {
        state.reset_lifetime();
        store.save(&state)?;
        tracing::info!("Lifetime statistics reset in {:?}", store.path());
    }

    if args.json {
        println!("{}", webpipe_core::output::to_json(&state, true)?);
    } else {
        println!("{}", render(&state));
    }
    Ok(())
}

fn render(state: &AppState) -> String {
    let dir = |d: Option<std::path::PathBuf>| {
        d.map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    format!(
        "Files converted: {}\nSpace saved:     {}\nLast input:      {}\nLast output:     {}",
        state.total_files_converted,
        format_bytes(state.total_space_saved),
        dir(state.last_input_dir()),
        dir(state.last_output_dir()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.general.state_file = dir.join("state.json").display().to_string();
        config
    }

    #[test]
    fn render_shows_counters_and_dirs() {
        let state = AppState {
            input_dir: "/in".to_string(),
            output_dir: String::new(),
            total_files_converted: 7,
            total_space_saved: 2_500_000,
        };
        let text = render(&state);
        assert!(text.contains("Files converted: 7"));
        assert!(text.contains("2.5 MB"));
        assert!(text.contains("Last input:      /in"));
        assert!(text.contains("Last output:     -"));
    }

    #[test]
    fn reset_zeroes_persisted_counters() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let store = StateStore::new(config.state_file());
        store
            .save(&AppState {
                input_dir: "/in".to_string(),
                output_dir: "/out".to_string(),
                total_files_converted: 4,
                total_space_saved: 100,
            })
            .unwrap();

        execute(
            StatsArgs {
                json: true,
                reset: true,
            },
            &config,
        )
        .unwrap();

        let state = store.load();
        assert_eq!(state.total_files_converted, 0);
        assert_eq!(state.total_space_saved, 0);
        assert_eq!(state.input_dir, "/in");
    }
}
