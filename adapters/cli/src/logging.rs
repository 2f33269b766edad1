use env_logger::{Builder, Env};
use log::LevelFilter;

/// Crates whose output is raised by `--verbose`.
const GARDEN_TARGETS: [&str; 8] = [
    "herb_garden",
    "garden_world",
    "garden_system_input",
    "garden_system_locomotion",
    "garden_system_snapshot_sync",
    "garden_system_proximity",
    "garden_rendering",
    "garden_rendering_macroquad",
];

/// Directive string used when `RUST_LOG` is unset.
///
/// Third-party crates such as macroquad stay at `warn`; the garden crates log
/// at `info`, or `debug` when `verbose` is set.
fn default_filter(verbose: bool) -> String {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut directives = vec![LevelFilter::Warn.to_string().to_lowercase()];
    directives.extend(
        GARDEN_TARGETS
            .iter()
            .map(|target| format!("{target}={}", level.to_string().to_lowercase())),
    );
    directives.join(",")
}

/// Initializes the global logger.
///
/// `RUST_LOG` takes precedence over [`default_filter`].
pub(crate) fn init(verbose: bool) {
    let env = Env::default().default_filter_or(default_filter(verbose));
    let mut builder = Builder::from_env(env);
    let _ = builder.format_timestamp_millis();

    // A logger may already be installed when tests call `init` repeatedly.
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_filter_keeps_dependencies_at_warn() {
        let filter = default_filter(false);

        assert!(filter.starts_with("warn,"));
        assert!(filter.contains("herb_garden=info"));
        assert!(filter.contains("garden_system_proximity=info"));
        assert!(!filter.contains("debug"));
    }

    #[test]
    fn verbose_filter_raises_every_garden_crate() {
        let filter = default_filter(true);

        for target in GARDEN_TARGETS {
            assert!(
                filter.contains(&format!("{target}=debug")),
                "{target} missing from {filter}"
            );
        }
        assert_eq!(filter.split(',').count(), GARDEN_TARGETS.len() + 1);
    }

    #[test]
    fn init_twice_does_not_panic() {
        init(false);
        init(true);
    }
}
