use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber for the CLI. `RUST_LOG` overrides the
/// verbosity switch.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("brainscore_core=debug,info")
    } else {
        EnvFilter::new("brainscore_core=info,warn")
    }
}
