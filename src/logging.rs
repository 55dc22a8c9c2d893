use env_logger::Env;

/// Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
/// takes precedence over `verbose`.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
