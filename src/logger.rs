use env_logger::Env;

/// Initializes the global logger from `LOG_LEVEL` and `LOG_STYLE`.
pub fn setup_logger() {
    let env = Env::new()
        .filter_or("LOG_LEVEL", "info")
        .write_style_or("LOG_STYLE", "auto");

    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    log::info!(target: "init", "Logger initialized.");
}
