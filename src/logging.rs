/// Info by default, debug for this crate with `verbose`; `RUST_LOG` wins over both.
pub fn setup_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();

    builder.filter(None, log::LevelFilter::Info);
    if verbose {
        builder.filter(Some(env!("CARGO_CRATE_NAME")), log::LevelFilter::Debug);
    }

    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        builder.parse_filters(&rust_log);
    }

    builder.init();
}
