use tracing::level_filters::LevelFilter;

pub fn trace_init() {
    let level = std::env::var("TEST_LOG")
        .ok()
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::DEBUG);

    // every test calls this, only the first one wins
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_test_writer()
        .try_init();
}
