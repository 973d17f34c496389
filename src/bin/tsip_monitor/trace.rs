use tracing_subscriber::{
    fmt::format::FmtSpan,
    prelude::*,
    EnvFilter,
};

const DEFAULT_FILTER: &str = "info";

pub fn init(pretty: bool) {
    let level_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stderr_layer =
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false);

    if pretty {
        tracing_subscriber::registry()
            .with(stderr_layer.pretty().with_filter(level_filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                stderr_layer
                    .with_line_number(false)
                    .with_span_events(FmtSpan::NONE)
                    .with_filter(level_filter),
            )
            .init();
    }
}
