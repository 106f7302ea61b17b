use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_tree::HierarchicalLayer;
use tracing_tree::time::UtcDateTime;

/// Initializes the global tracing subscriber. Filtering is controlled with
/// `RUST_LOG`; the default keeps our own events at info and silences the
/// rest.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tapswitch=info,warn"));
    let tree = HierarchicalLayer::default()
        .with_indent_amount(2)
        .with_indent_lines(true)
        .with_targets(true)
        .with_timer(UtcDateTime::default())
        .with_filter(filter);
    tracing_subscriber::registry().with(tree).init();
}
