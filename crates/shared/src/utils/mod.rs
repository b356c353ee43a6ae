mod base64_file;
mod logs;
mod metrics;
mod operation;
mod otel;
mod shutdown;
mod slug;

pub use self::base64_file::DecodedFile;
pub use self::logs::init_logger;
pub use self::metrics::{Method, Metrics, Status, SystemMetrics, run_metrics_collector};
pub use self::operation::{OperationTracer, TracingContext};
pub use self::otel::Telemetry;
pub use self::shutdown::shutdown_signal;
pub use self::slug::{slug_candidate, slugify};
