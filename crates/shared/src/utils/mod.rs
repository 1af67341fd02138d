mod logs;
mod metadata;
mod metrics;
mod otel;
mod time;

pub use self::logs::init_logger;
pub use self::metadata::HeaderInjector;
pub use self::metrics::{Labels, Method, Metrics, Status};
pub use self::otel::{Telemetry, TelemetryProviders, TracingContext};
pub use self::time::clock_time;
