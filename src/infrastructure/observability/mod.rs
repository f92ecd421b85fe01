//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use self::metrics::{
    create_metrics_router, init_metrics, record_cache_write, record_key_lookup,
    record_sync_account, PrometheusMetrics,
};
