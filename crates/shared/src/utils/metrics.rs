use prometheus_client::{
    metrics::{counter::Counter, family::Family, gauge::Gauge, histogram::Histogram},
    registry::Registry,
};
use prometheus_client_derive_encode::{EncodeLabelSet, EncodeLabelValue};
use std::{
    sync::{Arc, Mutex, atomic::AtomicU64},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use sysinfo::{Pid, ProcessesToUpdate, System};

const COLLECT_INTERVAL: Duration = Duration::from_secs(15);

/// Thread count from `/proc/<pid>/status`. Linux only.
fn thread_count(pid: u32) -> Option<i64> {
    let status = std::fs::read_to_string(format!("/proc/{pid}/status")).ok()?;
    status
        .lines()
        .find_map(|line| line.strip_prefix("Threads:"))
        .and_then(|count| count.trim().parse().ok())
}

/// Process gauges sampled by [`run_metrics_collector`].
#[derive(Debug)]
pub struct SystemMetrics {
    resident_memory_bytes: Gauge,
    virtual_memory_bytes: Gauge,
    available_memory_bytes: Gauge,
    cpu_usage_percent: Gauge<f64, AtomicU64>,
    threads: Gauge,
    start_time_seconds: Gauge,
    system: Mutex<System>,
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMetrics {
    pub fn new() -> Self {
        let start_time_seconds = Gauge::default();
        let started = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        start_time_seconds.set(started as i64);

        Self {
            resident_memory_bytes: Gauge::default(),
            virtual_memory_bytes: Gauge::default(),
            available_memory_bytes: Gauge::default(),
            cpu_usage_percent: Gauge::default(),
            threads: Gauge::default(),
            start_time_seconds,
            system: Mutex::new(System::new()),
        }
    }

    pub fn register(&self, registry: &mut Registry) {
        let process = registry.sub_registry_with_prefix("process");
        process.register(
            "resident_memory_bytes",
            "Resident memory of the process",
            self.resident_memory_bytes.clone(),
        );
        process.register(
            "virtual_memory_bytes",
            "Virtual memory of the process",
            self.virtual_memory_bytes.clone(),
        );
        process.register(
            "threads",
            "Threads owned by the process",
            self.threads.clone(),
        );
        process.register(
            "start_time_seconds",
            "Process start time since the unix epoch",
            self.start_time_seconds.clone(),
        );

        let host = registry.sub_registry_with_prefix("host");
        host.register(
            "available_memory_bytes",
            "Memory available on the host",
            self.available_memory_bytes.clone(),
        );
        host.register(
            "cpu_usage_percent",
            "Global CPU usage of the host",
            self.cpu_usage_percent.clone(),
        );
    }

    /// Takes one sample. CPU usage needs two samples to be meaningful, so
    /// the first value after startup reads as zero.
    pub fn refresh(&self) {
        let pid = std::process::id();
        let mut system = self.system.lock().unwrap_or_else(|e| e.into_inner());

        system.refresh_memory();
        system.refresh_cpu_usage();
        system.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]), true);

        self.available_memory_bytes
            .set(system.available_memory() as i64);
        self.cpu_usage_percent
            .set(f64::from(system.global_cpu_usage()));

        if let Some(process) = system.process(Pid::from_u32(pid)) {
            self.resident_memory_bytes.set(process.memory() as i64);
            self.virtual_memory_bytes
                .set(process.virtual_memory() as i64);
        }

        if let Some(threads) = thread_count(pid) {
            self.threads.set(threads);
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Status {
    Success,
    Error,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct Labels {
    pub method: Method,
    pub status: Status,
}

/// Per-service operation counters and latencies.
#[derive(Clone, Debug)]
pub struct Metrics {
    operations: Family<Labels, Counter>,
    duration_seconds: Family<Labels, Histogram>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            operations: Family::default(),
            duration_seconds: Family::new_with_constructor(|| {
                Histogram::new(
                    [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0].into_iter(),
                )
            }),
        }
    }

    /// Exposes `<prefix>_operations_total` and
    /// `<prefix>_operation_duration_seconds`.
    pub fn register(&self, registry: &mut Registry, prefix: &str, component: &str) {
        registry.register(
            format!("{prefix}_operations"),
            format!("Operations handled by the {component}"),
            self.operations.clone(),
        );
        registry.register(
            format!("{prefix}_operation_duration_seconds"),
            format!("Operation latency of the {component}"),
            self.duration_seconds.clone(),
        );
    }

    pub fn record(&self, method: Method, status: Status, duration_secs: f64) {
        let labels = Labels { method, status };
        self.operations.get_or_create(&labels).inc();
        self.duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
    }
}

pub async fn run_metrics_collector(system_metrics: Arc<SystemMetrics>) {
    let mut interval = tokio::time::interval(COLLECT_INTERVAL);
    loop {
        interval.tick().await;
        system_metrics.refresh();
    }
}
