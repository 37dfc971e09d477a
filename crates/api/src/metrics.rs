use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use survey::RunReport;

pub struct Metrics {
    // Counters
    total_runs: AtomicUsize,
    successful_runs: AtomicUsize,
    failed_runs: AtomicUsize,

    // Timing (in microseconds)
    total_run_time_us: AtomicU64,

    // Counts
    questions_produced: AtomicUsize,
    units_dropped: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_runs: AtomicUsize::new(0),
            successful_runs: AtomicUsize::new(0),
            failed_runs: AtomicUsize::new(0),
            total_run_time_us: AtomicU64::new(0),
            questions_produced: AtomicUsize::new(0),
            units_dropped: AtomicUsize::new(0),
        })
    }

    pub fn record_success(&self, duration: Duration, questions: usize, report: &RunReport) {
        self.record_run(duration);
        self.successful_runs.fetch_add(1, Ordering::Relaxed);
        self.questions_produced.fetch_add(questions, Ordering::Relaxed);
        self.units_dropped.fetch_add(report.units_dropped, Ordering::Relaxed);
    }

    pub fn record_failure(&self, duration: Duration) {
        self.record_run(duration);
        self.failed_runs.fetch_add(1, Ordering::Relaxed);
    }

    fn record_run(&self, duration: Duration) {
        self.total_runs.fetch_add(1, Ordering::Relaxed);
        self.total_run_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_runs: self.total_runs.load(Ordering::Relaxed),
            successful_runs: self.successful_runs.load(Ordering::Relaxed),
            failed_runs: self.failed_runs.load(Ordering::Relaxed),
            avg_run_time_ms: self.avg_time_ms(&self.total_run_time_us, &self.total_runs),
            questions_produced: self.questions_produced.load(Ordering::Relaxed),
            units_dropped: self.units_dropped.load(Ordering::Relaxed),
        }
    }

    fn avg_time_ms(&self, total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
        let total = total_us.load(Ordering::Relaxed) as f64;
        let cnt = count.load(Ordering::Relaxed) as f64;
        if cnt > 0.0 {
            total / cnt / 1000.0 // Convert to ms
        } else {
            0.0
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_runs: usize,
    pub successful_runs: usize,
    pub failed_runs: usize,
    pub avg_run_time_ms: f64,
    pub questions_produced: usize,
    pub units_dropped: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
