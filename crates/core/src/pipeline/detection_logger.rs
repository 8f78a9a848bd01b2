use std::collections::HashMap;
use std::time::Instant;

/// Observer for detection loop events.
///
/// Keeps the loop free of any particular output mechanism; the CLI logs
/// through the `log` crate, tests discard everything.
pub trait DetectionLogger: Send {
    /// Report how many attempts have completed, out of `total` when known.
    fn progress(&mut self, current: usize, total: Option<usize>);

    /// Record how long a named stage took for one attempt.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. pending attempts).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Logger that discards all events.
pub struct NullDetectionLogger;

impl DetectionLogger for NullDetectionLogger {
    fn progress(&mut self, _current: usize, _total: Option<usize>) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Aggregates per-stage timings and metrics and reports through `log`.
///
/// Progress lines are throttled to every `throttle` attempts.
pub struct LogDetectionLogger {
    throttle: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    completed: usize,
}

impl LogDetectionLogger {
    pub fn new(throttle: usize) -> Self {
        Self {
            throttle: throttle.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            completed: 0,
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Detection summary ({} attempts, {:.1}s total):",
            self.completed,
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let max_ms = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:12}: avg {:6.1}ms  max {max_ms:6.1}ms  total {total_ms:7.0}ms",
                mean(durations)
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            let values = &self.metrics[name];
            let peak = values.iter().copied().fold(0.0, f64::max);
            lines.push(format!("  {name}: avg {:.1}  peak {peak:.0}", mean(values)));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for LogDetectionLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl DetectionLogger for LogDetectionLogger {
    fn progress(&mut self, current: usize, total: Option<usize>) {
        self.completed = current;
        match total {
            Some(total) if total > 0 => {
                if current % self.throttle == 0 || current == total {
                    let pct = current as f64 / total as f64 * 100.0;
                    log::info!("Detection: {current}/{total} frames ({pct:.1}%)");
                }
            }
            _ => {
                if current % self.throttle == 0 {
                    log::info!("Detection: {current} frames");
                }
            }
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
