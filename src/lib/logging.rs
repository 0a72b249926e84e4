//! Logging handles and formatting helpers.
//!
//! Components never log through bare global calls. Each entry point receives a
//! [`StageLogger`] that carries the context it is working in (the whole run, or one
//! individual), and phases are bracketed with a [`StageTimer`] so every major step of an
//! individual produces a start line and a completion line.

use std::fmt::Display;
use std::time::{Duration, Instant};

use crate::metrics::BalanceMetric;

/// Formats a count with thousands separators (e.g. "1,234,567").
///
/// # Examples
///
/// ```
/// use hapbal_lib::logging::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
#[must_use]
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a percentage with specified decimal places.
///
/// # Examples
///
/// ```
/// use hapbal_lib::logging::format_percent;
///
/// assert_eq!(format_percent(0.9543, 2), "95.43%");
/// assert_eq!(format_percent(1.0, 0), "100%");
/// ```
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", value * 100.0, decimals = decimals)
}

/// Formats a duration in human-readable form.
///
/// # Examples
///
/// ```
/// use hapbal_lib::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_secs(45)), "45s");
/// assert_eq!(format_duration(Duration::from_secs(135)), "2m 15s");
/// assert_eq!(format_duration(Duration::from_secs(5400)), "1h 30m");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        if remaining_secs == 0 { format!("{mins}m") } else { format!("{mins}m {remaining_secs}s") }
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
    }
}

/// Logging handle threaded through pipeline entry points.
///
/// The context is prefixed to every line, so interleaved output from a long run still shows
/// which individual a message belongs to.
///
/// # Examples
///
/// ```
/// use hapbal_lib::logging::StageLogger;
///
/// let run = StageLogger::new("phase");
/// let bird = run.for_individual("bird1");
/// assert_eq!(bird.context(), "phase:bird1");
/// bird.info("starting");
/// ```
#[derive(Debug, Clone)]
pub struct StageLogger {
    context: String,
}

impl StageLogger {
    /// Creates a logger for a top-level context (usually the command name).
    #[must_use]
    pub fn new(context: impl Into<String>) -> Self {
        Self { context: context.into() }
    }

    /// Creates a child logger scoped to one individual.
    #[must_use]
    pub fn for_individual(&self, individual: &str) -> Self {
        Self { context: format!("{}:{individual}", self.context) }
    }

    /// The context prefixed to each message.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn info(&self, message: impl Display) {
        log::info!("[{}] {message}", self.context);
    }

    pub fn debug(&self, message: impl Display) {
        log::debug!("[{}] {message}", self.context);
    }

    pub fn warn(&self, message: impl Display) {
        log::warn!("[{}] {message}", self.context);
    }

    /// Starts timing a named stage and logs its start.
    #[must_use]
    pub fn stage(&self, name: &str) -> StageTimer {
        self.info(format_args!("{name} ..."));
        StageTimer { logger: self.clone(), stage: name.to_string(), start_time: Instant::now() }
    }
}

/// Brackets one stage of work with start and completion log lines.
///
/// # Examples
///
/// ```no_run
/// use hapbal_lib::logging::StageLogger;
///
/// let logger = StageLogger::new("balance");
/// let timer = logger.stage("Cleaning consensus sequences");
/// // ... do work ...
/// timer.log_completion(120, "records");
/// ```
pub struct StageTimer {
    logger: StageLogger,
    stage: String,
    start_time: Instant,
}

impl StageTimer {
    /// Logs the completion with an item count and the elapsed time.
    pub fn log_completion(&self, count: u64, unit: &str) {
        self.logger.info(format_args!(
            "{} completed: {} {unit} in {}",
            self.stage,
            format_count(count),
            format_duration(self.start_time.elapsed())
        ));
    }
}

/// Logs a formatted summary of one individual's balancing.
pub fn log_balance_summary(logger: &StageLogger, metric: &BalanceMetric) {
    logger.info("Balancing Summary:");
    logger.info(format_args!("  Haplotype 0 loci: {}", format_count(metric.hap0_loci)));
    logger.info(format_args!("  Haplotype 1 loci: {}", format_count(metric.hap1_loci)));
    logger.info(format_args!("  Balanced loci: {}", format_count(metric.balanced_loci)));
    logger.info(format_args!("  Unphased records: {}", format_count(metric.unphased_records)));

    let union = metric.balanced_loci + metric.hap0_only + metric.hap1_only;
    if union > 0 {
        #[allow(clippy::cast_precision_loss)]
        let retained = metric.balanced_loci as f64 / union as f64;
        logger.info(format_args!("  Retained: {}", format_percent(retained, 2)));
    }
    if metric.hap0_only > 0 || metric.hap1_only > 0 {
        logger.warn(format_args!(
            "Dropped {} haplotype-0-only and {} haplotype-1-only loci",
            format_count(metric.hap0_only),
            format_count(metric.hap1_only)
        ));
    }
}
