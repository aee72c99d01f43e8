/// Feed statistics tracking
///
/// Totals and data-quality counters for one pass over a feed. Counters back
/// the driver's logging and the end-of-run summary; they never affect the
/// computed reports.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FeedStats {
    start_time: Option<Instant>,
    total_messages: u64,
    total_bytes: u64,
    reports_emitted: u64,

    // Data-quality counters
    unknown_refs: u64,
    duplicate_refs: u64,
    malformed_payloads: u64,
    unsupported_messages: u64,
}

impl FeedStats {
    pub fn new() -> Self {
        FeedStats {
            start_time: None,
            total_messages: 0,
            total_bytes: 0,
            reports_emitted: 0,
            unknown_refs: 0,
            duplicate_refs: 0,
            malformed_payloads: 0,
            unsupported_messages: 0,
        }
    }

    /// Record a framed message and its total size, prefix included.
    pub fn record_message(&mut self, size: usize) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
        self.total_messages += 1;
        self.total_bytes += size as u64;
    }

    pub fn record_report(&mut self) {
        self.reports_emitted += 1;
    }

    pub fn record_unknown_ref(&mut self) {
        self.unknown_refs += 1;
    }

    pub fn record_duplicate_ref(&mut self) {
        self.duplicate_refs += 1;
    }

    pub fn record_malformed_payload(&mut self) {
        self.malformed_payloads += 1;
    }

    pub fn record_unsupported(&mut self) {
        self.unsupported_messages += 1;
    }

    /// Get messages per second
    pub fn messages_per_sec(&self) -> f64 {
        match self.start_time {
            None => 0.0,
            Some(start) => {
                let elapsed = start.elapsed().as_secs_f64();
                if elapsed > 0.0 {
                    self.total_messages as f64 / elapsed
                } else {
                    0.0
                }
            }
        }
    }

    /// Get bytes per second
    pub fn bytes_per_sec(&self) -> f64 {
        match self.start_time {
            None => 0.0,
            Some(start) => {
                let elapsed = start.elapsed().as_secs_f64();
                if elapsed > 0.0 {
                    self.total_bytes as f64 / elapsed
                } else {
                    0.0
                }
            }
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|st| st.elapsed())
    }

    pub fn total_messages(&self) -> u64 {
        self.total_messages
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn reports_emitted(&self) -> u64 {
        self.reports_emitted
    }

    pub fn unknown_refs(&self) -> u64 {
        self.unknown_refs
    }

    pub fn duplicate_refs(&self) -> u64 {
        self.duplicate_refs
    }

    pub fn malformed_payloads(&self) -> u64 {
        self.malformed_payloads
    }

    pub fn unsupported_messages(&self) -> u64 {
        self.unsupported_messages
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = FeedStats::new();
    }

    /// Print statistics summary
    pub fn print_summary(&self) {
        println!("=== Feed Statistics ===");
        println!("Total Messages: {}", self.total_messages);
        println!("Total Bytes: {}", self.total_bytes);
        println!("Reports Emitted: {}", self.reports_emitted);
        println!("Elapsed: {:?}", self.elapsed());
        println!("Messages/sec: {:.2}", self.messages_per_sec());
        println!("Bytes/sec: {:.2}", self.bytes_per_sec());

        println!(
            "\nData quality: {} unknown refs, {} duplicate refs, {} malformed payloads, {} unsupported",
            self.unknown_refs, self.duplicate_refs, self.malformed_payloads, self.unsupported_messages
        );
    }
}

impl Default for FeedStats {
    fn default() -> Self {
        Self::new()
    }
}
