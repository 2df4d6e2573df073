use std::time::{Duration, Instant};

/// Statistics collected during log processing. Purely diagnostic; merged
/// from worker batch results by the reducer sink and reported to stderr.
#[derive(Debug, Clone)]
pub struct ProcessingStats {
    pub lines_read: usize,
    pub heartbeats_matched: usize,
    pub batches_reduced: usize,
    pub processing_time: Duration,
    pub start_time: Option<Instant>,
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self {
            lines_read: 0,
            heartbeats_matched: 0,
            batches_reduced: 0,
            processing_time: Duration::ZERO,
            start_time: Some(Instant::now()),
        }
    }

    /// Fold one batch's counters in.
    pub fn add_batch(&mut self, lines_read: usize, heartbeats_matched: usize) {
        self.lines_read += lines_read;
        self.heartbeats_matched += heartbeats_matched;
        self.batches_reduced += 1;
    }

    pub fn finish(&mut self) {
        if let Some(start) = self.start_time {
            self.processing_time = start.elapsed();
        }
    }

    pub fn format_stats(&self) -> String {
        let skipped = self.lines_read - self.heartbeats_matched;
        let mut output = format!(
            "Lines processed: {} total, {} heartbeats, {} skipped, {} batches",
            self.lines_read, self.heartbeats_matched, skipped, self.batches_reduced
        );

        let processing_time_ms = self.processing_time.as_millis();
        output.push_str(&format!(" in {}ms", processing_time_ms));

        if processing_time_ms > 0 && self.lines_read > 0 {
            let lines_per_sec = (self.lines_read as f64 * 1000.0) / processing_time_ms as f64;
            output.push_str(&format!(" ({:.0} lines/s)", lines_per_sec));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_batch_accumulates() {
        let mut stats = ProcessingStats::new();
        stats.add_batch(100, 40);
        stats.add_batch(50, 10);
        assert_eq!(stats.lines_read, 150);
        assert_eq!(stats.heartbeats_matched, 50);
        assert_eq!(stats.batches_reduced, 2);
    }

    #[test]
    fn test_format_stats_mentions_counts() {
        let mut stats = ProcessingStats::new();
        stats.add_batch(10, 3);
        stats.finish();
        let formatted = stats.format_stats();
        assert!(formatted.contains("10 total"));
        assert!(formatted.contains("3 heartbeats"));
        assert!(formatted.contains("7 skipped"));
    }
}
