//! Frame inspection and diagnostics.

use crate::pulse::PulseReport;

/// What happened during one simulation step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number this step produced (1-based).
    pub frame: u64,
    pub nodes: usize,
    /// Nodes with non-zero activation after the step.
    pub active: usize,
    pub connections: usize,
    /// Pulses still in flight after the step.
    pub pulses: usize,
    pub spontaneous: usize,
    pub spawned: usize,
    pub arrived: usize,
    pub suppressed: usize,
    pub dropped: usize,
}

impl FrameStats {
    pub(crate) fn absorb(&mut self, report: PulseReport) {
        self.spawned += report.spawned;
        self.arrived += report.arrived;
        self.suppressed += report.suppressed;
        self.dropped += report.dropped;
    }

    /// Spikes of any origin this step.
    #[inline]
    pub fn spikes(&self) -> usize {
        self.spontaneous + self.arrived
    }
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "frame {}: {} nodes ({} active), {} edges, {} pulses \
             [+{} spawned, {} arrived, {} suppressed, {} dropped, {} spontaneous]",
            self.frame,
            self.nodes,
            self.active,
            self.connections,
            self.pulses,
            self.spawned,
            self.arrived,
            self.suppressed,
            self.dropped,
            self.spontaneous
        )
    }
}

/// Event totals over a run of frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub frames: u64,
    pub spontaneous: u64,
    pub spawned: u64,
    pub arrived: u64,
    pub suppressed: u64,
    pub dropped: u64,
    /// Largest number of pulses in flight at the end of any frame.
    pub peak_pulses: usize,
    /// Sum of edge counts, for the mean.
    connection_sum: u64,
}

impl RunTotals {
    pub fn record(&mut self, stats: &FrameStats) {
        self.frames += 1;
        self.spontaneous += stats.spontaneous as u64;
        self.spawned += stats.spawned as u64;
        self.arrived += stats.arrived as u64;
        self.suppressed += stats.suppressed as u64;
        self.dropped += stats.dropped as u64;
        self.peak_pulses = self.peak_pulses.max(stats.pulses);
        self.connection_sum += stats.connections as u64;
    }

    pub fn mean_connections(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.connection_sum as f64 / self.frames as f64
        }
    }
}

impl std::fmt::Display for RunTotals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Frames: {}, Mean edges: {:.1}, Peak pulses: {}",
            self.frames,
            self.mean_connections(),
            self.peak_pulses
        )?;
        writeln!(
            f,
            "  Spikes: {} spontaneous, {} pulse-triggered",
            self.spontaneous, self.arrived
        )?;
        writeln!(
            f,
            "  Pulses: {} spawned, {} suppressed, {} dropped",
            self.spawned, self.suppressed, self.dropped
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_accumulate() {
        let mut totals = RunTotals::default();
        totals.record(&FrameStats { connections: 10, pulses: 3, spawned: 2, ..Default::default() });
        totals.record(&FrameStats { connections: 20, pulses: 1, arrived: 1, ..Default::default() });

        assert_eq!(totals.frames, 2);
        assert_eq!(totals.spawned, 2);
        assert_eq!(totals.arrived, 1);
        assert_eq!(totals.peak_pulses, 3);
        assert!((totals.mean_connections() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn absorb_adds_report() {
        let mut stats = FrameStats { spontaneous: 1, ..Default::default() };
        stats.absorb(PulseReport { spawned: 2, arrived: 1, suppressed: 3, dropped: 4 });
        assert_eq!(stats.spikes(), 2);
        assert_eq!(stats.suppressed, 3);
        assert_eq!(stats.dropped, 4);
    }

    #[test]
    fn display_mentions_counts() {
        let s = FrameStats { frame: 9, nodes: 32, pulses: 4, ..Default::default() }.to_string();
        assert!(s.contains("frame 9"));
        assert!(s.contains("32 nodes"));
        assert!(s.contains("4 pulses"));
    }
}
