use std::fmt;
use std::time::Duration;

use link::Speed;
use xfer::Direction;

/// Totals accumulated over a transfer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThroughputSample {
    pub elapsed_us: u64,
    pub bytes: u64,
}

impl ThroughputSample {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_us as f64 / 1_000_000.0
    }

    /// Throughput in Mbit/s, or 0 if no time was accounted.
    pub fn throughput_mbps(&self) -> f64 {
        if self.elapsed_us == 0 {
            return 0.0;
        }
        8.0 * self.bytes as f64 / self.elapsed_us as f64
    }
}

/// Accounts bytes and time spent in individual link calls.
///
/// Only the calls themselves are timed, so file I/O and other per packet
/// overhead between calls never shows up in the rate.
#[derive(Debug, Default)]
pub struct Monitor {
    bytes: u64,
    elapsed: Duration,
    operations: u64,
}

impl Monitor {
    pub fn new() -> Monitor {
        Monitor::default()
    }

    /// Records one completed link call.
    pub fn record(&mut self, bytes: usize, elapsed: Duration) {
        self.bytes += bytes as u64;
        self.elapsed += elapsed;
        self.operations += 1;
    }

    /// Number of link calls recorded.
    pub fn operations(&self) -> u64 {
        self.operations
    }

    pub fn sample(&self) -> ThroughputSample {
        ThroughputSample {
            elapsed_us: self.elapsed.as_micros() as u64,
            bytes: self.bytes,
        }
    }
}

/// Summary of a finished transfer.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub direction: Direction,
    /// Rates measured by the link once the loop ended.
    pub speed: Speed,
    /// MTU used for transmitting.
    pub mtu: Option<usize>,
    pub packets: u64,
    pub sample: ThroughputSample,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (role, size, time, rate) = match self.direction {
            Direction::ToLink => (
                "Transmitter",
                "Transferred data size",
                "Transferred elapsed time",
                "Throughput of transmit",
            ),
            Direction::FromLink => (
                "Receiver",
                "Received data size",
                "Received elapsed time",
                "Throughput of receive",
            ),
        };

        writeln!(f, "{} TX speed: {:.1} Mbit/s", role, self.speed.tx_mbps())?;
        writeln!(f, "{} RX speed: {:.1} Mbit/s", role, self.speed.rx_mbps())?;
        if let Some(mtu) = self.mtu {
            writeln!(f, "MTU (packet size): {} bytes", mtu)?;
        }
        writeln!(f, "{}: {} bytes", size, self.sample.bytes)?;
        writeln!(f, "{}: {:.6} s", time, self.sample.elapsed_secs())?;
        write!(f, "{}: {:.6} Mbit/s", rate, self.sample.throughput_mbps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_monitor() {
        let monitor = Monitor::new();
        assert_eq!(monitor.sample(), ThroughputSample::default());
        assert_eq!(monitor.sample().throughput_mbps(), 0.0);
    }

    #[test]
    fn test_record_accumulates() {
        let mut monitor = Monitor::new();
        monitor.record(1000, Duration::from_micros(10));
        monitor.record(500, Duration::from_micros(20));

        let sample = monitor.sample();
        assert_eq!(sample.bytes, 1500);
        assert_eq!(sample.elapsed_us, 30);
        assert_eq!(sample.throughput_mbps(), 400.0);
        assert_eq!(monitor.operations(), 2);
    }

    #[test]
    fn test_sample_is_idempotent() {
        let mut monitor = Monitor::new();
        monitor.record(4096, Duration::from_micros(100));
        assert_eq!(monitor.sample(), monitor.sample());
    }

    #[test]
    fn test_transmit_report() {
        let report = Report {
            direction: Direction::ToLink,
            speed: Speed {
                tx_kbps: 408000,
                rx_kbps: 2400,
            },
            mtu: Some(4096),
            packets: 3,
            sample: ThroughputSample {
                elapsed_us: 1_000_000,
                bytes: 10000,
            },
        };

        let text = report.to_string();
        assert!(text.contains("Transmitter TX speed: 408.0 Mbit/s"));
        assert!(text.contains("Transmitter RX speed: 2.4 Mbit/s"));
        assert!(text.contains("MTU (packet size): 4096 bytes"));
        assert!(text.contains("Transferred data size: 10000 bytes"));
        assert!(text.contains("Transferred elapsed time: 1.000000 s"));
        assert!(text.contains("Throughput of transmit: 0.080000 Mbit/s"));
    }

    #[test]
    fn test_receive_report_has_no_mtu() {
        let report = Report {
            direction: Direction::FromLink,
            speed: Speed::default(),
            mtu: None,
            packets: 0,
            sample: ThroughputSample::default(),
        };

        let text = report.to_string();
        assert!(!text.contains("MTU"));
        assert!(text.contains("Received data size: 0 bytes"));
        assert!(text.contains("Throughput of receive: 0.000000 Mbit/s"));
    }
}
