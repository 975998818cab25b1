use std::fmt::Write;

use anyhow::Result;
use serde::Serialize;

use crate::{config::Config, traits::DisplayTerminal};

/// Summary of download counts across the catalog. An empty catalog reports
/// zero for every field.
#[derive(Default, Debug, Clone, PartialEq, Serialize)]
pub struct DownloadStatistics {
    pub mean:  f64,
    pub max:   u32,
    pub min:   u32,
    pub count: usize,
}

impl DownloadStatistics {
    pub fn from_counts(counts: &[u32]) -> Self {
        let (Some(max), Some(min)) = (counts.iter().max(), counts.iter().min()) else {
            return Self::default();
        };
        let total: u64 = counts.iter().map(|x| u64::from(*x)).sum();
        Self {
            mean: total as f64 / counts.len() as f64,
            max: *max,
            min: *min,
            count: counts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl DisplayTerminal for DownloadStatistics {
    fn fmt(&self, f: &mut String, config: &Config) -> Result<()> {
        let output = &config.output_statistics;
        writeln!(f, "{}", output.format_str(format!("Mean downloads: {:.2}", self.mean)))?;
        writeln!(f, "{}", output.format_str(format!("Most downloaded: {}", self.max)))?;
        writeln!(f, "{}", output.format_str(format!("Least downloaded: {}", self.min)))?;
        write!(f, "{}", output.format_str(format!("Books stored: {}", self.count)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_counts_yield_zeroes() {
        let stats = DownloadStatistics::from_counts(&[]);
        assert_eq!(stats, DownloadStatistics::default());
        assert!(stats.is_empty());
        assert_eq!(stats.mean, 0.0);
    }

    #[test]
    fn summary_over_counts() {
        let stats = DownloadStatistics::from_counts(&[500, 100, 300]);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.max, 500);
        assert_eq!(stats.min, 100);
        assert_eq!(stats.mean, 300.0);
    }

    #[test]
    fn large_counts_do_not_overflow() {
        let stats = DownloadStatistics::from_counts(&[u32::MAX, u32::MAX]);
        assert_eq!(stats.mean, u32::MAX as f64);
    }
}
