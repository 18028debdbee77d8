// Rolling metric history for trend charts
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySample {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub rpm: f64,
    pub efficiency: f64,
}

/// Bounded FIFO of samples, oldest first. Never holds more than `capacity`.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: VecDeque<HistorySample>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Rebuilds a buffer from previously saved samples, keeping the newest.
    pub fn restore(capacity: usize, samples: Vec<HistorySample>) -> Self {
        let mut buffer = Self::new(capacity);
        for sample in samples {
            buffer.append(sample);
        }
        buffer
    }

    pub fn append(&mut self, sample: HistorySample) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    pub fn latest(&self) -> Option<&HistorySample> {
        self.samples.back()
    }

    /// Copy of the samples, oldest to newest.
    pub fn snapshot(&self) -> Vec<HistorySample> {
        self.samples.iter().cloned().collect()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
