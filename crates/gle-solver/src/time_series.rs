//! Multi-channel time series sharing one time axis.
//!
//! Channels are keyed by location: `F{i}` for the excitation force at
//! location `i`, `A{i}` for the response (acceleration) at location `i`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Stable identifier of a measurement or excitation channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChannelId {
    /// Force at location `i` (`F{i}`)
    Force(usize),
    /// Response at location `i` (`A{i}`)
    Response(usize),
}

impl ChannelId {
    pub fn location(&self) -> usize {
        match self {
            ChannelId::Force(i) | ChannelId::Response(i) => *i,
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Force(i) => write!(f, "F{}", i),
            ChannelId::Response(i) => write!(f, "A{}", i),
        }
    }
}

impl FromStr for ChannelId {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parse_index = |rest: &str| {
            rest.parse::<usize>().map_err(|_| {
                SolverError::Configuration(format!("Invalid channel label '{}'", s))
            })
        };
        if let Some(rest) = s.strip_prefix('F') {
            Ok(ChannelId::Force(parse_index(rest)?))
        } else if let Some(rest) = s.strip_prefix('A') {
            Ok(ChannelId::Response(parse_index(rest)?))
        } else {
            Err(SolverError::Configuration(format!(
                "Invalid channel label '{}' (expected F{{i}} or A{{i}})",
                s
            )))
        }
    }
}

/// Time axis plus named channels of equal length
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    time: Vec<f64>,
    channels: BTreeMap<ChannelId, Vec<f64>>,
}

impl TimeSeries {
    /// Create an empty series on a strictly increasing time axis
    pub fn new(time: Vec<f64>) -> Result<Self> {
        if time.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SolverError::Configuration(
                "Time axis must be strictly increasing".to_string(),
            ));
        }
        Ok(Self {
            time,
            channels: BTreeMap::new(),
        })
    }

    /// Uniform axis `t_k = k / fs` with `num_samples` samples
    pub fn uniform(sampling_frequency: f64, num_samples: usize) -> Result<Self> {
        if !(sampling_frequency.is_finite() && sampling_frequency > 0.0) {
            return Err(SolverError::Configuration(format!(
                "Sampling frequency must be positive, got {}",
                sampling_frequency
            )));
        }
        Self::new(
            (0..num_samples)
                .map(|k| k as f64 / sampling_frequency)
                .collect(),
        )
    }

    /// Add or replace a channel
    pub fn insert_channel(&mut self, id: ChannelId, values: Vec<f64>) -> Result<()> {
        if values.len() != self.time.len() {
            return Err(SolverError::Configuration(format!(
                "Channel {} has {} samples, time axis has {}",
                id,
                values.len(),
                self.time.len()
            )));
        }
        self.channels.insert(id, values);
        Ok(())
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn channel(&self, id: ChannelId) -> Option<&[f64]> {
        self.channels.get(&id).map(Vec::as_slice)
    }

    /// Channel ids in order: forces first, then responses, by location
    pub fn channel_ids(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.channels.keys().copied()
    }

    pub fn force_channels(&self) -> Vec<ChannelId> {
        self.channel_ids()
            .filter(|id| matches!(id, ChannelId::Force(_)))
            .collect()
    }

    pub fn response_channels(&self) -> Vec<ChannelId> {
        self.channel_ids()
            .filter(|id| matches!(id, ChannelId::Response(_)))
            .collect()
    }

    /// Sampling frequency `1 / (t1 - t0)`
    pub fn sampling_frequency(&self) -> Result<f64> {
        if self.time.len() < 2 {
            return Err(SolverError::InsufficientData(
                "Sampling frequency needs at least two samples".to_string(),
            ));
        }
        Ok(1.0 / (self.time[1] - self.time[0]))
    }

    /// Whether every interval matches the first to a relative tolerance
    pub fn is_uniform(&self, rel_tol: f64) -> bool {
        let Some(dt) = self.time.get(1).map(|t1| t1 - self.time[0]) else {
            return true;
        };
        self.time
            .windows(2)
            .all(|w| ((w[1] - w[0]) - dt).abs() <= rel_tol * dt)
    }

    /// Duration covered by the time axis
    pub fn duration(&self) -> f64 {
        match (self.time.first(), self.time.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}
