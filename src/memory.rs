//! Memory-pressure sampling
//!
//! Ball radius is a proxy for memory usage. The simulation only consumes a
//! `(used, total)` pair; where it comes from is up to the host.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// One memory reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySample {
    pub used_bytes: u64,
    pub total_bytes: u64,
}

impl MemorySample {
    pub fn new(used_bytes: u64, total_bytes: u64) -> Self {
        Self {
            used_bytes,
            total_bytes,
        }
    }

    /// Used memory in MiB (for display)
    pub fn used_mib(&self) -> f64 {
        self.used_bytes as f64 / 1024.0 / 1024.0
    }

    /// Used fraction in [0, 1]; zero when the total is unknown
    pub fn ratio(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.used_bytes as f64 / self.total_bytes as f64).clamp(0.0, 1.0)
    }
}

/// Source of memory readings
pub trait MemorySampler {
    /// Take a reading, or report that none is available on this host
    fn sample(&mut self) -> Result<MemorySample>;
}

impl<T: MemorySampler + ?Sized> MemorySampler for Box<T> {
    fn sample(&mut self) -> Result<MemorySample> {
        (**self).sample()
    }
}

/// Always returns the same reading
#[derive(Debug, Clone, Copy)]
pub struct FixedSampler(pub MemorySample);

impl MemorySampler for FixedSampler {
    fn sample(&mut self) -> Result<MemorySample> {
        Ok(self.0)
    }
}

/// A host without memory introspection
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSampler;

impl MemorySampler for UnavailableSampler {
    fn sample(&mut self) -> Result<MemorySample> {
        Err(SimError::SamplerUnavailable(
            "no memory introspection on this host".to_string(),
        ))
    }
}

/// System memory usage (`MemTotal - MemAvailable` over `MemTotal`)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSampler;

impl MemorySampler for SystemSampler {
    #[cfg(target_os = "linux")]
    fn sample(&mut self) -> Result<MemorySample> {
        let text = std::fs::read_to_string("/proc/meminfo")
            .map_err(|e| SimError::SamplerUnavailable(format!("/proc/meminfo: {e}")))?;
        parse_meminfo(&text).ok_or_else(|| {
            SimError::SamplerUnavailable("/proc/meminfo missing MemTotal/MemAvailable".to_string())
        })
    }

    #[cfg(not(target_os = "linux"))]
    fn sample(&mut self) -> Result<MemorySample> {
        Err(SimError::SamplerUnavailable(
            "system memory sampling is only implemented on Linux".to_string(),
        ))
    }
}

/// Parse the `MemTotal` and `MemAvailable` lines of `/proc/meminfo` (values in kB)
pub fn parse_meminfo(text: &str) -> Option<MemorySample> {
    let mut total_kb = None;
    let mut available_kb = None;

    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let key = parts.next();
        let value = parts.next().and_then(|v| v.parse::<u64>().ok());
        match key {
            Some("MemTotal:") => total_kb = value,
            Some("MemAvailable:") => available_kb = value,
            _ => {}
        }
    }

    let total_kb = total_kb.filter(|&t| t > 0)?;
    let available_kb = available_kb?.min(total_kb);
    Some(MemorySample::new(
        (total_kb - available_kb) * 1024,
        total_kb * 1024,
    ))
}
