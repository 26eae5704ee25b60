#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// 單一階段的資源快照
#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct StageSample {
    pub stage: String,
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub elapsed: Duration,
}

#[cfg(feature = "cli")]
pub struct ResourceMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    started: Instant,
    samples: Mutex<Vec<StageSample>>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl ResourceMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = sysinfo::get_current_pid().ok();
        if enabled && pid.is_none() {
            tracing::warn!("Unable to resolve current PID, resource stats disabled");
        }

        Self {
            system: Mutex::new(System::new()),
            pid,
            started: Instant::now(),
            samples: Mutex::new(Vec::new()),
            enabled,
        }
    }

    /// 記錄某個階段結束時的 CPU / 記憶體用量
    pub fn record(&self, stage: &str) -> Option<StageSample> {
        if !self.enabled {
            return None;
        }
        let pid = self.pid?;

        let mut system = self.system.lock().ok()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::everything(),
        );
        let process = system.process(pid)?;

        let sample = StageSample {
            stage: stage.to_string(),
            cpu_usage: process.cpu_usage(),
            memory_mb: process.memory() / 1024 / 1024,
            elapsed: self.started.elapsed(),
        };

        tracing::info!(
            "📊 {} - CPU: {:.1}%, Memory: {}MB, Time: {:?}",
            sample.stage,
            sample.cpu_usage,
            sample.memory_mb,
            sample.elapsed
        );

        if let Ok(mut samples) = self.samples.lock() {
            samples.push(sample.clone());
        }
        Some(sample)
    }

    pub fn peak_memory_mb(&self) -> u64 {
        self.samples
            .lock()
            .map(|samples| samples.iter().map(|s| s.memory_mb).max().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn log_summary(&self) {
        if self.enabled {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                self.started.elapsed(),
                self.peak_memory_mb()
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 環境下不收集資源資訊
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct ResourceMonitor;

#[cfg(not(feature = "cli"))]
impl ResourceMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn record(&self, _stage: &str) {}

    pub fn peak_memory_mb(&self) -> u64 {
        0
    }

    pub fn log_summary(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
