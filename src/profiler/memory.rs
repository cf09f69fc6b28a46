//! Resident memory sampling for the current process

use sysinfo::{Pid, ProcessesToUpdate, System};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Reads the resident set size of this process
pub struct MemorySampler {
    system: System,
    pid: Option<Pid>,
}

impl MemorySampler {
    pub fn new() -> Self {
        let pid = sysinfo::get_current_pid()
            .map_err(|e| tracing::debug!("Cannot determine current pid: {}", e))
            .ok();

        Self {
            system: System::new(),
            pid,
        }
    }

    /// Current resident memory in MB, or 0.0 when it cannot be read
    pub fn resident_mb(&mut self) -> f64 {
        let Some(pid) = self.pid else {
            return 0.0;
        };

        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        self.system
            .process(pid)
            .map(|process| process.memory() as f64 / BYTES_PER_MB)
            .unwrap_or(0.0)
    }
}

impl Default for MemorySampler {
    fn default() -> Self {
        Self::new()
    }
}
