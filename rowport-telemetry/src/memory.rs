use std::cell::RefCell;

use sysinfo::{Pid, System};

use crate::PlatformError;

/// Reports how much memory the host process currently uses.
pub trait MemoryProbe {
    fn used_bytes(&self) -> Result<u64, PlatformError>;
}

/// A probe for hosts without memory introspection.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMemoryProbe;

impl MemoryProbe for NoMemoryProbe {
    fn used_bytes(&self) -> Result<u64, PlatformError> {
        Err(PlatformError::Unsupported)
    }
}

/// Resident memory of the current process, as reported by `sysinfo`.
///
/// Only the current process is refreshed on each reading.
pub struct ProcessMemoryProbe {
    system: RefCell<System>,
    pid: Option<Pid>,
}

impl ProcessMemoryProbe {
    pub fn new() -> Self {
        let pid = if sysinfo::IS_SUPPORTED_SYSTEM {
            sysinfo::get_current_pid().ok()
        } else {
            None
        };
        Self {
            system: RefCell::new(System::new()),
            pid,
        }
    }
}

impl Default for ProcessMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for ProcessMemoryProbe {
    fn used_bytes(&self) -> Result<u64, PlatformError> {
        let pid = self.pid.ok_or(PlatformError::Unsupported)?;
        let mut system = self.system.borrow_mut();
        let found = system.refresh_process(pid);
        match system.process(pid) {
            Some(process) if found => Ok(process.memory()),
            _ => Err(PlatformError::InvalidReading(format!("process {pid} not found"))),
        }
    }
}

impl std::fmt::Debug for ProcessMemoryProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessMemoryProbe")
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}
