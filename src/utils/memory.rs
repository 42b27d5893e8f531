//! Process memory-usage reporting for the benchmark harness.

use sysinfo::{Pid, PidExt, ProcessExt, System, SystemExt};

/// Resident set size of the current process, in megabytes. Returns `None`
/// if the current process can't be found in the refreshed process table.
pub fn resident_mb() -> Option<f64> {
    let mut system = System::new();
    let pid = Pid::from_u32(std::process::id());
    system.refresh_process(pid);
    system.process(pid).map(|process| process.memory() as f64 / 1024.0)
}
