// Process Table
//
// Local process access used to force-restart a hung miner. The miner's own
// watchdog is expected to bring the process back after it is killed.

use sysinfo::{Pid, System};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    /// Short name; Linux truncates it to 15 bytes
    pub name: String,
    /// File name of the executable, when readable
    pub exe_name: Option<String>,
}

impl ProcessEntry {
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.exe_name.as_deref() == Some(name)
    }
}

pub trait ProcessTable {
    fn list_processes(&mut self) -> Vec<ProcessEntry>;

    /// Returns true if the process was signalled
    fn terminate(&mut self, pid: u32) -> bool;

    /// Kill only the first process whose name or executable file name matches
    /// exactly. Returns its pid when one was found and signalled.
    fn terminate_first_named(&mut self, name: &str) -> Option<u32> {
        let target = self.list_processes().into_iter().find(|p| p.matches(name))?;
        if self.terminate(target.pid) {
            Some(target.pid)
        } else {
            tracing::warn!("[ProcessTable] Failed to kill {} (PID {})", name, target.pid);
            None
        }
    }
}

pub struct SysinfoProcessTable {
    sys: System,
}

impl SysinfoProcessTable {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }
}

impl Default for SysinfoProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SysinfoProcessTable {
    fn list_processes(&mut self) -> Vec<ProcessEntry> {
        self.sys.refresh_processes();

        let mut entries: Vec<ProcessEntry> = self
            .sys
            .processes()
            .values()
            .map(|p| ProcessEntry {
                pid: p.pid().as_u32(),
                name: p.name().to_string(),
                exe_name: p
                    .exe()
                    .and_then(|exe| exe.file_name())
                    .map(|f| f.to_string_lossy().into_owned()),
            })
            .collect();
        // HashMap order is arbitrary; lowest pid first keeps "first match" stable
        entries.sort_by_key(|p| p.pid);
        entries
    }

    fn terminate(&mut self, pid: u32) -> bool {
        self.sys
            .process(Pid::from_u32(pid))
            .map(|p| p.kill())
            .unwrap_or(false)
    }
}
