/// The host's lifecycle state machine: `New -> Ready -> Running -> Stopping
/// -> Stopped`, looping back to `New` via `DeInitialize` when a reload was
/// requested. Each `Supervisor` operation in `agni-supervisor` asserts the
/// phase it requires before acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostPhase {
    New,
    Ready,
    Running,
    Stopping,
    Stopped,
}

impl HostPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostPhase::New => "NEW",
            HostPhase::Ready => "READY",
            HostPhase::Running => "RUNNING",
            HostPhase::Stopping => "STOPPING",
            HostPhase::Stopped => "STOPPED",
        }
    }
}

impl std::fmt::Display for HostPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
