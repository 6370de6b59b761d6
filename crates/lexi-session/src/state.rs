/// Session phase: polling either is or is not underway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
}

impl Phase {
    /// Label for the start/stop control: the action a toggle would take.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "Start Analysis",
            Phase::Running => "Stop Analysis",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Phase::Running)
    }
}
