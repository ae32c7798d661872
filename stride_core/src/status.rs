//! Tracking status returned from each handled tracker event.

/// Public status of the tracker after one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerStatus {
    /// Tracking is active; carries the current daily count.
    Tracking { steps_today: u32 },
    /// Terminal state after `Stop`; the final flush has been attempted.
    Stopped { steps_today: u32 },
}

impl TrackerStatus {
    pub fn steps_today(&self) -> u32 {
        match self {
            Self::Tracking { steps_today } | Self::Stopped { steps_today } => *steps_today,
        }
    }
}
