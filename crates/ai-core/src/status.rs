use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of executing a tree node for one entity during one tick.
///
/// Everything except `Running` concludes the node's involvement for the tick.
/// `Unknown` is what an entity reads for a node that has no recorded state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    #[default]
    Unknown,
    CannotExecute,
    Running,
    Finished,
    Failed,
    Exception,
}

impl Status {
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_running()
    }

    /// `CannotExecute` or `Failed`: the node did not do its job, but nothing broke.
    pub fn is_failure(self) -> bool {
        matches!(self, Status::CannotExecute | Status::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unknown => "UNKNOWN",
            Status::CannotExecute => "CANNOTEXECUTE",
            Status::Running => "RUNNING",
            Status::Finished => "FINISHED",
            Status::Failed => "FAILED",
            Status::Exception => "EXCEPTION",
        }
    }

    /// Compact numeric code for trace events.
    pub fn code(self) -> u64 {
        match self {
            Status::Unknown => 0,
            Status::CannotExecute => 1,
            Status::Running => 2,
            Status::Finished => 3,
            Status::Failed => 4,
            Status::Exception => 5,
        }
    }

    /// Inverse of [`Status::code`]; unrecognized codes read as `Unknown`.
    pub fn from_code(code: u64) -> Self {
        match code {
            1 => Status::CannotExecute,
            2 => Status::Running,
            3 => Status::Finished,
            4 => Status::Failed,
            5 => Status::Exception,
            _ => Status::Unknown,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
