use crate::utils::time::CalendarZone;

use super::retention::RetentionPolicy;

/// When the history shown next to today's log gets recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecomputeTrigger {
    /// History and the active date are fixed once loaded. A session that crosses midnight keeps
    /// writing into the day it started on.
    #[default]
    OnLoad,
    /// Every mutation first checks the clock and rolls over to the new day if it changed.
    OnDateChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackerConfig {
    pub zone: CalendarZone,
    pub retention: RetentionPolicy,
    pub recompute: RecomputeTrigger,
}
