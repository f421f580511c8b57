// Mount lifecycle bookkeeping for one gallery handle.
// Kept free of web-sys so the host-side tests can include it directly.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MountPhase {
    /// GPU device and surface are still being acquired.
    Initializing,
    Live,
    Failed(String),
    Unmounted,
}

#[derive(Debug)]
pub struct MountTracker {
    phase: MountPhase,
}

impl Default for MountTracker {
    fn default() -> Self {
        Self {
            phase: MountPhase::Initializing,
        }
    }
}

impl MountTracker {
    #[inline]
    pub fn phase(&self) -> &MountPhase {
        &self.phase
    }

    /// GPU init finished. Returns true when the scene should go live; false
    /// means the handle was unmounted meanwhile and the renderer must be released.
    pub fn init_succeeded(&mut self) -> bool {
        if self.phase == MountPhase::Initializing {
            self.phase = MountPhase::Live;
            true
        } else {
            false
        }
    }

    /// GPU init failed. An unmount that already happened wins.
    pub fn init_failed(&mut self, reason: impl Into<String>) {
        if self.phase == MountPhase::Initializing {
            self.phase = MountPhase::Failed(reason.into());
        }
    }

    /// Returns true only for the first call.
    pub fn unmount(&mut self) -> bool {
        if self.phase == MountPhase::Unmounted {
            return false;
        }
        self.phase = MountPhase::Unmounted;
        true
    }

    /// `scene_loading` is the live scene's own flag, when a scene exists.
    pub fn is_loading(&self, scene_loading: Option<bool>) -> bool {
        match self.phase {
            MountPhase::Initializing => true,
            MountPhase::Live => scene_loading.unwrap_or(false),
            MountPhase::Failed(_) | MountPhase::Unmounted => false,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            MountPhase::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}
