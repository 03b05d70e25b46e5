//! The two-slot transfer state machine carried by every device.

/// Which of the two transfer slots is occupied, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    None,
    ToServer,
    FromServer,
}

/// Per-device transfer record. `to_device_id`/`from_device_id` of `0` mean
/// "unused"; at most one is non-zero at any moment.
#[derive(Debug, Clone)]
pub struct TransferModel {
    pub to_device_id: u32,
    pub from_device_id: u32,
    pub duration: u32,
    pub target_duration: u32,
    pub pending_service_ids: Vec<u32>,
    pub succeeded: u32,
    pub failed: u32,
}

impl Default for TransferModel {
    fn default() -> Self {
        Self {
            to_device_id: 0,
            from_device_id: 0,
            duration: 0,
            target_duration: 0,
            pending_service_ids: Vec::new(),
            succeeded: 0,
            failed: 0,
        }
    }
}

impl TransferModel {
    pub fn direction(&self) -> Direction {
        if self.to_device_id != 0 {
            Direction::ToServer
        } else if self.from_device_id != 0 {
            Direction::FromServer
        } else {
            Direction::None
        }
    }

    pub fn in_flight(&self) -> bool {
        self.to_device_id != 0 || self.from_device_id != 0
    }

    /// idle -> uploading.
    pub fn start_upload(&mut self, to_device_id: u32, target_duration: u32, pending_service_ids: Vec<u32>) {
        debug_assert!(!self.in_flight());
        self.to_device_id = to_device_id;
        self.from_device_id = 0;
        self.duration = 0;
        self.target_duration = target_duration;
        self.pending_service_ids = pending_service_ids;
    }

    /// idle -> downloading.
    pub fn start_download(&mut self, from_device_id: u32, target_duration: u32, pending_service_ids: Vec<u32>) {
        debug_assert!(!self.in_flight());
        self.from_device_id = from_device_id;
        self.to_device_id = 0;
        self.duration = 0;
        self.target_duration = target_duration;
        self.pending_service_ids = pending_service_ids;
    }

    /// Resets the slot to idle, incrementing the failure counter.
    pub fn fail(&mut self) {
        self.failed += 1;
        self.reset();
    }

    /// Resets the slot to idle, incrementing the success counter.
    pub fn complete(&mut self) {
        self.succeeded += 1;
        self.reset();
    }

    fn reset(&mut self) {
        self.to_device_id = 0;
        self.from_device_id = 0;
        self.duration = 0;
        self.target_duration = 0;
        self.pending_service_ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_is_not_in_flight() {
        let t = TransferModel::default();
        assert!(!t.in_flight());
        assert_eq!(t.direction(), Direction::None);
    }

    #[test]
    fn upload_then_fail_resets() {
        let mut t = TransferModel::default();
        t.start_upload(99, 5, vec![1, 2]);
        assert!(t.in_flight());
        assert_eq!(t.direction(), Direction::ToServer);
        t.fail();
        assert!(!t.in_flight());
        assert_eq!(t.failed, 1);
        assert!(t.pending_service_ids.is_empty());
    }

    #[test]
    fn download_then_complete_resets() {
        let mut t = TransferModel::default();
        t.start_download(99, 2, vec![7]);
        assert_eq!(t.direction(), Direction::FromServer);
        t.duration = 2;
        t.complete();
        assert!(!t.in_flight());
        assert_eq!(t.succeeded, 1);
    }
}
