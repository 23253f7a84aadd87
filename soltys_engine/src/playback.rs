/// Elapsed-time readout for session replay. The label only reformats after
/// more than a second of replayed time so per-frame updates stay cheap.
#[derive(Debug)]
pub struct ReplayTimer {
    last_time: u32,
    label: String,
    paused: bool,
}

impl Default for ReplayTimer {
    fn default() -> Self {
        ReplayTimer::new()
    }
}

impl ReplayTimer {
    pub fn new() -> Self {
        ReplayTimer {
            last_time: 0,
            label: String::from("00:00:00"),
            paused: false,
        }
    }

    pub fn set_replayed_time(&mut self, time_ms: u32) {
        if time_ms.wrapping_sub(self.last_time) > 1000 {
            let seconds = time_ms / 1000;
            self.label = format!(
                "{:02}:{:02}:{:02}",
                seconds / 3600 % 24,
                seconds / 60 % 60,
                seconds % 60
            );
            self.last_time = time_ms;
        }
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}
