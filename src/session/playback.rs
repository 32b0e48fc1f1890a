/// Snapshot of the playback primitive as last seen by the session.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
}

impl PlaybackState {
    pub fn paused_at_start(duration: f64) -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration,
        }
    }

    /// Fraction of the track already played, 0 when nothing is loaded.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            self.current_time / self.duration
        } else {
            0.0
        }
    }
}

/// `m:ss`, minutes unpadded.
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_guards_zero_duration() {
        assert_eq!(PlaybackState::default().progress(), 0.0);
        let state = PlaybackState {
            is_playing: true,
            current_time: 30.0,
            duration: 120.0,
        };
        assert_eq!(state.progress(), 0.25);
    }

    #[test]
    fn time_format() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(59.99), "0:59");
        assert_eq!(format_time(61.2), "1:01");
        assert_eq!(format_time(3725.0), "62:05");
    }
}
