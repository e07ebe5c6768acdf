/// Animation time that only advances while playing.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Playback {
    playing: bool,
    total: f64,
}

impl Playback {
    pub fn new(playing: bool) -> Self {
        Self { playing, total: 0.0 }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Accumulated play time in seconds.
    pub fn total_time(&self) -> f64 {
        self.total
    }

    pub fn advance(&mut self, dt: f32) {
        if self.playing {
            self.total += f64::from(dt);
        }
    }

    /// Back to zero; the play state is kept.
    pub fn rewind(&mut self) {
        self.total = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_only_accumulates_while_playing() {
        let mut p = Playback::new(false);
        p.advance(0.5);
        assert_eq!(p.total_time(), 0.0);

        assert!(p.toggle());
        p.advance(0.5);
        p.advance(0.25);
        assert_eq!(p.total_time(), 0.75);

        p.set_playing(false);
        p.advance(1.0);
        assert_eq!(p.total_time(), 0.75);

        p.rewind();
        assert_eq!(p.total_time(), 0.0);
        assert!(!p.is_playing());
    }
}
