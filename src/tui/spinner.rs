//! Progress spinner with its own tick chain, independent of the animation clock.

use super::constants::SPINNER_FRAMES;

/// Each restart starts a new run; ticks carrying an older run id are stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spinner {
    frame: usize,
    run: u64,
}

impl Spinner {
    /// Start a fresh run from the first frame and return its id.
    pub fn restart(&mut self) -> u64 {
        self.run = self.run.wrapping_add(1);
        self.frame = 0;
        self.run
    }

    /// Advance one frame if `run` is current. Returns whether it advanced.
    pub fn tick(&mut self, run: u64) -> bool {
        if run != self.run {
            return false;
        }
        self.frame = (self.frame + 1) % SPINNER_FRAMES.len();
        true
    }

    pub fn glyph(&self) -> &'static str {
        SPINNER_FRAMES[self.frame]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_runs_do_not_advance() {
        let mut spinner = Spinner::default();
        let first = spinner.restart();
        assert!(spinner.tick(first));
        let second = spinner.restart();
        assert!(!spinner.tick(first));
        assert_eq!(spinner.glyph(), SPINNER_FRAMES[0]);
        assert!(spinner.tick(second));
        assert_eq!(spinner.glyph(), SPINNER_FRAMES[1]);
    }

    #[test]
    fn frames_wrap_around() {
        let mut spinner = Spinner::default();
        let run = spinner.restart();
        for _ in 0..SPINNER_FRAMES.len() {
            spinner.tick(run);
        }
        assert_eq!(spinner.glyph(), SPINNER_FRAMES[0]);
    }
}
