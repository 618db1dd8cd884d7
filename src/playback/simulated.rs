use super::PlaybackSource;
use crate::error::Result;
use std::sync::Mutex;
use tokio::time::Instant;

/// In-process player whose clock advances with tokio time while playing.
///
/// Used by the CLI's `play` command and by tests running on a paused clock.
#[derive(Debug)]
pub struct SimulatedPlayer {
    state: Mutex<SimulatedState>,
}

#[derive(Debug)]
struct SimulatedState {
    /// Position at the last anchor point
    position: f64,
    /// Set while playing
    anchor: Option<Instant>,
    rate: f64,
}

impl SimulatedState {
    fn now(&self) -> f64 {
        match self.anchor {
            Some(anchor) => self.position + anchor.elapsed().as_secs_f64() * self.rate,
            None => self.position,
        }
    }
}

impl SimulatedPlayer {
    /// A paused player at position 0
    pub fn new() -> Self {
        Self::with_rate(1.0)
    }

    /// A paused player advancing `rate` media seconds per wall second
    pub fn with_rate(rate: f64) -> Self {
        Self {
            state: Mutex::new(SimulatedState {
                position: 0.0,
                anchor: None,
                rate: if rate.is_finite() && rate > 0.0 { rate } else { 1.0 },
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimulatedState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn pause(&self) {
        let mut state = self.lock();
        state.position = state.now();
        state.anchor = None;
    }

    pub fn is_playing(&self) -> bool {
        self.lock().anchor.is_some()
    }
}

impl Default for SimulatedPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSource for SimulatedPlayer {
    fn current_time(&self) -> Result<f64> {
        Ok(self.lock().now())
    }

    fn seek_to(&self, seconds: f64) {
        let mut state = self.lock();
        state.position = seconds.max(0.0);
        if state.anchor.is_some() {
            state.anchor = Some(Instant::now());
        }
    }

    fn play(&self) {
        let mut state = self.lock();
        if state.anchor.is_none() {
            state.anchor = Some(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_clock_advances_only_while_playing() {
        let player = SimulatedPlayer::with_rate(2.0);
        assert_eq!(player.current_time().unwrap(), 0.0);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(player.current_time().unwrap(), 0.0);

        player.play();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(player.current_time().unwrap(), 10.0);

        player.pause();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(player.current_time().unwrap(), 10.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_while_playing_restarts_from_target() {
        let player = SimulatedPlayer::new();
        player.play();
        tokio::time::advance(Duration::from_secs(3)).await;

        player.seek_to(42.0);
        assert_eq!(player.current_time().unwrap(), 42.0);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(player.current_time().unwrap(), 43.0);
        assert!(player.is_playing());
    }

    #[test]
    fn test_seek_keeps_fractional_position() {
        let player = SimulatedPlayer::new();
        player.seek_to(12.75);
        assert_eq!(player.current_time().unwrap(), 12.75);
        assert!(!player.is_playing());
    }
}
