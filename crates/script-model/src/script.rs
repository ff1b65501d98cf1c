//! The reference animation script: timed message reveal.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::playback::Playback;

/// Delays used when replaying a conversation.
#[derive(Debug, Clone, Copy)]
pub struct ReplayTiming {
    /// Hold on the empty chat before the first message appears.
    pub initial_delay: Duration,

    /// Gap between consecutive messages.
    pub message_interval: Duration,

    /// Hold after the last message so the clip does not cut abruptly.
    pub final_hold: Duration,
}

impl Default for ReplayTiming {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1000),
            message_interval: Duration::from_millis(1500),
            final_hold: Duration::from_millis(2000),
        }
    }
}

impl ReplayTiming {
    /// Total run time of a `message_count`-message replay.
    pub fn total_duration(&self, message_count: usize) -> Duration {
        self.initial_delay + self.message_interval * message_count as u32 + self.final_hold
    }
}

/// Build the future that reveals `message_count` messages one by one.
///
/// The future resets playback, waits the initial delay, reveals a
/// message per interval, then holds. It resolves when the clip should
/// end; the export loop keeps sampling the surface until that moment.
pub fn replay_script(
    message_count: usize,
    playback: Playback,
    timing: ReplayTiming,
) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async move {
        playback.reset();
        tokio::time::sleep(timing.initial_delay).await;

        for revealed in 1..=message_count {
            playback.reveal_next();
            tracing::debug!(revealed, message_count, "Revealed message");
            tokio::time::sleep(timing.message_interval).await;
        }

        tokio::time::sleep(timing.final_hold).await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_messages_reveal_on_schedule() {
        let playback = Playback::new();
        let handle = tokio::spawn(replay_script(
            3,
            playback.clone(),
            ReplayTiming::default(),
        ));

        // Reveals land at 1000ms, 2500ms, 4000ms; sample between them.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(playback.shown(), 0);

        tokio::time::sleep(Duration::from_millis(700)).await; // t = 1200
        assert_eq!(playback.shown(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await; // t = 2700
        assert_eq!(playback.shown(), 2);

        tokio::time::sleep(Duration::from_millis(1500)).await; // t = 4200
        assert_eq!(playback.shown(), 3);

        handle.await.unwrap();
        assert_eq!(playback.shown(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_resets_previous_state() {
        let playback = Playback::new();
        playback.reveal_all(7);

        let handle = tokio::spawn(replay_script(
            1,
            playback.clone(),
            ReplayTiming::default(),
        ));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(playback.shown(), 0);

        handle.await.unwrap();
        assert_eq!(playback.shown(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_duration_matches_timing() {
        let timing = ReplayTiming::default();
        let playback = Playback::new();

        let start = tokio::time::Instant::now();
        replay_script(2, playback, timing).await;

        assert_eq!(start.elapsed(), timing.total_duration(2));
        assert_eq!(timing.total_duration(2), Duration::from_millis(6000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_conversation_just_holds() {
        let playback = Playback::new();
        replay_script(0, playback.clone(), ReplayTiming::default()).await;
        assert_eq!(playback.shown(), 0);
    }
}
