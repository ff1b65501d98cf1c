//! The fixed-cadence capture loop.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use chatreel_common::clock::RecordingClock;
use chatreel_common::error::{ChatreelError, ChatreelResult};
use chatreel_frame_compose::canvas::{OutputCanvas, BACKGROUND};
use chatreel_frame_compose::layout::fit_snapshot;

use crate::ports::{EncoderSession, RasterSource};

/// A progress report is emitted every this many frames.
pub(crate) const PROGRESS_EVERY: u64 = 30;

pub(crate) struct SamplerConfig {
    pub period: Duration,
    pub padding_fraction: f64,
}

/// Sample the source at a fixed cadence until the animation script
/// resolves, then capture one final frame so the settled conversation
/// always closes the clip.
///
/// Each tick runs capture, placement, composition, and encoding to
/// completion before the next tick is considered; a slow tick delays
/// the following one rather than overlapping it. Script completion is
/// only observed between ticks, never mid-frame.
pub(crate) async fn run_sampler(
    source: &mut dyn RasterSource,
    encoder: &mut dyn EncoderSession,
    canvas: &mut OutputCanvas,
    clock: &RecordingClock,
    config: &SamplerConfig,
    mut script: JoinHandle<()>,
    mut on_progress: impl FnMut(u64),
) -> ChatreelResult<u64> {
    let mut ticker = tokio::time::interval(config.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut frames: u64 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = sample_once(source, encoder, canvas, clock, config.padding_fraction).await {
                    // The reveal timer must not keep running once
                    // capture is dead.
                    script.abort();
                    if let Err(join_err) = (&mut script).await {
                        if !join_err.is_cancelled() {
                            tracing::warn!(error = %join_err, "Script task ended abnormally during teardown");
                        }
                    }
                    return Err(e);
                }
                frames += 1;
                if frames % PROGRESS_EVERY == 0 {
                    on_progress(frames);
                }
            }
            joined = &mut script => {
                if let Err(e) = joined {
                    return Err(ChatreelError::script(format!(
                        "Animation script task failed: {e}"
                    )));
                }
                break;
            }
        }
    }

    sample_once(source, encoder, canvas, clock, config.padding_fraction).await?;
    frames += 1;

    tracing::debug!(frames, "Sampling loop finished");
    Ok(frames)
}

async fn sample_once(
    source: &mut dyn RasterSource,
    encoder: &mut dyn EncoderSession,
    canvas: &mut OutputCanvas,
    clock: &RecordingClock,
    padding_fraction: f64,
) -> ChatreelResult<()> {
    let snapshot = source.capture().await?;

    // The surface grows as messages appear, so placement is recomputed
    // from the fresh snapshot every tick.
    let placement = fit_snapshot(
        snapshot.width(),
        snapshot.height(),
        canvas.width(),
        canvas.height(),
        padding_fraction,
    )?;

    canvas.fill(BACKGROUND);
    canvas.draw_snapshot(&snapshot, &placement);

    let pts_ns = clock.elapsed_ns();
    tracing::trace!(
        pts_secs = RecordingClock::ns_to_secs(pts_ns),
        "Sampled frame"
    );
    encoder.write_frame(canvas, pts_ns)
}
