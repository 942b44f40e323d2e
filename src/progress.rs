//! Progress reporting for long-running loops.

use log::info;

/// Receives `(fraction, running_loss)` updates from training, evaluation and upscaling.
///
/// `fraction` is in `[0, 1]` and refers to the current epoch (or pass). Calls come from
/// the coordinating thread; implementations must not block.
pub trait ProgressSink: Sync {
    fn report(&self, fraction: f32, loss: f32);
}

/// Discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    #[inline]
    fn report(&self, _fraction: f32, _loss: f32) {}
}

/// Logs every update at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, fraction: f32, loss: f32) {
        info!("{:>3}% loss={loss:.6}", (fraction * 100.0) as u32);
    }
}

impl<F> ProgressSink for F
where
    F: Fn(f32, f32) + Sync,
{
    #[inline]
    fn report(&self, fraction: f32, loss: f32) {
        self(fraction, loss)
    }
}
