//! Folding a frame of detections into the shared robot pose.
//!
//! Each valid detection gives one full pose estimate. The estimates of a
//! frame are averaged component-wise and written into the [`SharedPose`] in a
//! single lock acquisition.
//!
//! The heading average is a plain arithmetic mean. Estimates that straddle
//! the ±180° seam average to the wrong side of the circle; with every marker
//! on the field mounted on a wall the robot faces, estimates in one frame are
//! never that far apart in practice.

use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, info, warn};

use super::{Detection, DetectionSource, markers::MarkerPoseResolver};
use crate::{
    field::{FieldCoordinate, SharedPose},
    math::Angle,
    peripherals::RunSignal,
};

/// Most estimates kept from one frame.
pub const MAX_FRAME_ESTIMATES: usize = 16;

/// Component-wise mean of `estimates`, `None` when empty.
pub fn mean_pose(estimates: &[FieldCoordinate]) -> Option<FieldCoordinate> {
    if estimates.is_empty() {
        return None;
    }
    let n = estimates.len() as f64;
    let (x, y, t) = estimates.iter().fold((0.0, 0.0, 0.0), |(x, y, t), e| {
        (x + e.x, y + e.y, t + e.t.as_radians())
    });
    Some(FieldCoordinate::new(x / n, y / n, Angle::from_radians(t / n)))
}

/// Resolves detections and writes their mean into the shared pose.
#[derive(Debug, Clone)]
pub struct PoseFusionEngine {
    resolver: MarkerPoseResolver,
    pose:     SharedPose,
}

impl PoseFusionEngine {
    pub fn new(resolver: MarkerPoseResolver, pose: SharedPose) -> Self { Self { resolver, pose } }

    pub fn resolver(&self) -> &MarkerPoseResolver { &self.resolver }

    /// The valid estimates of one frame, capped at [`MAX_FRAME_ESTIMATES`].
    pub fn estimates(&self, detections: &[Detection]) -> heapless::Vec<FieldCoordinate, MAX_FRAME_ESTIMATES> {
        let mut out = heapless::Vec::new();
        for estimate in detections.iter().filter_map(|d| self.resolver.resolve(d)) {
            if out.push(estimate).is_err() {
                warn!("More than {} usable tags in one frame, extra dropped", MAX_FRAME_ESTIMATES);
                break;
            }
        }
        out
    }

    /// Fuses one frame.
    ///
    /// Returns the pose that was written, or `None` (pose untouched) when the
    /// frame held no usable detection. A missing list counts as empty.
    pub fn fuse(&self, detections: Option<&[Detection]>) -> Option<FieldCoordinate> {
        let estimates = self.estimates(detections.unwrap_or(&[]));
        let fused = mean_pose(&estimates)?;
        self.pose.set_location(fused.x, fused.y, fused.t);
        debug!(
            "Marker fix from {} tag(s): ({:.2}, {:.2}, {:.1}°)",
            estimates.len(),
            fused.x,
            fused.y,
            fused.t.as_degrees()
        );
        Some(fused)
    }
}

/// A [`DetectionSource`] that fuses every frame it hands out.
///
/// # Example
///
/// ```
/// use talos::field::SharedPose;
/// use talos::vision::{Detection, DetectionSource, FtcPose};
/// use talos::vision::fusion::{FusingSource, PoseFusionEngine};
/// use talos::vision::markers::{MarkerPoseResolver, MarkerReferenceTable};
///
/// struct OneFrame(Option<Vec<Detection>>);
/// impl DetectionSource for OneFrame {
///     fn fresh_detections(&mut self) -> Option<Vec<Detection>> { self.0.take() }
/// }
///
/// let pose = SharedPose::default();
/// let engine = PoseFusionEngine::new(MarkerPoseResolver::new(MarkerReferenceTable::centerstage()), pose.clone());
/// let mut source = FusingSource::new(OneFrame(Some(vec![Detection::new(8, FtcPose::new(10.0, 0.0, 0.0))])), engine);
///
/// assert!(source.fresh_detections().is_some());
/// assert_eq!(source.fixes(), 1);
/// assert!((pose.snapshot().x - 10.0).abs() < 1e-9);
/// ```
pub struct FusingSource<S> {
    inner:  S,
    engine: PoseFusionEngine,
    fixes:  u64,
}

impl<S: DetectionSource> FusingSource<S> {
    pub fn new(inner: S, engine: PoseFusionEngine) -> Self {
        Self {
            inner,
            engine,
            fixes: 0,
        }
    }

    /// Frames that produced a pose fix so far.
    pub fn fixes(&self) -> u64 { self.fixes }

    pub fn into_inner(self) -> S { self.inner }
}

impl<S: DetectionSource> DetectionSource for FusingSource<S> {
    fn fresh_detections(&mut self) -> Option<Vec<Detection>> {
        let frame = self.inner.fresh_detections();
        if self.engine.fuse(frame.as_deref()).is_some() {
            self.fixes += 1;
        }
        frame
    }
}

/// The vision producer thread.
///
/// Polls a detection source at its own cadence and fuses every frame until
/// the run signal drops.
pub struct VisionTask<S> {
    handle: JoinHandle<FusingSource<S>>,
}

impl<S: DetectionSource + Send + 'static> VisionTask<S> {
    pub fn spawn(source: S, engine: PoseFusionEngine, signal: RunSignal, period: Duration) -> Self {
        let mut source = FusingSource::new(source, engine);
        let handle = thread::spawn(move || {
            info!("Vision task started");
            while signal.is_active() {
                source.fresh_detections();
                thread::sleep(period);
            }
            info!("Vision task stopped after {} fixes", source.fixes());
            source
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool { self.handle.is_finished() }

    /// Waits for the thread to exit and returns the source.
    ///
    /// Returns `None` if the source panicked.
    pub fn join(self) -> Option<FusingSource<S>> {
        self.handle
            .join()
            .map_err(|_| warn!("Vision task panicked"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use approx::assert_relative_eq;

    use super::*;
    use crate::vision::{FtcPose, markers::MarkerReferenceTable};

    fn engine(pose: &SharedPose) -> PoseFusionEngine {
        PoseFusionEngine::new(
            MarkerPoseResolver::new(MarkerReferenceTable::centerstage()),
            pose.clone(),
        )
    }

    #[test]
    fn mean_of_two_estimates() {
        let m = mean_pose(&[
            FieldCoordinate::origin(),
            FieldCoordinate::new(10.0, 10.0, Angle::ZERO),
        ])
        .unwrap();
        assert_eq!(m, FieldCoordinate::new(5.0, 5.0, Angle::ZERO));
        assert!(mean_pose(&[]).is_none());
    }

    #[test]
    fn no_valid_detections_leaves_pose() {
        let start = FieldCoordinate::from_degrees(12.0, 34.0, 56.0);
        let pose = SharedPose::new(start);
        let e = engine(&pose);

        assert!(e.fuse(None).is_none());
        assert!(e.fuse(Some(&[])).is_none());
        let junk = [
            Detection::without_pose(1),
            Detection::new(99, FtcPose::new(5.0, 0.0, 0.0)),
            Detection::new(2, FtcPose::new(5.0, 0.0, 45.0)),
            Detection::new(2, FtcPose::new(30.0, 0.0, f64::NAN)),
        ];
        assert!(e.fuse(Some(&junk)).is_none());
        assert_eq!(pose.snapshot(), start);
        assert_eq!(pose.corrections(), 0);
    }

    #[test]
    fn two_tags_average() {
        let pose = SharedPose::default();
        // Tags 1 and 3 are 12" apart on the backdrop; seen from a point
        // between them both give the same y.
        let frame = [
            Detection::new(1, FtcPose::new(20.0, 0.0, 0.0)),
            Detection::new(3, FtcPose::new(20.0, 0.0, 0.0)),
        ];
        let fused = engine(&pose).fuse(Some(&frame)).unwrap();
        assert_relative_eq!(fused.x, 35.25, epsilon = 1e-9);
        assert_relative_eq!(fused.y, 110.25, epsilon = 1e-9);
        assert_eq!(pose.snapshot(), fused);
        assert_eq!(pose.corrections(), 1);
    }

    #[test]
    fn oversized_frame_is_capped() {
        let pose = SharedPose::default();
        let frame = vec![Detection::new(5, FtcPose::new(10.0, 0.0, 0.0)); MAX_FRAME_ESTIMATES + 4];
        assert_eq!(engine(&pose).estimates(&frame).len(), MAX_FRAME_ESTIMATES);
    }

    struct Frames(VecDeque<Option<Vec<Detection>>>);

    impl DetectionSource for Frames {
        fn fresh_detections(&mut self) -> Option<Vec<Detection>> { self.0.pop_front().flatten() }
    }

    #[test]
    fn vision_task_fuses_until_stopped() {
        let pose = SharedPose::default();
        let signal = RunSignal::new();
        let frames = Frames(
            vec![
                None,
                Some(vec![Detection::new(10, FtcPose::new(15.0, 0.0, 0.0))]),
                Some(vec![]),
            ]
            .into(),
        );
        let task = VisionTask::spawn(frames, engine(&pose), signal.clone(), Duration::from_millis(1));
        thread::sleep(Duration::from_millis(50));
        signal.stop();
        let source = task.join().unwrap();

        assert_eq!(source.fixes(), 1);
        let p = pose.snapshot();
        assert_relative_eq!(p.x, 29.25, epsilon = 1e-9);
        assert_relative_eq!(p.y, 15.0, epsilon = 1e-9);
    }
}
