//! Pairs slide images with animated videos and builds the final video.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sc_av::ArtifactStore;
use sc_core::config::{OverlayGeometry, PairingPolicy};
use sc_core::{Artifact, ArtifactKind};
use tokio_util::sync::CancellationToken;

use crate::batch::ProgressWindow;
use crate::engine::Compositor;
use crate::status::StatusTracker;

const SEGMENTS: ProgressWindow = ProgressWindow::new(75, 95);

/// Drives a [`Compositor`] over the artifacts of one job.
pub struct CompositorDriver {
    compositor: Arc<dyn Compositor>,
    store: ArtifactStore,
    geometry: OverlayGeometry,
    max_segment: Duration,
    pairing: PairingPolicy,
}

impl CompositorDriver {
    pub fn new(
        compositor: Arc<dyn Compositor>,
        store: ArtifactStore,
        geometry: OverlayGeometry,
        max_segment: Duration,
        pairing: PairingPolicy,
    ) -> Self {
        Self {
            compositor,
            store,
            geometry,
            max_segment,
            pairing,
        }
    }

    /// Overlay every `(image, video)` pair, then concatenate the segments in
    /// slide order into the final video.
    ///
    /// Pairs whose overlay fails are dropped. Fails when no segment could be
    /// made or the concatenation fails.
    pub async fn compose(
        &self,
        videos: Vec<Artifact>,
        images: Vec<Artifact>,
        status: &StatusTracker,
        cancel: &CancellationToken,
    ) -> sc_core::Result<PathBuf> {
        let pairs = pair(videos, images, self.pairing);
        let total = pairs.len();
        tracing::info!("Composing {total} segments");

        let final_video = self.store.final_video();
        if final_video.exists() {
            std::fs::remove_file(&final_video)?;
        }

        let mut segments = Vec::with_capacity(total);
        for (index, (image, video)) in pairs.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(sc_core::Error::Cancelled);
            }
            status.update(
                SEGMENTS.at(index, total),
                format!("Creating composite for slide {}/{total}", index + 1),
            );

            let output = self
                .store
                .path_for(ArtifactKind::CompositeSegment, video.slide_number);
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(sc_core::Error::Cancelled),
                r = self.compositor.overlay(
                    &image.path,
                    &video.path,
                    &self.geometry,
                    self.max_segment,
                    &output,
                ) => r,
            };

            match result {
                Ok(()) if sc_core::is_present(&output) => segments.push(output),
                Ok(()) => {
                    let e = sc_core::Error::pipeline("composition", "segment is empty");
                    tracing::warn!(slide = video.slide_number, "{e}");
                    status.slide_failed("composition", video.slide_number, &e);
                }
                Err(e) => {
                    tracing::warn!(slide = video.slide_number, "overlay failed: {e}");
                    status.slide_failed("composition", video.slide_number, &e);
                }
            }
        }

        if segments.is_empty() {
            return Err(sc_core::Error::pipeline(
                "composition",
                "no composite segments were created",
            ));
        }

        status.update(95, "Concatenating final video...");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(sc_core::Error::Cancelled),
            r = self.compositor.concat(&segments, &final_video) => r.map_err(|e| {
                sc_core::Error::pipeline("composition", format!("concatenation failed: {e}"))
            })?,
        }

        if !sc_core::is_present(&final_video) {
            return Err(sc_core::Error::pipeline(
                "composition",
                format!("final video not written: {}", final_video.display()),
            ));
        }
        tracing::info!(
            "Final video with {} segments: {}",
            segments.len(),
            final_video.display()
        );
        Ok(final_video)
    }
}

/// Match slide images with animated videos, in slide order.
///
/// Absent artifacts are dropped first. [`PairingPolicy::SlideNumber`] pairs
/// artifacts carrying the same slide number; [`PairingPolicy::Position`]
/// zips the two sorted lists, truncated to the shorter one.
pub fn pair(
    videos: Vec<Artifact>,
    images: Vec<Artifact>,
    policy: PairingPolicy,
) -> Vec<(Artifact, Artifact)> {
    let sorted = |list: Vec<Artifact>| {
        let mut list: Vec<Artifact> = list.into_iter().filter(|a| a.present).collect();
        list.sort_by_key(|a| a.slide_number);
        list
    };
    let videos = sorted(videos);
    let mut images = sorted(images);

    match policy {
        PairingPolicy::Position => images.into_iter().zip(videos).collect(),
        PairingPolicy::SlideNumber => videos
            .into_iter()
            .filter_map(|video| {
                let at = images
                    .iter()
                    .position(|img| img.slide_number == video.slide_number)?;
                Some((images.remove(at), video))
            })
            .collect(),
    }
}
