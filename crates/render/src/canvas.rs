//! Software renderer for the pick-and-place scene.

use crate::draw::{self, BLACK, BLUE, GREEN, ORANGE, RED, WHITE};
use anyhow::{Context, Result};
use glam::DVec2;
use image::RgbImage;
use physics::Vec2;
use rl::{Frame, SceneDescriptor, SceneRenderer};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Height of the HUD strip along the top edge.
const HUD_HEIGHT: f64 = 6.0;

fn dvec(v: Vec2) -> DVec2 {
    DVec2::new(v.x, v.y)
}

/// Draws scenes into RGB images and optionally writes them to disk.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    /// Width of the arm links in pixels.
    pub link_width: f64,
    pub effector_radius: f64,
    /// Score at which the score bar spans half the frame.
    pub score_scale: f64,
    output_dir: Option<PathBuf>,
    frames_written: u64,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            link_width: 5.0,
            effector_radius: 10.0,
            score_scale: 100.0,
            output_dir: None,
            frames_written: 0,
        }
    }

    /// Write every presented frame as a PNG into `dir`.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn rasterize(&self, scene: &SceneDescriptor) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.width, self.height, WHITE);

        let half = scene.destination_radius;
        draw::square_outline(&mut img, dvec(scene.destination), half, 2.0, BLACK);
        draw::fill_disc(&mut img, dvec(scene.target), scene.target_radius, BLUE);

        let base = dvec(scene.base);
        let elbow = dvec(scene.elbow);
        let tip = dvec(scene.end_effector);
        draw::thick_line(&mut img, base, elbow, self.link_width, BLACK);
        draw::thick_line(&mut img, elbow, tip, self.link_width, BLACK);
        draw::fill_disc(&mut img, tip, self.effector_radius, RED);
        if scene.held.is_some() {
            // The payload travels with the gripper.
            let r = scene.target_radius;
            draw::ring(&mut img, tip, (r - 3.0).max(0.0), r, GREEN);
        }

        self.draw_hud(&mut img, scene);
        img
    }

    /// Score bar from the centre of the top edge (green right, red left),
    /// then one orange tick per stagnation expiry below it.
    fn draw_hud(&self, img: &mut RgbImage, scene: &SceneDescriptor) {
        let mid = f64::from(self.width) / 2.0;
        let fraction = (scene.score.abs() / self.score_scale).min(1.0);
        let extent = fraction * mid;
        if scene.score >= 0.0 {
            draw::fill_rect(img, DVec2::new(mid, 0.0), DVec2::new(mid + extent, HUD_HEIGHT - 1.0), GREEN);
        } else {
            draw::fill_rect(img, DVec2::new(mid - extent, 0.0), DVec2::new(mid, HUD_HEIGHT - 1.0), RED);
        }
        for i in 0..scene.stagnation_count {
            let x = 2.0 + f64::from(i) * (HUD_HEIGHT + 2.0);
            draw::fill_rect(img, DVec2::new(x, HUD_HEIGHT + 1.0), DVec2::new(x + HUD_HEIGHT, 2.0 * HUD_HEIGHT), ORANGE);
        }
    }

    /// Save `frame` as `frame-<timestamp>-<n>.png` in the output directory.
    pub fn save(&mut self, frame: &Frame) -> Result<PathBuf> {
        let dir = self.output_dir.as_ref().context("no output directory configured")?;
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
        let path = dir.join(format!("frame-{stamp}-{:06}.png", self.frames_written));

        let img = RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
            .context("frame buffer does not match its dimensions")?;
        img.save(&path).with_context(|| format!("writing {}", path.display()))?;
        self.frames_written += 1;
        Ok(path)
    }
}

impl SceneRenderer for Canvas {
    fn draw(&mut self, scene: &SceneDescriptor) -> Frame {
        let img = self.rasterize(scene);
        Frame { width: img.width(), height: img.height(), data: img.into_raw() }
    }

    fn present(&mut self, scene: &SceneDescriptor, frame: &Frame) {
        info!(
            score = scene.score,
            state = ?scene.task_state,
            time_left = scene.time_left.unwrap_or(0.0),
            elapsed = scene.elapsed,
            expiries = scene.stagnation_count,
            "hud"
        );
        if self.output_dir.is_some() {
            if let Err(e) = self.save(frame) {
                warn!("failed to save frame: {e:#}");
            }
        }
    }
}
