//! Scene descriptor and the renderer seam.
//!
//! The environment never draws. It hands a [`SceneDescriptor`] to whatever
//! [`SceneRenderer`] it was built with and passes the resulting [`Frame`] on.

use crate::error::EnvError;
use crate::task::TaskState;
use physics::{ArmPose, Vec2};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Everything a renderer or learner needs to know about the current step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    pub arm_pose: ArmPose,
    pub base: Vec2,
    pub elbow: Vec2,
    pub end_effector: Vec2,
    pub target: Vec2,
    pub destination: Vec2,
    /// Payload carried by the gripper, if any.
    pub held: Option<Vec2>,
    pub score: f64,
    pub task_state: TaskState,
    pub stagnation_count: u32,
    /// Seconds before the stagnation timer expires; `None` while stopped.
    pub time_left: Option<f64>,
    /// Seconds since the episode started.
    pub elapsed: f64,
    /// Contact radii, for drawing the objects at their true size.
    pub target_radius: f64,
    pub destination_radius: f64,
}

impl SceneDescriptor {
    /// Length of [`SceneDescriptor::features`].
    pub const FEATURES: usize = 12;

    /// Flat feature vector for learners:
    /// `[angle1, angle2, tip.x, tip.y, target.x, target.y, dest.x, dest.y,
    /// picked, placed, stagnation_count, time_left]`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn features(&self) -> Vec<f32> {
        let (picked, placed) = self.task_state.flags();
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let pose: [f64; 2] = bytemuck::cast(self.arm_pose);
        let points = [self.end_effector, self.target, self.destination];
        let mut features: Vec<f32> = pose
            .iter()
            .chain(bytemuck::cast_slice::<Vec2, f64>(&points))
            .map(|&v| v as f32)
            .collect();
        features.extend([
            flag(picked),
            flag(placed),
            self.stagnation_count as f32,
            self.time_left.unwrap_or(0.0) as f32,
        ]);
        features
    }
}

/// Row-major RGB pixels, `height × width × 3`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    /// All-black frame.
    #[must_use]
    pub fn blank(width: u32, height: u32) -> Self {
        Self { width, height, data: vec![0; width as usize * height as usize * 3] }
    }

    /// `[height, width, 3]`.
    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        [self.height as usize, self.width as usize, 3]
    }

    /// Colour at `(x, y)`, or `None` outside the frame.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }
}

/// Anything that can turn a scene into pixels.
pub trait SceneRenderer: Send {
    fn draw(&mut self, scene: &SceneDescriptor) -> Frame;

    /// Show a frame to a human. The default does nothing.
    fn present(&mut self, _scene: &SceneDescriptor, _frame: &Frame) {}
}

/// Renderer that produces blank frames of a fixed size. Used when no real
/// renderer is attached.
#[derive(Clone, Debug)]
pub struct NullRenderer {
    width: u32,
    height: u32,
}

impl NullRenderer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl SceneRenderer for NullRenderer {
    fn draw(&mut self, _scene: &SceneDescriptor) -> Frame {
        Frame::blank(self.width, self.height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Present to a human; nothing is returned.
    Human,
    /// Return the pixel buffer.
    RgbArray,
}

impl FromStr for RenderMode {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(RenderMode::Human),
            "rgb_array" => Ok(RenderMode::RgbArray),
            other => Err(EnvError::UnsupportedRenderMode(other.to_owned())),
        }
    }
}

/// Observation handed to the driver.
#[derive(Clone, Debug, PartialEq)]
pub enum Observation {
    Scene(SceneDescriptor),
    Pixels(Frame),
}

impl Observation {
    #[must_use]
    pub fn as_scene(&self) -> Option<&SceneDescriptor> {
        match self {
            Observation::Scene(scene) => Some(scene),
            Observation::Pixels(_) => None,
        }
    }

    /// Flat `f32` view: scene features, or pixels scaled to `[0, 1]`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f32> {
        match self {
            Observation::Scene(scene) => scene.features(),
            Observation::Pixels(frame) => frame.data.iter().map(|&b| f32::from(b) / 255.0).collect(),
        }
    }
}
