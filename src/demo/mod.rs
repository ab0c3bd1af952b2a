//! Scripted pick-and-place control loop.
//!
//! Sequences perception, inverse kinematics and gripper actions over
//! black-box collaborators. Calibration, detection, pose estimation and IK
//! live behind the traits; this module only provides the glue.

pub mod instruction;

use std::time::Duration;

use anyhow::Result;
use image::DynamicImage;
use tracing::{info, warn};

use crate::models::{BoundingBox, Detection};

pub use instruction::{Command, Instruction, Target};

/// End-effector pose: x, y, z, roll, pitch, yaw.
pub type Pose = [f64; 6];

/// Joint-space configuration for one limb.
pub type JointConfig = Vec<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arm {
    Left,
    Right,
}

/// Robot arm and gripper, IK included.
pub trait Robot {
    /// Solve IK with whichever limb reaches the pose.
    fn ik_either_limb(&mut self, pose: &Pose) -> Result<(Arm, JointConfig)>;
    fn inverse_kinematics(&mut self, arm: Arm, pose: &Pose) -> Result<JointConfig>;
    fn move_to(&mut self, config: &JointConfig) -> Result<()>;
    fn move_to_neutral(&mut self, arm: Arm) -> Result<()>;
    /// Close the gripper; returns whether an object was caught.
    fn grasp(&mut self, arm: Arm) -> Result<bool>;
    fn release(&mut self, arm: Arm) -> Result<()>;
    fn is_gripping(&self, arm: Arm) -> bool;
}

/// Frame capture and position estimation.
pub trait Camera {
    fn capture(&mut self) -> Result<DynamicImage>;
    /// Estimate the position of the user's hand, if visible.
    fn estimate_hand_position(&mut self) -> Result<Option<Pose>>;
    /// Estimate an object's position from its bounding box in a frame.
    fn estimate_object_position(
        &mut self,
        frame: &DynamicImage,
        bbox: &BoundingBox,
    ) -> Result<Option<Pose>>;
}

/// Object detector collaborator.
pub trait ObjectDetector {
    /// Detect the given object id with at least the given score, if present.
    fn detect(
        &mut self,
        frame: &DynamicImage,
        object_id: &str,
        threshold: f32,
    ) -> Result<Option<Detection>>;
}

/// Source of text instructions, e.g. a messaging client or a script.
pub trait InstructionSource {
    /// Block until the next command arrives.
    fn next_command(&mut self) -> Result<Command>;
}

/// Control loop configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Safety offset added when approaching a pose (x, y, z, r, p, y).
    pub approach_offset: Pose,
    /// Fixed drop pose used when placing on the table.
    pub drop_pose: Pose,
    /// Detection score threshold.
    pub detection_threshold: f32,
    /// Attempts at locating a hand / waiting for a handover before aborting.
    pub max_wait_attempts: usize,
    /// Attempts at grasping before aborting the task.
    pub max_grasp_attempts: usize,
    /// Delay between polling attempts.
    pub retry_delay: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            approach_offset: [0.0, 0.0, 0.1, 0.0, 0.0, 0.0],
            drop_pose: [0.5, 0.2, 0.3, 0.0, 0.0, 0.0],
            detection_threshold: 0.8,
            max_wait_attempts: 10,
            max_grasp_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

enum TaskOutcome {
    Done,
    Aborted(String),
}

/// The scripted pick-and-place demonstration.
pub struct PickAndPlace<R, C, D, I> {
    robot: R,
    camera: C,
    detector: D,
    instructions: I,
    config: DemoConfig,
}

impl<R, C, D, I> PickAndPlace<R, C, D, I>
where
    R: Robot,
    C: Camera,
    D: ObjectDetector,
    I: InstructionSource,
{
    pub fn new(robot: R, camera: C, detector: D, instructions: I, config: DemoConfig) -> Self {
        Self { robot, camera, detector, instructions, config }
    }

    /// Run the demonstration until an exit instruction arrives.
    ///
    /// A task that cannot be completed (nothing found, IK failure, grasp
    /// attempts exhausted) is aborted with a warning and the loop moves on to
    /// the next instruction.
    pub fn perform(&mut self) -> Result<()> {
        info!("starting pick and place demonstration");
        loop {
            let instr = match self.instructions.next_command()? {
                Command::Exit => break,
                Command::Task(instr) => instr,
            };
            info!(
                object = %instr.object,
                target = ?instr.target,
                "instructed to pick and place"
            );
            match self.run_task(&instr)? {
                TaskOutcome::Done => info!("finished the task"),
                TaskOutcome::Aborted(reason) => {
                    warn!(reason = %reason, "aborting this task, please start over");
                }
            }
        }
        info!("exiting pick and place demonstration");
        Ok(())
    }

    fn run_task(&mut self, instr: &Instruction) -> Result<TaskOutcome> {
        info!(object = %instr.object, "looking for the object");
        let Some(obj_pose) = self.locate_object(instr)? else {
            return Ok(TaskOutcome::Aborted(format!("did not find the {}", instr.object)));
        };

        let appr_pose = self.approach_pose(&obj_pose);
        let Ok((arm, appr_cfg)) = self.robot.ik_either_limb(&appr_pose) else {
            return Ok(TaskOutcome::Aborted("no limb reaches the approach pose".into()));
        };

        info!(?arm, "attempting to grasp the object");
        let mut grasped = false;
        for _ in 0..self.config.max_grasp_attempts {
            self.robot.move_to(&appr_cfg)?;
            if self.robot.grasp(arm)? {
                grasped = true;
                break;
            }
            info!("grasp failed, trying again");
            self.robot.release(arm)?;
        }
        if !grasped {
            self.robot.release(arm)?;
            return Ok(TaskOutcome::Aborted("grasp attempts exhausted".into()));
        }

        info!("placing the object");
        let outcome = match instr.target {
            Target::Table => self.place_on_table(arm)?,
            Target::Hand => self.hand_over(arm)?,
        };
        if let TaskOutcome::Aborted(_) = outcome {
            self.robot.release(arm)?;
            self.robot.move_to_neutral(arm)?;
            return Ok(outcome);
        }

        self.robot.move_to_neutral(arm)?;
        Ok(TaskOutcome::Done)
    }

    fn locate_object(&mut self, instr: &Instruction) -> Result<Option<Pose>> {
        if instr.takes_from_hand() {
            return self.wait_for_hand();
        }
        let frame = self.camera.capture()?;
        let Some(detection) =
            self.detector.detect(&frame, &instr.object, self.config.detection_threshold)?
        else {
            return Ok(None);
        };
        self.camera.estimate_object_position(&frame, &detection.bbox)
    }

    fn wait_for_hand(&mut self) -> Result<Option<Pose>> {
        for attempt in 0..self.config.max_wait_attempts {
            if let Some(pose) = self.camera.estimate_hand_position()? {
                return Ok(Some(pose));
            }
            warn!(attempt, "no hand position estimate, please relocate your hand");
            std::thread::sleep(self.config.retry_delay);
        }
        Ok(None)
    }

    fn place_on_table(&mut self, arm: Arm) -> Result<TaskOutcome> {
        info!("looking for a spot to put the object down");
        let drop_pose = self.config.drop_pose;
        let appr_pose = self.approach_pose(&drop_pose);
        let Ok(appr_cfg) = self.robot.inverse_kinematics(arm, &appr_pose) else {
            return Ok(TaskOutcome::Aborted("approach pose above the drop spot is unreachable".into()));
        };
        self.robot.move_to(&appr_cfg)?;
        let Ok(tgt_cfg) = self.robot.inverse_kinematics(arm, &drop_pose) else {
            return Ok(TaskOutcome::Aborted("drop pose is unreachable".into()));
        };
        self.robot.move_to(&tgt_cfg)?;
        self.robot.release(arm)?;
        self.robot.move_to(&appr_cfg)?;
        Ok(TaskOutcome::Done)
    }

    fn hand_over(&mut self, arm: Arm) -> Result<TaskOutcome> {
        let Some(tgt_pose) = self.wait_for_hand()? else {
            return Ok(TaskOutcome::Aborted("no hand to give the object to".into()));
        };
        let Ok(tgt_cfg) = self.robot.inverse_kinematics(arm, &tgt_pose) else {
            return Ok(TaskOutcome::Aborted("handover pose is unreachable".into()));
        };
        self.robot.move_to(&tgt_cfg)?;
        info!("please take the object from me");
        for _ in 0..self.config.max_wait_attempts {
            if !self.robot.is_gripping(arm) {
                break;
            }
            std::thread::sleep(self.config.retry_delay);
        }
        self.robot.release(arm)?;
        Ok(TaskOutcome::Done)
    }

    fn approach_pose(&self, pose: &Pose) -> Pose {
        let mut approach = *pose;
        for (a, offset) in approach.iter_mut().zip(self.config.approach_offset) {
            *a += offset;
        }
        approach
    }
}
