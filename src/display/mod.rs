pub mod engine;
pub mod facade;
pub mod layout;
pub mod render;
pub mod scheduler;

pub use engine::{DisplayView, EngineEvent, PollBatch, RotationEngine};
pub use facade::{poll_all, HttpSource, SignageSource};
pub use scheduler::{Scheduler, TimerKind};
