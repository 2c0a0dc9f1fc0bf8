//! # Triage
//!
//! 急诊分诊优先级队列与优先级覆盖引擎，汇总各子模块的公共接口。

pub use triage_core::{AcuityLevel, LifecycleStatus, PatientIntake, PatientRecord, TriageError};
pub use triage_workflow::{QueueStats, TriageEngine};
