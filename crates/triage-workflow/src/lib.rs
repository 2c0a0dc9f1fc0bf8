//! # 分诊工作流模块
//!
//! 提供急诊分诊队列的完整管理功能，包括：
//! - 分诊分级：根据临床指标自动计算初始分诊等级
//! - 患者记录存储：以内存为权威数据源的患者记录集合
//! - 优先级队列视图：按有效优先级和到达时间实时排序的候诊队列
//! - 状态机与引擎：优先级覆盖、医生分配和生命周期转换
//! - 统计聚合：按等级计数与平均候诊时长

pub mod classifier;
pub mod engine;
pub mod queue;
pub mod state_machine;
pub mod stats;
pub mod store;

// 重新导出主要类型
pub use classifier::{classify, AcuityClassifier, Criterion, RuleBasedClassifier, TriageTier};
pub use engine::TriageEngine;
pub use queue::{is_priority_ordered, priority_order};
pub use state_machine::{LifecycleEvent, LifecycleStateMachine};
pub use stats::{LevelCounts, QueueStats};
pub use store::PatientStore;
