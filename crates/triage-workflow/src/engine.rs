//! 分诊引擎
//!
//! 协调分级器、患者存储、状态机和统计的核心引擎

use crate::{
    classifier::{AcuityClassifier, RuleBasedClassifier},
    state_machine::{LifecycleEvent, LifecycleStateMachine},
    stats::QueueStats,
    store::PatientStore,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use triage_core::utils::{Clock, SystemClock};
use triage_core::{
    AcuityLevel, LifecycleStatus, PatientIntake, PatientRecord, Result, TriageError,
};
use uuid::Uuid;

/// 分诊引擎
///
/// 存储由一把读写锁保护：所有写操作互斥，读操作取得一致的快照。
/// 克隆引擎得到的是同一个存储的句柄。
#[derive(Debug, Clone)]
pub struct TriageEngine {
    classifier: Arc<dyn AcuityClassifier + Send + Sync>,
    store: Arc<RwLock<PatientStore>>,
    state_machine: Arc<LifecycleStateMachine>,
}

impl TriageEngine {
    /// 使用默认规则和系统时钟创建引擎
    pub fn new() -> Self {
        Self::with_parts(Arc::new(RuleBasedClassifier::new()), Arc::new(SystemClock))
    }

    /// 使用指定分级器和时钟创建引擎
    pub fn with_parts(
        classifier: Arc<dyn AcuityClassifier + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            classifier,
            store: Arc::new(RwLock::new(PatientStore::with_clock(clock))),
            state_machine: Arc::new(LifecycleStateMachine::new()),
        }
    }

    /// 分诊录入：计算初始等级并加入候诊队列
    pub async fn intake(&self, intake: PatientIntake) -> PatientRecord {
        // 分级是纯函数，在锁外执行
        let level = self.classifier.classify(&intake.attributes);

        let record = self.store.write().await.create(intake, level);
        tracing::info!("Created patient {} with acuity level {}", record.id, level);
        record
    }

    /// 获取患者记录
    pub async fn get(&self, id: Uuid) -> Option<PatientRecord> {
        self.store.read().await.get(id).cloned()
    }

    /// 所有患者记录
    pub async fn list_all(&self) -> Vec<PatientRecord> {
        self.store.read().await.list_all()
    }

    /// 按优先级排序的候诊队列
    pub async fn queued(&self) -> Vec<PatientRecord> {
        let queued = self.store.read().await.queued();
        tracing::debug!("Queue read with {} waiting patients", queued.len());
        queued
    }

    /// 更新生命周期状态
    ///
    /// 只接受经状态机允许的目标状态；进入治疗中必须通过 [`assign`](Self::assign)。
    pub async fn update_status(&self, id: Uuid, status: LifecycleStatus) -> Result<PatientRecord> {
        let event = LifecycleStateMachine::event_for_target(status)?;

        let mut store = self.store.write().await;
        let current = store
            .get(id)
            .map(|record| record.lifecycle_status)
            .ok_or_else(|| TriageError::patient_not_found(id))?;

        let next = self.state_machine.transition(current, event).map_err(|e| {
            tracing::warn!("Rejected status update for patient {}: {}", id, e);
            e
        })?;

        let record = store
            .set_status(id, next)
            .ok_or_else(|| TriageError::patient_not_found(id))?;

        tracing::info!("Updated patient {} status from {} to {}", id, current, next);
        Ok(record)
    }

    /// 分配医生，患者离开候诊队列
    ///
    /// 对任何存在的记录都会成功，覆盖原有的分配；已完成的患者重新进入治疗中。
    pub async fn assign(&self, id: Uuid, doctor_id: &str) -> Result<PatientRecord> {
        let doctor_id = require_identifier(doctor_id, "doctor id")?;

        let mut store = self.store.write().await;
        let current = store
            .get(id)
            .map(|record| record.lifecycle_status)
            .ok_or_else(|| TriageError::patient_not_found(id))?;

        self.state_machine
            .transition(current, LifecycleEvent::Assign)
            .map_err(|e| {
                tracing::warn!("Rejected assignment of patient {}: {}", id, e);
                e
            })?;

        let record = store
            .assign(id, doctor_id)
            .ok_or_else(|| TriageError::patient_not_found(id))?;

        tracing::info!(
            "Assigned patient {} to doctor {}",
            id,
            record.assigned_doctor_id.as_deref().unwrap_or_default()
        );
        Ok(record)
    }

    /// 人工覆盖分诊等级
    ///
    /// 等级超出 [1,5] 时返回 `InvalidArgument`，不做截断。
    pub async fn override_priority(&self, id: Uuid, level: u8, actor_id: &str) -> Result<PatientRecord> {
        let (level, actor_id) = Self::validate_override(level, actor_id)?;

        let record = self
            .store
            .write()
            .await
            .override_level(id, level, actor_id)
            .ok_or_else(|| TriageError::patient_not_found(id))?;

        tracing::info!(
            "Overrode patient {} acuity level {} -> {} by {}",
            id,
            record.base_acuity_level,
            level,
            record.overridden_by().unwrap_or_default()
        );
        Ok(record)
    }

    /// 校验覆盖参数：先校验等级，再校验操作人
    pub fn validate_override(level: u8, actor_id: &str) -> Result<(AcuityLevel, String)> {
        let level = AcuityLevel::new(level)?;
        let actor_id = require_identifier(actor_id, "actor id")?;
        Ok((level, actor_id))
    }

    /// 删除患者记录，不论当前状态
    ///
    /// 记录不存在时返回 false 而不是错误：并发操作下"已被处理"是正常情况。
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.store.write().await.remove(id);
        if removed {
            tracing::info!("Removed patient {}", id);
        } else {
            tracing::debug!("Patient {} already removed", id);
        }
        removed
    }

    /// 当前有治疗中患者的医生
    pub async fn busy_doctors(&self) -> BTreeSet<String> {
        self.store
            .read()
            .await
            .iter()
            .filter(|record| record.lifecycle_status == LifecycleStatus::InTreatment)
            .filter_map(|record| record.assigned_doctor_id.clone())
            .collect()
    }

    /// 队列统计
    pub async fn stats(&self) -> QueueStats {
        let stats = QueueStats::collect(&*self.store.read().await);
        tracing::debug!("Computed queue stats: {:?}", stats);
        stats
    }
}

impl Default for TriageEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 校验医生/操作人标识非空，原样返回
fn require_identifier(value: &str, what: &str) -> Result<String> {
    if value.trim().is_empty() {
        Err(TriageError::InvalidArgument(format!("{} is required", what)))
    } else {
        Ok(value.to_string())
    }
}
