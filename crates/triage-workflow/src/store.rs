//! 患者记录存储
//!
//! 内存中的权威患者记录集合。存储本身不加锁也不校验状态转换，
//! 由 [`TriageEngine`](crate::engine::TriageEngine) 持有并串行化所有写操作。

use crate::queue;
use std::collections::HashMap;
use std::sync::Arc;
use triage_core::utils::{generate_patient_id, Clock, SystemClock};
use triage_core::{
    AcuityLevel, LifecycleStatus, PatientIntake, PatientRecord, PriorityOverride,
};
use uuid::Uuid;

/// 患者记录存储
#[derive(Debug)]
pub struct PatientStore {
    records: HashMap<Uuid, PatientRecord>,
    order: Vec<Uuid>, // 插入顺序
    clock: Arc<dyn Clock + Send + Sync>,
}

impl PatientStore {
    /// 使用系统时钟创建空存储
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
            clock,
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    /// 创建患者记录，分配标识符和创建时间，初始状态为候诊
    pub fn create(&mut self, intake: PatientIntake, base_level: AcuityLevel) -> PatientRecord {
        let mut attributes = intake.attributes;
        attributes.nrs_pain = Some(attributes.pain_score());

        let record = PatientRecord {
            id: generate_patient_id(),
            name: intake.name,
            clinical_attributes: attributes,
            created_at: self.clock.now(),
            lifecycle_status: LifecycleStatus::Waiting,
            base_acuity_level: base_level,
            priority_override: None,
            assigned_doctor_id: None,
        };

        self.order.push(record.id);
        self.records.insert(record.id, record.clone());
        record
    }

    /// 获取患者记录
    pub fn get(&self, id: Uuid) -> Option<&PatientRecord> {
        self.records.get(&id)
    }

    /// 按插入顺序遍历所有记录
    pub fn iter(&self) -> impl Iterator<Item = &PatientRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// 所有记录，不区分状态
    pub fn list_all(&self) -> Vec<PatientRecord> {
        self.iter().cloned().collect()
    }

    /// 候诊队列视图
    pub fn queued(&self) -> Vec<PatientRecord> {
        queue::priority_order(self.iter())
    }

    /// 直接设置生命周期状态，不校验转换
    pub fn set_status(&mut self, id: Uuid, status: LifecycleStatus) -> Option<PatientRecord> {
        let record = self.records.get_mut(&id)?;
        record.lifecycle_status = status;
        Some(record.clone())
    }

    /// 删除记录，记录存在并被删除时返回 true
    pub fn remove(&mut self, id: Uuid) -> bool {
        if self.records.remove(&id).is_some() {
            self.order.retain(|&existing| existing != id);
            true
        } else {
            false
        }
    }

    /// 分配医生并同时进入治疗中状态
    pub fn assign(&mut self, id: Uuid, doctor_id: String) -> Option<PatientRecord> {
        let record = self.records.get_mut(&id)?;
        record.assigned_doctor_id = Some(doctor_id);
        record.lifecycle_status = LifecycleStatus::InTreatment;
        Some(record.clone())
    }

    /// 覆盖分诊等级，后写覆盖先写，不改变生命周期状态
    pub fn override_level(
        &mut self,
        id: Uuid,
        level: AcuityLevel,
        actor_id: String,
    ) -> Option<PatientRecord> {
        let record = self.records.get_mut(&id)?;
        record.priority_override = Some(PriorityOverride {
            level,
            overridden_by: actor_id,
        });
        Some(record.clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for PatientStore {
    fn default() -> Self {
        Self::new()
    }
}
