//! 患者生命周期状态机
//!
//! 管理候诊患者从分配到治疗结束的状态转换

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use triage_core::{LifecycleStatus, Result, TriageError};

/// 生命周期转换事件
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Assign,   // 分配医生
    Complete, // 治疗结束
}

/// 患者生命周期状态机
///
/// 不存在回到 `Waiting` 的转换；删除记录不经过状态机。
#[derive(Debug)]
pub struct LifecycleStateMachine {
    transitions: HashMap<(LifecycleStatus, LifecycleEvent), LifecycleStatus>,
}

impl LifecycleStateMachine {
    /// 创建新的状态机实例
    pub fn new() -> Self {
        let mut transitions = HashMap::new();

        // 定义状态转换规则
        transitions.insert((LifecycleStatus::Waiting, LifecycleEvent::Assign), LifecycleStatus::InTreatment);
        // 重新分配，覆盖原医生
        transitions.insert((LifecycleStatus::InTreatment, LifecycleEvent::Assign), LifecycleStatus::InTreatment);
        // 已完成的患者可再次分配，重新进入治疗
        transitions.insert((LifecycleStatus::Completed, LifecycleEvent::Assign), LifecycleStatus::InTreatment);
        transitions.insert((LifecycleStatus::Waiting, LifecycleEvent::Complete), LifecycleStatus::Completed);
        transitions.insert((LifecycleStatus::InTreatment, LifecycleEvent::Complete), LifecycleStatus::Completed);

        Self { transitions }
    }

    /// 检查状态转换是否有效
    pub fn can_transition(&self, from: LifecycleStatus, event: LifecycleEvent) -> bool {
        self.transitions.contains_key(&(from, event))
    }

    /// 执行状态转换
    pub fn transition(&self, from: LifecycleStatus, event: LifecycleEvent) -> Result<LifecycleStatus> {
        self.transitions.get(&(from, event)).copied().ok_or_else(|| {
            TriageError::InvalidArgument(format!(
                "Invalid lifecycle transition: {:?} from {}",
                event, from
            ))
        })
    }

    /// 将目标状态映射为触发事件
    ///
    /// `InTreatment` 只能通过分配医生进入，`Waiting` 不可重新进入。
    pub fn event_for_target(target: LifecycleStatus) -> Result<LifecycleEvent> {
        match target {
            LifecycleStatus::Completed => Ok(LifecycleEvent::Complete),
            LifecycleStatus::InTreatment => Err(TriageError::InvalidArgument(
                "in_treatment requires a doctor assignment".to_string(),
            )),
            LifecycleStatus::Waiting => Err(TriageError::InvalidArgument(
                "a patient cannot re-enter the waiting queue".to_string(),
            )),
        }
    }

    /// 获取状态的所有可能事件
    pub fn possible_events(&self, current: LifecycleStatus) -> Vec<LifecycleEvent> {
        let mut events: Vec<LifecycleEvent> = self
            .transitions
            .keys()
            .filter(|(state, _)| *state == current)
            .map(|(_, event)| *event)
            .collect();
        events.sort_by_key(|event| *event as u8);
        events
    }
}

impl Default for LifecycleStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
