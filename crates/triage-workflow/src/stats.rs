//! 队列统计
//!
//! 从存储的即时快照计算，不缓存任何状态

use crate::store::PatientStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use triage_core::utils::wait_minutes;
use triage_core::{AcuityLevel, PatientRecord};

/// 各分诊等级的候诊人数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCounts {
    pub critical: usize,
    pub urgent: usize,
    pub semi_urgent: usize,
    pub standard: usize,
    pub non_urgent: usize,
}

impl LevelCounts {
    pub fn get(&self, level: AcuityLevel) -> usize {
        match level.value() {
            1 => self.critical,
            2 => self.urgent,
            3 => self.semi_urgent,
            4 => self.standard,
            _ => self.non_urgent,
        }
    }

    fn increment(&mut self, level: AcuityLevel) {
        let slot = match level.value() {
            1 => &mut self.critical,
            2 => &mut self.urgent,
            3 => &mut self.semi_urgent,
            4 => &mut self.standard,
            _ => &mut self.non_urgent,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        AcuityLevel::all().iter().map(|level| self.get(*level)).sum()
    }
}

/// 队列统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub total_in_queue: usize,
    pub counts_by_level: LevelCounts,
    pub average_wait_minutes: i64, // 四舍五入到整分钟，队列为空时为 0
    pub total_ever_created: usize,
}

impl QueueStats {
    /// 根据排好序的候诊队列和全部记录数计算统计
    pub fn from_queue(queued: &[PatientRecord], total_records: usize, now: DateTime<Utc>) -> Self {
        let mut counts_by_level = LevelCounts::default();
        for record in queued {
            counts_by_level.increment(record.effective_priority());
        }

        let average_wait_minutes = if queued.is_empty() {
            0
        } else {
            let total: f64 = queued
                .iter()
                .map(|record| wait_minutes(record.created_at, now))
                .sum();
            (total / queued.len() as f64).round() as i64
        };

        Self {
            total_in_queue: queued.len(),
            counts_by_level,
            average_wait_minutes,
            total_ever_created: total_records,
        }
    }

    /// 对存储当前内容计算统计
    pub fn collect(store: &PatientStore) -> Self {
        let queued = store.queued();
        Self::from_queue(&queued, store.len(), store.clock().now())
    }
}
