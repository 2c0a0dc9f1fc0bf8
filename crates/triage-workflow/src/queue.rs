//! 优先级队列视图
//!
//! 每次读取时从记录集合重新计算，不单独维护堆结构，因此不会与存储不一致。

use std::cmp::Ordering;
use triage_core::PatientRecord;

/// 队列排序规则：有效优先级升序，其次按到达时间升序
pub fn compare_priority(a: &PatientRecord, b: &PatientRecord) -> Ordering {
    match a.effective_priority().cmp(&b.effective_priority()) {
        Ordering::Equal => a.created_at.cmp(&b.created_at),
        other => other,
    }
}

/// 过滤出候诊患者并按优先级排序
///
/// 排序是稳定的：两个键都相同时保留输入顺序。
pub fn priority_order<'a, I>(records: I) -> Vec<PatientRecord>
where
    I: IntoIterator<Item = &'a PatientRecord>,
{
    let mut queued: Vec<PatientRecord> = records
        .into_iter()
        .filter(|record| record.is_waiting())
        .cloned()
        .collect();

    queued.sort_by(compare_priority);
    queued
}

/// 检查相邻记录是否满足队列排序规则
pub fn is_priority_ordered(records: &[PatientRecord]) -> bool {
    records
        .windows(2)
        .all(|pair| compare_priority(&pair[0], &pair[1]) != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use triage_core::{
        AcuityLevel, ArrivalMode, ClinicalAttributes, LifecycleStatus, MentalStatus,
        PriorityOverride, Sex,
    };
    use uuid::Uuid;

    fn record(name: &str, level: AcuityLevel, minute: i64) -> PatientRecord {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        PatientRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            clinical_attributes: ClinicalAttributes {
                age: 50,
                sex: Sex::Female,
                arrival_mode: ArrivalMode::Walking,
                injury: false,
                mental: MentalStatus::Alert,
                pain: false,
                nrs_pain: None,
                sbp: 120,
                dbp: 80,
                hr: 70,
                rr: 14,
                bt: 36.6,
                saturation: 99,
                diagnosis: String::new(),
            },
            created_at: start + Duration::minutes(minute),
            lifecycle_status: LifecycleStatus::Waiting,
            base_acuity_level: level,
            priority_override: None,
            assigned_doctor_id: None,
        }
    }

    fn names(records: &[PatientRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_orders_by_level_then_arrival() {
        let records = vec![
            record("c", AcuityLevel::SEMI_URGENT, 0),
            record("b", AcuityLevel::CRITICAL, 5),
            record("a", AcuityLevel::CRITICAL, 1),
            record("d", AcuityLevel::NON_URGENT, 2),
        ];

        let queued = priority_order(&records);
        assert_eq!(names(&queued), vec!["a", "b", "c", "d"]);
        assert!(is_priority_ordered(&queued));
    }

    #[test]
    fn test_excludes_non_waiting() {
        let mut treated = record("treated", AcuityLevel::CRITICAL, 0);
        treated.lifecycle_status = LifecycleStatus::InTreatment;
        treated.assigned_doctor_id = Some("dr-a".to_string());
        let mut done = record("done", AcuityLevel::CRITICAL, 0);
        done.lifecycle_status = LifecycleStatus::Completed;
        let records = vec![treated, done, record("waiting", AcuityLevel::STANDARD, 3)];

        assert_eq!(names(&priority_order(&records)), vec!["waiting"]);
    }

    #[test]
    fn test_override_uses_effective_priority() {
        let mut bumped = record("bumped", AcuityLevel::SEMI_URGENT, 10);
        bumped.priority_override = Some(PriorityOverride {
            level: AcuityLevel::CRITICAL,
            overridden_by: "dr-x".to_string(),
        });
        let records = vec![
            record("urgent", AcuityLevel::URGENT, 0),
            bumped,
            record("early-critical", AcuityLevel::CRITICAL, 5),
        ];

        let queued = priority_order(&records);
        assert_eq!(names(&queued), vec!["early-critical", "bumped", "urgent"]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let records = vec![
            record("first", AcuityLevel::URGENT, 0),
            record("second", AcuityLevel::URGENT, 0),
            record("third", AcuityLevel::URGENT, 0),
        ];
        assert_eq!(
            names(&priority_order(&records)),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn test_idempotent() {
        let records = vec![
            record("x", AcuityLevel::STANDARD, 4),
            record("y", AcuityLevel::URGENT, 8),
            record("z", AcuityLevel::STANDARD, 1),
        ];
        let first: Vec<Uuid> = priority_order(&records).iter().map(|r| r.id).collect();
        let second: Vec<Uuid> = priority_order(&records).iter().map(|r| r.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty() {
        assert!(priority_order(&Vec::new()).is_empty());
        assert!(is_priority_ordered(&[]));
    }
}
