//! 分诊分级规则引擎
//!
//! 根据患者入院时的临床指标计算初始分诊等级。规则按从最危急到最不紧急的顺序逐级判断，
//! 命中的第一级即为结果；都未命中时为 5 级。

use triage_core::{AcuityLevel, ClinicalAttributes, MentalStatus};

/// 分诊分级器
///
/// 规则引擎只是占位实现，后续可替换为统计模型，调用方只依赖这个接口。
pub trait AcuityClassifier: std::fmt::Debug {
    fn classify(&self, attributes: &ClinicalAttributes) -> AcuityLevel;
}

/// 单条判定条件
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    MentalStatusIs(MentalStatus),                 // 意识状态等于
    SaturationBelow(i32),                         // 血氧低于
    SystolicOutside { low: i32, high: i32 },      // 收缩压 < low 或 > high
    HeartRateOutside { low: i32, high: i32 },     // 心率 < low 或 > high
    TemperatureOutside { low: f64, high: f64 },   // 体温 < low 或 > high
    ReportedPainAtLeast(i32),                     // 主诉疼痛且评分 >= n
    PainScoreAtLeast(i32),                        // 疼痛评分 >= n
    Injury,                                       // 外伤
    AmbulanceArrival,                             // 救护车到院
    DiagnosisContains(&'static str),              // 诊断文本包含（不区分大小写）
}

impl Criterion {
    /// `diagnosis` 需已转为小写
    fn matches(&self, attributes: &ClinicalAttributes, diagnosis: &str) -> bool {
        match self {
            Criterion::MentalStatusIs(status) => attributes.mental == *status,
            Criterion::SaturationBelow(limit) => attributes.saturation < *limit,
            Criterion::SystolicOutside { low, high } => {
                attributes.sbp < *low || attributes.sbp > *high
            }
            Criterion::HeartRateOutside { low, high } => {
                attributes.hr < *low || attributes.hr > *high
            }
            Criterion::TemperatureOutside { low, high } => {
                attributes.bt < *low || attributes.bt > *high
            }
            Criterion::ReportedPainAtLeast(score) => {
                attributes.pain && attributes.pain_score() >= *score
            }
            Criterion::PainScoreAtLeast(score) => attributes.pain_score() >= *score,
            Criterion::Injury => attributes.injury,
            Criterion::AmbulanceArrival => attributes.arrival_mode.is_ambulance(),
            Criterion::DiagnosisContains(text) => diagnosis.contains(*text),
        }
    }
}

/// 分诊等级与其判定条件，任一条件命中即归入该等级
#[derive(Debug, Clone)]
pub struct TriageTier {
    pub level: AcuityLevel,
    pub criteria: Vec<Criterion>,
}

impl TriageTier {
    fn matches(&self, attributes: &ClinicalAttributes, diagnosis: &str) -> bool {
        self.criteria.iter().any(|c| c.matches(attributes, diagnosis))
    }
}

/// 基于规则的分诊分级器
#[derive(Debug, Clone)]
pub struct RuleBasedClassifier {
    tiers: Vec<TriageTier>,
}

impl RuleBasedClassifier {
    /// 创建带默认急诊分级规则的分级器
    pub fn new() -> Self {
        let tiers = vec![
            TriageTier {
                level: AcuityLevel::CRITICAL,
                criteria: vec![
                    Criterion::MentalStatusIs(MentalStatus::Unresponsive),
                    Criterion::SaturationBelow(90),
                    Criterion::SystolicOutside { low: 90, high: 180 },
                    Criterion::HeartRateOutside { low: 50, high: 120 },
                    Criterion::TemperatureOutside { low: 35.0, high: 39.0 },
                    Criterion::DiagnosisContains("cardiac arrest"),
                    Criterion::DiagnosisContains("stroke"),
                    Criterion::DiagnosisContains("severe trauma"),
                ],
            },
            TriageTier {
                level: AcuityLevel::URGENT,
                criteria: vec![
                    Criterion::MentalStatusIs(MentalStatus::PainResponse),
                    Criterion::SaturationBelow(94),
                    Criterion::ReportedPainAtLeast(8),
                    Criterion::SystolicOutside { low: 100, high: 160 },
                    Criterion::HeartRateOutside { low: 60, high: 100 },
                    Criterion::DiagnosisContains("chest pain"),
                    Criterion::DiagnosisContains("difficulty breathing"),
                    Criterion::DiagnosisContains("severe"),
                ],
            },
            TriageTier {
                level: AcuityLevel::SEMI_URGENT,
                criteria: vec![
                    Criterion::Injury,
                    Criterion::PainScoreAtLeast(5),
                    Criterion::AmbulanceArrival,
                    Criterion::DiagnosisContains("moderate"),
                    Criterion::DiagnosisContains("fracture"),
                ],
            },
            TriageTier {
                level: AcuityLevel::STANDARD,
                criteria: vec![
                    Criterion::PainScoreAtLeast(2),
                    Criterion::MentalStatusIs(MentalStatus::Verbal),
                    Criterion::DiagnosisContains("minor"),
                    Criterion::DiagnosisContains("routine"),
                ],
            },
        ];

        Self { tiers }
    }

    /// 获取分级规则
    pub fn tiers(&self) -> &[TriageTier] {
        &self.tiers
    }

    /// 返回命中的等级及触发的第一条条件，未命中任何等级时返回 `None`
    pub fn explain(&self, attributes: &ClinicalAttributes) -> Option<(AcuityLevel, &Criterion)> {
        let diagnosis = attributes.diagnosis.to_lowercase();
        self.tiers.iter().find_map(|tier| {
            tier.criteria
                .iter()
                .find(|c| c.matches(attributes, &diagnosis))
                .map(|c| (tier.level, c))
        })
    }
}

impl AcuityClassifier for RuleBasedClassifier {
    fn classify(&self, attributes: &ClinicalAttributes) -> AcuityLevel {
        let diagnosis = attributes.diagnosis.to_lowercase();
        self.tiers
            .iter()
            .find(|tier| tier.matches(attributes, &diagnosis))
            .map(|tier| tier.level)
            .unwrap_or(AcuityLevel::NON_URGENT)
    }
}

impl Default for RuleBasedClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// 使用默认规则计算分诊等级
pub fn classify(attributes: &ClinicalAttributes) -> AcuityLevel {
    RuleBasedClassifier::new().classify(attributes)
}
