//! 核心数据模型定义

use crate::error::{Result, TriageError};
use chrono::{DateTime, Utc};
use serde::{de, ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// 分诊等级 (1 = 最危急, 5 = 最不紧急)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AcuityLevel(u8);

impl AcuityLevel {
    pub const CRITICAL: AcuityLevel = AcuityLevel(1);
    pub const URGENT: AcuityLevel = AcuityLevel(2);
    pub const SEMI_URGENT: AcuityLevel = AcuityLevel(3);
    pub const STANDARD: AcuityLevel = AcuityLevel(4);
    pub const NON_URGENT: AcuityLevel = AcuityLevel(5);

    /// 校验并构造分诊等级，超出 [1,5] 时返回 `InvalidArgument`，不做截断
    pub fn new(level: u8) -> Result<Self> {
        if (1..=5).contains(&level) {
            Ok(AcuityLevel(level))
        } else {
            Err(TriageError::InvalidArgument(format!(
                "Acuity level must be between 1 and 5, got {}",
                level
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// 所有等级，按优先级从高到低
    pub fn all() -> [AcuityLevel; 5] {
        [
            AcuityLevel::CRITICAL,
            AcuityLevel::URGENT,
            AcuityLevel::SEMI_URGENT,
            AcuityLevel::STANDARD,
            AcuityLevel::NON_URGENT,
        ]
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Critical",
            2 => "Urgent",
            3 => "Semi-Urgent",
            4 => "Standard",
            _ => "Non-Urgent",
        }
    }
}

impl TryFrom<u8> for AcuityLevel {
    type Error = TriageError;

    fn try_from(level: u8) -> Result<Self> {
        AcuityLevel::new(level)
    }
}

impl From<AcuityLevel> for u8 {
    fn from(level: AcuityLevel) -> u8 {
        level.0
    }
}

impl fmt::Display for AcuityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}

/// 录入表单中的编码字段：接受整数编码或名称
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Code(i32),
    Name(String),
}

/// 性别枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "FormValue")]
pub enum Sex {
    Female, // 1
    Male,   // 2
}

impl Sex {
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(Sex::Female),
            2 => Ok(Sex::Male),
            _ => Err(TriageError::InvalidArgument(format!("Unknown sex code {}", code))),
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "female" => Ok(Sex::Female),
            "male" => Ok(Sex::Male),
            _ => Err(TriageError::InvalidArgument(format!("Unknown sex {}", name))),
        }
    }
}

impl TryFrom<FormValue> for Sex {
    type Error = TriageError;

    fn try_from(value: FormValue) -> Result<Self> {
        match value {
            FormValue::Code(code) => Sex::from_code(code),
            FormValue::Name(name) => Sex::from_name(&name),
        }
    }
}

/// 到院方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "FormValue")]
pub enum ArrivalMode {
    Walking,          // 1
    PublicAmbulance,  // 2
    PrivateVehicle,   // 3
    PrivateAmbulance, // 4
    AirTransport,     // 5
    Transfer,         // 6
    Unknown,          // 7
}

impl ArrivalMode {
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(ArrivalMode::Walking),
            2 => Ok(ArrivalMode::PublicAmbulance),
            3 => Ok(ArrivalMode::PrivateVehicle),
            4 => Ok(ArrivalMode::PrivateAmbulance),
            5 => Ok(ArrivalMode::AirTransport),
            6 => Ok(ArrivalMode::Transfer),
            7 => Ok(ArrivalMode::Unknown),
            _ => Err(TriageError::InvalidArgument(format!(
                "Unknown arrival mode code {}",
                code
            ))),
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "walking" => Ok(ArrivalMode::Walking),
            "public_ambulance" => Ok(ArrivalMode::PublicAmbulance),
            "private_vehicle" => Ok(ArrivalMode::PrivateVehicle),
            "private_ambulance" => Ok(ArrivalMode::PrivateAmbulance),
            "air_transport" => Ok(ArrivalMode::AirTransport),
            "transfer" => Ok(ArrivalMode::Transfer),
            "unknown" => Ok(ArrivalMode::Unknown),
            _ => Err(TriageError::InvalidArgument(format!("Unknown arrival mode {}", name))),
        }
    }

    pub fn is_ambulance(self) -> bool {
        matches!(self, ArrivalMode::PublicAmbulance | ArrivalMode::PrivateAmbulance)
    }
}

impl TryFrom<FormValue> for ArrivalMode {
    type Error = TriageError;

    fn try_from(value: FormValue) -> Result<Self> {
        match value {
            FormValue::Code(code) => ArrivalMode::from_code(code),
            FormValue::Name(name) => ArrivalMode::from_name(&name),
        }
    }
}

/// 意识状态 (AVPU)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "FormValue")]
pub enum MentalStatus {
    Alert,        // 1
    Verbal,       // 2
    PainResponse, // 3
    Unresponsive, // 4
}

impl MentalStatus {
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(MentalStatus::Alert),
            2 => Ok(MentalStatus::Verbal),
            3 => Ok(MentalStatus::PainResponse),
            4 => Ok(MentalStatus::Unresponsive),
            _ => Err(TriageError::InvalidArgument(format!(
                "Unknown mental status code {}",
                code
            ))),
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "alert" => Ok(MentalStatus::Alert),
            "verbal" => Ok(MentalStatus::Verbal),
            "pain_response" => Ok(MentalStatus::PainResponse),
            "unresponsive" => Ok(MentalStatus::Unresponsive),
            _ => Err(TriageError::InvalidArgument(format!("Unknown mental status {}", name))),
        }
    }
}

impl TryFrom<FormValue> for MentalStatus {
    type Error = TriageError;

    fn try_from(value: FormValue) -> Result<Self> {
        match value {
            FormValue::Code(code) => MentalStatus::from_code(code),
            FormValue::Name(name) => MentalStatus::from_name(&name),
        }
    }
}

/// 是/否字段：布尔值或表单编码
#[derive(Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Flag(bool),
    Code(i32),
}

/// 外伤：1 = 无, 2 = 有
fn injury_flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    match FlagValue::deserialize(deserializer)? {
        FlagValue::Flag(flag) => Ok(flag),
        FlagValue::Code(1) => Ok(false),
        FlagValue::Code(2) => Ok(true),
        FlagValue::Code(code) => Err(de::Error::custom(format!("Unknown injury code {}", code))),
    }
}

/// 疼痛：0 = 无, 1 = 有
fn pain_flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    match FlagValue::deserialize(deserializer)? {
        FlagValue::Flag(flag) => Ok(flag),
        FlagValue::Code(0) => Ok(false),
        FlagValue::Code(1) => Ok(true),
        FlagValue::Code(code) => Err(de::Error::custom(format!("Unknown pain code {}", code))),
    }
}

/// 入院时的临床指标快照，创建后不可变
///
/// 数值字段不做范围校验，由上游的录入校验负责。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalAttributes {
    pub age: i32,
    pub sex: Sex,
    pub arrival_mode: ArrivalMode,
    #[serde(deserialize_with = "injury_flag")]
    pub injury: bool,
    pub mental: MentalStatus,
    #[serde(deserialize_with = "pain_flag")]
    pub pain: bool,
    #[serde(default)]
    pub nrs_pain: Option<i32>, // 数字疼痛评分 0-10
    pub sbp: i32,              // 收缩压
    pub dbp: i32,              // 舒张压
    pub hr: i32,               // 心率
    pub rr: i32,               // 呼吸频率
    pub bt: f64,               // 体温 (°C)
    pub saturation: i32,       // 血氧饱和度
    pub diagnosis: String,
}

impl ClinicalAttributes {
    /// 疼痛评分，缺省按 0 处理
    pub fn pain_score(&self) -> i32 {
        self.nrs_pain.unwrap_or(0)
    }
}

/// 分诊录入请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientIntake {
    pub name: String,
    #[serde(flatten)]
    pub attributes: ClinicalAttributes,
}

/// 患者生命周期状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    Waiting,     // 候诊
    InTreatment, // 治疗中
    Completed,   // 已完成
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleStatus::Waiting => "waiting",
            LifecycleStatus::InTreatment => "in_treatment",
            LifecycleStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// 医生对分诊等级的人工覆盖
///
/// 等级与操作人总是同时存在或同时缺失。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityOverride {
    pub level: AcuityLevel,
    pub overridden_by: String,
}

/// 患者记录
///
/// 序列化时附带计算出的 `effectivePriority`，反序列化时忽略该字段。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub id: Uuid,
    pub name: String,
    pub clinical_attributes: ClinicalAttributes,
    pub created_at: DateTime<Utc>,
    pub lifecycle_status: LifecycleStatus,
    pub base_acuity_level: AcuityLevel, // 分类器给出的初始等级，作为审计基线
    #[serde(rename = "override")]
    pub priority_override: Option<PriorityOverride>,
    pub assigned_doctor_id: Option<String>,
}

impl PatientRecord {
    /// 有效优先级：存在覆盖时取覆盖等级，否则取初始等级
    pub fn effective_priority(&self) -> AcuityLevel {
        self.priority_override
            .as_ref()
            .map(|o| o.level)
            .unwrap_or(self.base_acuity_level)
    }

    pub fn overridden_by(&self) -> Option<&str> {
        self.priority_override.as_ref().map(|o| o.overridden_by.as_str())
    }

    pub fn is_waiting(&self) -> bool {
        self.lifecycle_status == LifecycleStatus::Waiting
    }
}

impl Serialize for PatientRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PatientRecord", 9)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("clinicalAttributes", &self.clinical_attributes)?;
        state.serialize_field("createdAt", &self.created_at)?;
        state.serialize_field("lifecycleStatus", &self.lifecycle_status)?;
        state.serialize_field("baseAcuityLevel", &self.base_acuity_level)?;
        state.serialize_field("override", &self.priority_override)?;
        state.serialize_field("effectivePriority", &self.effective_priority())?;
        state.serialize_field("assignedDoctorId", &self.assigned_doctor_id)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_attributes() -> ClinicalAttributes {
        ClinicalAttributes {
            age: 40,
            sex: Sex::Female,
            arrival_mode: ArrivalMode::Walking,
            injury: false,
            mental: MentalStatus::Alert,
            pain: false,
            nrs_pain: None,
            sbp: 120,
            dbp: 80,
            hr: 75,
            rr: 16,
            bt: 36.8,
            saturation: 98,
            diagnosis: "Headache".to_string(),
        }
    }

    #[test]
    fn test_acuity_level_bounds() {
        assert!(AcuityLevel::new(0).is_err());
        assert!(AcuityLevel::new(6).is_err());
        assert_eq!(AcuityLevel::new(1).unwrap(), AcuityLevel::CRITICAL);
        assert_eq!(AcuityLevel::new(5).unwrap(), AcuityLevel::NON_URGENT);
        assert!(AcuityLevel::CRITICAL < AcuityLevel::URGENT);
    }

    #[test]
    fn test_acuity_level_serde() {
        let json = serde_json::to_string(&AcuityLevel::SEMI_URGENT).unwrap();
        assert_eq!(json, "3");
        let level: AcuityLevel = serde_json::from_str("2").unwrap();
        assert_eq!(level, AcuityLevel::URGENT);
        assert!(serde_json::from_str::<AcuityLevel>("9").is_err());
    }

    #[test]
    fn test_intake_codes() {
        assert_eq!(ArrivalMode::from_code(4).unwrap(), ArrivalMode::PrivateAmbulance);
        assert!(ArrivalMode::from_code(4).unwrap().is_ambulance());
        assert!(!ArrivalMode::from_code(3).unwrap().is_ambulance());
        assert_eq!(MentalStatus::from_code(4).unwrap(), MentalStatus::Unresponsive);
        assert!(MentalStatus::from_code(0).is_err());
        assert!(Sex::from_code(3).is_err());
    }

    #[test]
    fn test_effective_priority() {
        let mut record = PatientRecord {
            id: Uuid::new_v4(),
            name: "Jane Doe".to_string(),
            clinical_attributes: sample_attributes(),
            created_at: Utc::now(),
            lifecycle_status: LifecycleStatus::Waiting,
            base_acuity_level: AcuityLevel::SEMI_URGENT,
            priority_override: None,
            assigned_doctor_id: None,
        };
        assert_eq!(record.effective_priority(), AcuityLevel::SEMI_URGENT);
        assert_eq!(record.overridden_by(), None);

        record.priority_override = Some(PriorityOverride {
            level: AcuityLevel::CRITICAL,
            overridden_by: "dr-x".to_string(),
        });
        assert_eq!(record.effective_priority(), AcuityLevel::CRITICAL);
        assert_eq!(record.overridden_by(), Some("dr-x"));
        assert_eq!(record.base_acuity_level, AcuityLevel::SEMI_URGENT);
    }

    #[test]
    fn test_intake_deserialize() {
        let json = r#"{
            "name": "John Roe",
            "age": 67,
            "sex": "male",
            "arrivalMode": "public_ambulance",
            "injury": false,
            "mental": "alert",
            "pain": true,
            "sbp": 150,
            "dbp": 90,
            "hr": 88,
            "rr": 18,
            "bt": 37.1,
            "saturation": 96,
            "diagnosis": "Fall at home"
        }"#;
        let intake: PatientIntake = serde_json::from_str(json).unwrap();
        assert_eq!(intake.name, "John Roe");
        assert_eq!(intake.attributes.arrival_mode, ArrivalMode::PublicAmbulance);
        assert_eq!(intake.attributes.pain_score(), 0);
    }

    #[test]
    fn test_intake_deserialize_form_codes() {
        let json = r#"{
            "name": "Form Patient",
            "age": 71,
            "sex": 2,
            "arrivalMode": 4,
            "injury": 2,
            "mental": 3,
            "pain": 1,
            "nrsPain": 9,
            "sbp": 85,
            "dbp": 50,
            "hr": 125,
            "rr": 26,
            "bt": 39.4,
            "saturation": 89,
            "diagnosis": "Fall from ladder"
        }"#;
        let intake: PatientIntake = serde_json::from_str(json).unwrap();
        let attrs = intake.attributes;
        assert_eq!(attrs.sex, Sex::Male);
        assert_eq!(attrs.arrival_mode, ArrivalMode::PrivateAmbulance);
        assert_eq!(attrs.mental, MentalStatus::PainResponse);
        assert!(attrs.injury);
        assert!(attrs.pain);
        assert_eq!(attrs.pain_score(), 9);

        // 编码 1 表示无外伤，0 表示无疼痛
        let json = json.replace("\"injury\": 2", "\"injury\": 1").replace("\"pain\": 1", "\"pain\": 0");
        let intake: PatientIntake = serde_json::from_str(&json).unwrap();
        assert!(!intake.attributes.injury);
        assert!(!intake.attributes.pain);
    }

    #[test]
    fn test_intake_rejects_unknown_codes() {
        let base = serde_json::to_value(sample_attributes()).unwrap();

        for (field, value) in [
            ("sex", serde_json::json!(3)),
            ("arrivalMode", serde_json::json!(8)),
            ("mental", serde_json::json!(0)),
            ("mental", serde_json::json!("asleep")),
            ("injury", serde_json::json!(0)),
            ("pain", serde_json::json!(2)),
        ] {
            let mut attrs = base.clone();
            attrs[field] = value.clone();
            assert!(
                serde_json::from_value::<ClinicalAttributes>(attrs).is_err(),
                "{} = {} should be rejected",
                field,
                value
            );
        }
    }

    #[test]
    fn test_record_serializes_effective_priority() {
        let mut record = PatientRecord {
            id: Uuid::new_v4(),
            name: "Jane Doe".to_string(),
            clinical_attributes: sample_attributes(),
            created_at: Utc::now(),
            lifecycle_status: LifecycleStatus::Waiting,
            base_acuity_level: AcuityLevel::STANDARD,
            priority_override: None,
            assigned_doctor_id: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["effectivePriority"], 4);
        assert!(json["override"].is_null());

        record.priority_override = Some(PriorityOverride {
            level: AcuityLevel::URGENT,
            overridden_by: "dr-x".to_string(),
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["effectivePriority"], 2);
        assert_eq!(json["baseAcuityLevel"], 4);
        assert_eq!(json["clinicalAttributes"]["arrivalMode"], "walking");

        let parsed: PatientRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.effective_priority(), AcuityLevel::URGENT);
    }
}
