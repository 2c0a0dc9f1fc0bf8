//! 分诊引擎演示程序
//!
//! 展示分诊引擎的核心功能，包括自动分级、优先级队列、人工覆盖、医生分配和队列统计

use triage_core::{ArrivalMode, ClinicalAttributes, LifecycleStatus, MentalStatus, PatientIntake, Sex};
use triage_workflow::TriageEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    let engine = TriageEngine::new();

    println!("🚑 急诊分诊引擎演示\n");

    // 1. 录入患者
    let patients = create_sample_patients();
    let mut ids = Vec::new();
    for intake in patients {
        let name = intake.name.clone();
        let record = engine.intake(intake).await;
        println!("📋 {} -> 分诊等级 {}", name, record.base_acuity_level);
        ids.push(record.id);
    }

    print_queue(&engine).await;

    // 2. 医生覆盖分诊等级
    engine.override_priority(ids[2], 1, "dr-chen").await?;
    println!("\n✏️  dr-chen 将 {} 调整为 1 级", ids[2]);
    print_queue(&engine).await;

    // 3. 分配医生
    engine.assign(ids[0], "dr-lee").await?;
    println!("\n👩‍⚕️ {} 已分配给 dr-lee", ids[0]);
    println!("   忙碌医生: {:?}", engine.busy_doctors().await);

    // 4. 治疗完成
    engine.update_status(ids[0], LifecycleStatus::Completed).await?;
    println!("✅ {} 治疗完成", ids[0]);
    println!("   忙碌医生: {:?}", engine.busy_doctors().await);

    // 5. 队列统计
    let stats = engine.stats().await;
    println!("\n📊 队列统计:");
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}

async fn print_queue(engine: &TriageEngine) {
    println!("\n📑 当前候诊队列:");
    for (position, record) in engine.queued().await.iter().enumerate() {
        println!(
            "   {}. {} (有效等级 {})",
            position + 1,
            record.name,
            record.effective_priority()
        );
    }
}

fn create_sample_patients() -> Vec<PatientIntake> {
    let base = ClinicalAttributes {
        age: 40,
        sex: Sex::Female,
        arrival_mode: ArrivalMode::Walking,
        injury: false,
        mental: MentalStatus::Alert,
        pain: false,
        nrs_pain: None,
        sbp: 120,
        dbp: 80,
        hr: 76,
        rr: 16,
        bt: 36.8,
        saturation: 98,
        diagnosis: "Sore throat".to_string(),
    };

    vec![
        PatientIntake {
            name: "Unresponsive adult".to_string(),
            attributes: ClinicalAttributes {
                mental: MentalStatus::Unresponsive,
                saturation: 85,
                ..base.clone()
            },
        },
        PatientIntake {
            name: "Chest pain".to_string(),
            attributes: ClinicalAttributes {
                diagnosis: "Chest pain radiating to left arm".to_string(),
                ..base.clone()
            },
        },
        PatientIntake {
            name: "Ankle injury".to_string(),
            attributes: ClinicalAttributes {
                injury: true,
                arrival_mode: ArrivalMode::PublicAmbulance,
                diagnosis: "Possible ankle fracture".to_string(),
                ..base.clone()
            },
        },
        PatientIntake {
            name: "Prescription refill".to_string(),
            attributes: base,
        },
    ]
}
