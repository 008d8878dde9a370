//! 示例数据生成
//!
//! 仅在非生产环境、且所有业务表均为空时写入一组演示数据：
//! 教师、学生、班级（含名单和协同教师）以及优惠码。

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::errors::Result;
use crate::models::EntityStatus;
use crate::models::classes::requests::CreateClassRequest;
use crate::models::promo_codes::entities::{ClassRestriction, DiscountType};
use crate::models::promo_codes::requests::CreatePromoCodeRequest;
use crate::models::students::requests::CreateStudentRequest;
use crate::models::teachers::requests::CreateTeacherRequest;
use crate::storage::SeaOrmStorage;

const TEACHERS: &[(&str, &str, &str, &str)] = &[
    ("Dana", "Levi", "dana.levi@school.test", "0521000001"),
    ("Omer", "Katz", "omer.katz@school.test", "0521000002"),
    ("Noa", "Shapiro", "noa.shapiro@school.test", "0521000003"),
];

const STUDENTS: &[(&str, &str)] = &[
    ("Ann", "Lee"),
    ("Ben", "Cohen"),
    ("Chen", "Wu"),
    ("Dina", "Mizrahi"),
    ("Eli", "Friedman"),
    ("Fay", "Golan"),
    ("Gil", "Peretz"),
    ("Hila", "Ben-David"),
    ("Ido", "Avraham"),
    ("Yael", "Segal"),
];

const CLASSES: &[(&str, &str, i32)] = &[
    ("Algebra I", "Foundations of algebra", 12),
    ("Creative Writing", "Short stories and poetry", 8),
    ("Robotics Lab", "Hands-on robotics projects", 6),
];

/// 生成结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub teachers: usize,
    pub students: usize,
    pub classes: usize,
    pub enrollments: usize,
    pub promo_codes: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        *self == SeedReport::default()
    }
}

/// 写入示例数据；任意一张表非空时不做任何事并返回空报告
pub async fn seed_sample_data(storage: &SeaOrmStorage) -> Result<SeedReport> {
    let counts = crate::services::system::entity_counts(storage).await?;
    if counts.teachers + counts.students + counts.classes + counts.promo_codes > 0 {
        debug!("Database already has data, skipping sample data seed");
        return Ok(SeedReport::default());
    }

    info!("Database is empty, seeding sample data...");
    let mut report = SeedReport::default();

    let teachers = storage.teachers();
    let mut teacher_ids = Vec::with_capacity(TEACHERS.len());
    for (first, last, email, mobile) in TEACHERS {
        let teacher = teachers
            .create(CreateTeacherRequest {
                first_name: Some(first.to_string()),
                last_name: Some(last.to_string()),
                email: email.to_string(),
                mobile: mobile.to_string(),
                ..Default::default()
            })
            .await?;
        teacher_ids.push(teacher.id);
    }
    report.teachers = teacher_ids.len();

    let students = storage.students();
    let mut student_ids = Vec::with_capacity(STUDENTS.len());
    for (i, (first, last)) in STUDENTS.iter().enumerate() {
        let student = students
            .create(CreateStudentRequest {
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: Some(format!("{}@student.test", first.to_lowercase())),
                mobile: format!("05090000{i:02}"),
                // 最后一名学生为停用状态，便于演示筛选
                status: if i + 1 == STUDENTS.len() {
                    EntityStatus::Inactive
                } else {
                    EntityStatus::Active
                },
                ..Default::default()
            })
            .await?;
        student_ids.push(student.id);
    }
    report.students = student_ids.len();

    let classes = storage.classes();
    let relationships = storage.relationships();
    let mut class_ids = Vec::with_capacity(CLASSES.len());
    for (i, (name, description, capacity)) in CLASSES.iter().enumerate() {
        let class = classes
            .create(CreateClassRequest {
                name: name.to_string(),
                description: Some(description.to_string()),
                teacher_id: teacher_ids.get(i).copied(),
                capacity: Some(*capacity),
                ..Default::default()
            })
            .await?;

        // 名单按班级容量截取
        let roster: Vec<i64> = student_ids
            .iter()
            .skip(i * 3)
            .take(*capacity as usize)
            .copied()
            .collect();
        report.enrollments += relationships.set_class_roster(class.id, &roster).await?.len();
        class_ids.push(class.id);
    }
    report.classes = class_ids.len();

    // 第一位教师同时协助其余班级
    if let Some(&first_teacher) = teacher_ids.first() {
        relationships
            .set_teacher_classes(first_teacher, &class_ids[1..])
            .await?;
    }

    let now = Utc::now();
    let promo_codes = storage.promo_codes();
    let samples = [
        ("WELCOME10", DiscountType::Percent, 10.0, None, None),
        ("SPRING25", DiscountType::Percent, 25.0, Some(100), Some(now + Duration::days(90))),
        ("FLAT50", DiscountType::Fixed, 50.0, Some(20), None),
        ("EARLYBIRD", DiscountType::Percent, 15.0, Some(50), Some(now + Duration::days(30))),
        ("ROBOTICS", DiscountType::Fixed, 100.0, Some(10), None),
    ];
    for (code, discount_type, discount_value, usage_limit, expiry_date) in samples {
        let promo = promo_codes
            .create(CreatePromoCodeRequest {
                code: code.to_string(),
                description: Some(format!("Sample {code} promotion")),
                discount_type,
                discount_value,
                usage_limit,
                expiry_date,
                ..Default::default()
            })
            .await?;
        report.promo_codes += 1;

        // ROBOTICS 仅适用于最后一个班级
        if code == "ROBOTICS"
            && let Some(&class_id) = class_ids.last()
        {
            relationships
                .set_promo_code_classes(promo.id, ClassRestriction::Restricted(vec![class_id]))
                .await?;
        }
    }

    info!(
        "Sample data seeded: {} teachers, {} students, {} classes, {} enrollments, {} promo codes",
        report.teachers, report.students, report.classes, report.enrollments, report.promo_codes
    );
    Ok(report)
}
