//! 成绩实体
//!
//! (student_id, subject_id, semester, year) 上有唯一索引。

use sea_orm::entity::prelude::*;

use super::millis_to_datetime;
use crate::models::grades::entities::{GradeRecord, LetterGrade};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: String,
    pub subject_id: String,
    pub semester: i32,
    pub year: i32,
    pub assignments: f64,
    pub midterm: f64,
    pub final_score: f64,
    pub total: f64,
    pub grade: String,
    pub teacher_id: String,
    pub subject_name: Option<String>,
    pub subject: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_grade_record(self) -> GradeRecord {
        // 历史数据中的非法等级按平均分重新推导
        let grade = self
            .grade
            .parse::<LetterGrade>()
            .unwrap_or_else(|_| LetterGrade::from_mean(self.total));

        GradeRecord {
            id: self.id,
            student_id: self.student_id,
            subject_id: self.subject_id,
            semester: self.semester,
            year: self.year,
            assignments: self.assignments,
            midterm: self.midterm,
            final_exam: self.final_score,
            total: self.total,
            grade,
            teacher_id: self.teacher_id,
            stored_subject_name: self.subject_name,
            stored_subject: self.subject,
            created_at: millis_to_datetime(self.created_at),
            updated_at: millis_to_datetime(self.updated_at),
        }
    }
}
