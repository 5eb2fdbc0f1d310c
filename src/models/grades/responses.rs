use serde::Serialize;
use ts_rs::TS;

use super::entities::{GradeRecord, GradeView};
use crate::models::common::PaginationInfo;

// 批量录入结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct BatchResult {
    /// 新建的记录数
    pub upserted: u64,
    /// 被更新的已有记录数
    pub modified: u64,
}

// 学生成绩列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct StudentGradesResponse {
    pub student_id: String,
    pub items: Vec<GradeView>,
}

// 成绩分页列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeListResponse {
    pub items: Vec<GradeRecord>,
    pub pagination: PaginationInfo,
}
