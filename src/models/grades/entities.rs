use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    E,
}

/// 各等级的最低平均分，从高到低排列，低于全部阈值为 E
pub const GRADE_FLOORS: [(LetterGrade, u8); 4] = [
    (LetterGrade::A, 85),
    (LetterGrade::B, 75),
    (LetterGrade::C, 65),
    (LetterGrade::D, 55),
];

impl LetterGrade {
    /// 按固定阈值从未取整的平均分得到等级
    pub fn from_mean(mean: f64) -> Self {
        GRADE_FLOORS
            .iter()
            .find(|(_, floor)| mean >= f64::from(*floor))
            .map_or(LetterGrade::E, |(grade, _)| *grade)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::E => "E",
        }
    }
}

impl std::fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LetterGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(LetterGrade::A),
            "B" => Ok(LetterGrade::B),
            "C" => Ok(LetterGrade::C),
            "D" => Ok(LetterGrade::D),
            "E" => Ok(LetterGrade::E),
            _ => Err(format!("Invalid letter grade: {s}")),
        }
    }
}

/// 成绩的业务复合键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GradeKey {
    pub student_id: String,
    pub subject_id: String,
    pub semester: i32,
    pub year: i32,
}

// 成绩记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeRecord {
    pub id: i64,
    pub student_id: String,
    pub subject_id: String,
    pub semester: i32,
    pub year: i32,
    pub assignments: f64,
    pub midterm: f64,
    #[serde(rename = "final")]
    pub final_exam: f64,
    pub total: f64,
    pub grade: LetterGrade,
    pub teacher_id: String,
    // 历史数据中冗余保存的科目名称
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub stored_subject_name: Option<String>,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub stored_subject: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl GradeRecord {
    pub fn key(&self) -> GradeKey {
        GradeKey {
            student_id: self.student_id.clone(),
            subject_id: self.subject_id.clone(),
            semester: self.semester,
            year: self.year,
        }
    }
}

/// 一次 upsert 写入的字段
#[derive(Debug, Clone, PartialEq)]
pub struct GradeChanges {
    pub assignments: f64,
    pub midterm: f64,
    pub final_exam: f64,
    pub total: f64,
    pub grade: LetterGrade,
    pub teacher_id: String,
    pub now: chrono::DateTime<chrono::Utc>,
}

/// 存储层实际执行的 upsert 结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Modified,
}

/// 按学生查询时的过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeFilter {
    pub student_id: String,
    pub semester: Option<i32>,
    pub year: Option<i32>,
}

// 带科目名称的成绩
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeView {
    #[serde(flatten)]
    #[ts(flatten)]
    pub record: GradeRecord,
    pub subject_name: String,
}
