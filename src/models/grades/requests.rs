use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::deserialize_string_to_i64;

// 批量录入中的单条成绩（来自HTTP请求）
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeEntryRequest {
    pub student_id: String,
    pub subject_id: String,
    #[serde(deserialize_with = "deserialize_string_to_i64")]
    pub semester: i64,
    #[serde(deserialize_with = "deserialize_string_to_i64")]
    pub year: i64,
    #[serde(default, deserialize_with = "deserialize_lenient_score")]
    pub assignments: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_score")]
    pub midterm: Option<f64>,
    #[serde(rename = "final", default, deserialize_with = "deserialize_lenient_score")]
    pub final_exam: Option<f64>,
}

impl GradeEntryRequest {
    /// 附上提交教师，转换为账本输入
    pub fn into_submission(self, teacher_id: &str) -> GradeSubmission {
        GradeSubmission {
            student_id: self.student_id,
            subject_id: self.subject_id,
            semester: self.semester,
            year: self.year,
            assignments: self.assignments,
            midterm: self.midterm,
            final_exam: self.final_exam,
            teacher_id: teacher_id.to_string(),
        }
    }
}

// 批量录入请求
#[derive(Debug, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeBatchRequest {
    pub items: Vec<GradeEntryRequest>,
}

/// 成绩账本的单条输入，分数为 None 表示缺失
#[derive(Debug, Clone, PartialEq)]
pub struct GradeSubmission {
    pub student_id: String,
    pub subject_id: String,
    pub semester: i64,
    pub year: i64,
    pub assignments: Option<f64>,
    pub midterm: Option<f64>,
    pub final_exam: Option<f64>,
    pub teacher_id: String,
}

// 按学生查询成绩的参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct StudentGradeQuery {
    pub semester: Option<i64>,
    pub year: Option<i64>,
}

// 成绩列表查询参数（教师/管理员）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub student_id: Option<String>,
    pub subject_id: Option<String>,
    pub semester: Option<i64>,
    pub year: Option<i64>,
    pub teacher_id: Option<String>,
}

// 宽松的分数解析：数字或数字字符串视为分数，其余一律视为缺失
fn deserialize_lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{IgnoredAny, MapAccess, SeqAccess, Visitor};
    use std::fmt;

    struct ScoreVisitor;

    impl<'de> Visitor<'de> for ScoreVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a score as a number or numeric string")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value as f64))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value as f64))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
            Ok(value.is_finite().then_some(value))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
            Ok(value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|score| score.is_finite()))
        }

        fn visit_bool<E>(self, _value: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(ScoreVisitor)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(None)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(None)
        }
    }

    deserializer.deserialize_any(ScoreVisitor)
}
