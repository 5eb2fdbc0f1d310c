//! 成绩存储操作

use super::SeaOrmStorage;
use crate::entity::grades::{ActiveModel, Column, Entity as Grades, Model};
use crate::errors::{Result, SiakadError};
use crate::models::{
    PaginationInfo, clamp_page,
    grades::{
        entities::{GradeChanges, GradeFilter, GradeKey, GradeRecord, UpsertOutcome},
        requests::GradeListQuery,
        responses::GradeListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select,
    Set, SqlErr,
};

/// 复合键过滤
fn by_key(key: &GradeKey) -> Select<Grades> {
    Grades::find()
        .filter(Column::StudentId.eq(key.student_id.as_str()))
        .filter(Column::SubjectId.eq(key.subject_id.as_str()))
        .filter(Column::Semester.eq(key.semester))
        .filter(Column::Year.eq(key.year))
}

impl SeaOrmStorage {
    async fn find_grade_model(&self, key: &GradeKey) -> Result<Option<Model>> {
        by_key(key)
            .one(&self.db)
            .await
            .map_err(|e| SiakadError::database_operation(format!("查询成绩失败: {e}")))
    }

    /// 按复合键获取成绩
    pub async fn find_grade_impl(&self, key: &GradeKey) -> Result<Option<GradeRecord>> {
        Ok(self
            .find_grade_model(key)
            .await?
            .map(|m| m.into_grade_record()))
    }

    /// 按学生查询成绩
    pub async fn find_grades_impl(&self, filter: &GradeFilter) -> Result<Vec<GradeRecord>> {
        let mut select = Grades::find().filter(Column::StudentId.eq(filter.student_id.as_str()));

        if let Some(semester) = filter.semester {
            select = select.filter(Column::Semester.eq(semester));
        }

        if let Some(year) = filter.year {
            select = select.filter(Column::Year.eq(year));
        }

        let grades = select
            .order_by_desc(Column::UpdatedAt)
            .order_by_desc(Column::Year)
            .order_by_desc(Column::Semester)
            .all(&self.db)
            .await
            .map_err(|e| SiakadError::database_operation(format!("查询成绩列表失败: {e}")))?;

        Ok(grades.into_iter().map(|m| m.into_grade_record()).collect())
    }

    async fn update_grade_model(&self, id: i64, changes: GradeChanges) -> Result<()> {
        let model = ActiveModel {
            id: Set(id),
            assignments: Set(changes.assignments),
            midterm: Set(changes.midterm),
            final_score: Set(changes.final_exam),
            total: Set(changes.total),
            grade: Set(changes.grade.to_string()),
            teacher_id: Set(changes.teacher_id),
            updated_at: Set(changes.now.timestamp_millis()),
            ..Default::default()
        };

        model
            .update(&self.db)
            .await
            .map_err(|e| SiakadError::database_operation(format!("更新成绩失败: {e}")))?;
        Ok(())
    }

    /// 按复合键新建或更新成绩
    ///
    /// 并发插入同一复合键时唯一索引拒绝后到的插入，后到者改为更新。
    pub async fn upsert_grade_impl(
        &self,
        key: &GradeKey,
        changes: GradeChanges,
    ) -> Result<UpsertOutcome> {
        if let Some(existing) = self.find_grade_model(key).await? {
            self.update_grade_model(existing.id, changes).await?;
            return Ok(UpsertOutcome::Modified);
        }

        let now = changes.now.timestamp_millis();
        let model = ActiveModel {
            student_id: Set(key.student_id.clone()),
            subject_id: Set(key.subject_id.clone()),
            semester: Set(key.semester),
            year: Set(key.year),
            assignments: Set(changes.assignments),
            midterm: Set(changes.midterm),
            final_score: Set(changes.final_exam),
            total: Set(changes.total),
            grade: Set(changes.grade.to_string()),
            teacher_id: Set(changes.teacher_id.clone()),
            subject_name: Set(None),
            subject: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(_) => Ok(UpsertOutcome::Created),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                let existing = self.find_grade_model(key).await?.ok_or_else(|| {
                    SiakadError::database_operation(format!("创建成绩失败: {e}"))
                })?;
                self.update_grade_model(existing.id, changes).await?;
                Ok(UpsertOutcome::Modified)
            }
            Err(e) => Err(SiakadError::database_operation(format!(
                "创建成绩失败: {e}"
            ))),
        }
    }

    /// 列出成绩（分页）
    pub async fn list_grades_with_pagination_impl(
        &self,
        query: GradeListQuery,
    ) -> Result<GradeListResponse> {
        let (page, size) = clamp_page(query.page, query.size, 20);

        let mut select = Grades::find();

        if let Some(ref student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id.as_str()));
        }

        if let Some(ref subject_id) = query.subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id.as_str()));
        }

        if let Some(semester) = query.semester {
            select = select.filter(Column::Semester.eq(semester));
        }

        if let Some(year) = query.year {
            select = select.filter(Column::Year.eq(year));
        }

        if let Some(ref teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id.as_str()));
        }

        // 排序
        select = select
            .order_by_desc(Column::UpdatedAt)
            .order_by_asc(Column::Id);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| SiakadError::database_operation(format!("查询成绩总数失败: {e}")))?;

        let pages = paginator.num_pages().await.map_err(|e| {
            SiakadError::database_operation(format!("查询成绩页数失败: {e}"))
        })?;

        let grades = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| SiakadError::database_operation(format!("查询成绩列表失败: {e}")))?;

        Ok(GradeListResponse {
            items: grades.into_iter().map(|m| m.into_grade_record()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }
}
