//! 内存存储实现
//!
//! 基于 DashMap 的成绩与科目存储，同一复合键的 upsert 在分片锁内完成。

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::errors::Result;
use crate::models::{
    PaginationInfo, clamp_page,
    grades::{
        entities::{GradeChanges, GradeFilter, GradeKey, GradeRecord, UpsertOutcome},
        requests::GradeListQuery,
        responses::GradeListResponse,
    },
};
use crate::storage::{GradeStore, SubjectDirectory};

#[derive(Default)]
pub struct MemoryStorage {
    grades: DashMap<GradeKey, GradeRecord>,
    subjects: DashMap<String, String>,
    next_id: AtomicI64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册科目名称
    pub fn insert_subject(&self, id: impl Into<String>, name: impl Into<String>) {
        self.subjects.insert(id.into(), name.into());
    }

    /// 直接写入一条记录（导入历史数据）
    pub fn insert_record(&self, record: GradeRecord) {
        self.next_id.fetch_max(record.id, Ordering::SeqCst);
        self.grades.insert(record.key(), record);
    }

    pub fn grade_count(&self) -> usize {
        self.grades.len()
    }
}

#[async_trait]
impl GradeStore for MemoryStorage {
    async fn find_grade(&self, key: &GradeKey) -> Result<Option<GradeRecord>> {
        Ok(self.grades.get(key).map(|entry| entry.value().clone()))
    }

    async fn find_grades(&self, filter: &GradeFilter) -> Result<Vec<GradeRecord>> {
        let mut records: Vec<GradeRecord> = self
            .grades
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|record| {
                record.student_id == filter.student_id
                    && filter.semester.is_none_or(|s| record.semester == s)
                    && filter.year.is_none_or(|y| record.year == y)
            })
            .collect();

        records.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then(b.year.cmp(&a.year))
                .then(b.semester.cmp(&a.semester))
        });
        Ok(records)
    }

    async fn upsert_grade(&self, key: &GradeKey, changes: GradeChanges) -> Result<UpsertOutcome> {
        match self.grades.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                record.assignments = changes.assignments;
                record.midterm = changes.midterm;
                record.final_exam = changes.final_exam;
                record.total = changes.total;
                record.grade = changes.grade;
                record.teacher_id = changes.teacher_id;
                record.updated_at = changes.now;
                Ok(UpsertOutcome::Modified)
            }
            Entry::Vacant(vacant) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                vacant.insert(GradeRecord {
                    id,
                    student_id: key.student_id.clone(),
                    subject_id: key.subject_id.clone(),
                    semester: key.semester,
                    year: key.year,
                    assignments: changes.assignments,
                    midterm: changes.midterm,
                    final_exam: changes.final_exam,
                    total: changes.total,
                    grade: changes.grade,
                    teacher_id: changes.teacher_id,
                    stored_subject_name: None,
                    stored_subject: None,
                    created_at: changes.now,
                    updated_at: changes.now,
                });
                Ok(UpsertOutcome::Created)
            }
        }
    }

    async fn list_grades_with_pagination(
        &self,
        query: GradeListQuery,
    ) -> Result<GradeListResponse> {
        let (page, size) = clamp_page(query.page, query.size, 20);

        let mut records: Vec<GradeRecord> = self
            .grades
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|r| query.student_id.as_ref().is_none_or(|v| &r.student_id == v))
            .filter(|r| query.subject_id.as_ref().is_none_or(|v| &r.subject_id == v))
            .filter(|r| query.semester.is_none_or(|v| i64::from(r.semester) == v))
            .filter(|r| query.year.is_none_or(|v| i64::from(r.year) == v))
            .filter(|r| query.teacher_id.as_ref().is_none_or(|v| &r.teacher_id == v))
            .collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));

        let total = records.len() as i64;
        let items = records
            .into_iter()
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .collect();

        Ok(GradeListResponse {
            items,
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total,
                total_pages: (total + size as i64 - 1) / size as i64,
            },
        })
    }
}

#[async_trait]
impl SubjectDirectory for MemoryStorage {
    async fn resolve_subject_names(&self, ids: &[String]) -> Result<HashMap<String, String>> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.subjects
                    .get(id)
                    .map(|name| (id.clone(), name.value().clone()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grades::entities::LetterGrade;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn changes(at_ms: i64) -> GradeChanges {
        GradeChanges {
            assignments: 80.0,
            midterm: 80.0,
            final_exam: 80.0,
            total: 80.0,
            grade: LetterGrade::B,
            teacher_id: "t1".to_string(),
            now: Utc.timestamp_millis_opt(at_ms).unwrap(),
        }
    }

    fn key(student: &str) -> GradeKey {
        GradeKey {
            student_id: student.to_string(),
            subject_id: "math".to_string(),
            semester: 1,
            year: 2026,
        }
    }

    #[tokio::test]
    async fn test_concurrent_upserts_on_one_key_create_once() {
        let storage = Arc::new(MemoryStorage::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                storage.upsert_grade(&key("s1"), changes(i)).await.unwrap()
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() == UpsertOutcome::Created {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(storage.grade_count(), 1);
    }

    #[tokio::test]
    async fn test_pagination_counts_pages() {
        let storage = MemoryStorage::new();
        for (i, student) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            storage.upsert_grade(&key(student), changes(i as i64)).await.unwrap();
        }

        let page = storage
            .list_grades_with_pagination(GradeListQuery {
                page: Some(3),
                size: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].student_id, "a");
    }

    #[tokio::test]
    async fn test_pagination_clamps_huge_page() {
        let storage = MemoryStorage::new();
        storage.upsert_grade(&key("a"), changes(0)).await.unwrap();

        let page = storage
            .list_grades_with_pagination(GradeListQuery {
                page: Some(i64::MAX),
                size: Some(i64::MAX),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.page, crate::models::common::pagination::MAX_PAGE);
        assert_eq!(page.pagination.page_size, 100);
        assert_eq!(page.pagination.total, 1);
    }

    #[tokio::test]
    async fn test_resolve_subject_names() {
        let storage = MemoryStorage::new();
        storage.insert_subject("math", "Matematika");
        let names = storage
            .resolve_subject_names(&["math".to_string(), "bio".to_string()])
            .await
            .unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names["math"], "Matematika");
    }
}
