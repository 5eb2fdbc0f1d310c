//! 成绩账本
//!
//! 负责把三项成绩换算为总评和等级，并以 (student_id, subject_id, semester, year)
//! 为复合键批量 upsert。读取时为每条成绩补全科目名称。
//!
//! 账本本身不持有可变状态，同一复合键上的并发写入由存储层保证唯一。

mod compute;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tracing::{debug, error, info, warn};

pub use compute::{compute_derived, round_half_up_2};

use crate::config::{GradingConfig, MissingScorePolicy};
use crate::errors::{Result, SiakadError};
use crate::models::grades::{
    entities::{GradeChanges, GradeFilter, GradeKey, GradeRecord, GradeView, UpsertOutcome},
    requests::GradeSubmission,
    responses::BatchResult,
};
use crate::storage::{GradeStore, SubjectDirectory};

/// 单次批量录入的默认上限
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

/// 时间来源
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct GradeLedger {
    store: Arc<dyn GradeStore>,
    subjects: Arc<dyn SubjectDirectory>,
    policy: MissingScorePolicy,
    max_batch_size: usize,
    clock: Clock,
}

impl GradeLedger {
    pub fn new(
        store: Arc<dyn GradeStore>,
        subjects: Arc<dyn SubjectDirectory>,
        policy: MissingScorePolicy,
    ) -> Self {
        Self {
            store,
            subjects,
            policy,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn from_config(
        store: Arc<dyn GradeStore>,
        subjects: Arc<dyn SubjectDirectory>,
        config: &GradingConfig,
    ) -> Self {
        Self::new(store, subjects, config.missing_score_policy)
            .with_max_batch_size(config.max_batch_size)
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size.max(1);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> MissingScorePolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<dyn GradeStore> {
        &self.store
    }

    /// 批量录入成绩
    ///
    /// 所有条目先全部校验，任一条不合法则整批拒绝且不写入。
    /// 写入阶段每条独立 upsert 并发执行，全部尝试完毕后再汇总；
    /// 只要有一条写入失败，整个调用返回存储错误。
    pub async fn apply_batch(&self, items: Vec<GradeSubmission>) -> Result<BatchResult> {
        if items.is_empty() {
            return Err(SiakadError::empty_batch("Grade batch contains no items"));
        }
        if items.len() > self.max_batch_size {
            return Err(SiakadError::validation(format!(
                "Grade batch has {} items, the limit is {}",
                items.len(),
                self.max_batch_size
            )));
        }

        let now = (self.clock)();
        let writes = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| self.prepare_write(index, item, now))
            .collect::<Result<Vec<_>>>()?;

        let total = writes.len();
        let outcomes = join_all(
            writes
                .into_iter()
                .map(|(key, changes)| async move {
                    let outcome = self.store.upsert_grade(&key, changes).await;
                    (key, outcome)
                }),
        )
        .await;

        let mut result = BatchResult::default();
        let mut failures = Vec::new();
        for (key, outcome) in outcomes {
            match outcome {
                Ok(UpsertOutcome::Created) => result.upserted += 1,
                Ok(UpsertOutcome::Modified) => result.modified += 1,
                Err(e) => {
                    error!(
                        "Grade write failed for student {} subject {} ({}/{}): {}",
                        key.student_id, key.subject_id, key.semester, key.year, e
                    );
                    failures.push(e);
                }
            }
        }

        if let Some(first) = failures.first() {
            return Err(SiakadError::database_operation(format!(
                "{} of {} grade writes failed: {}",
                failures.len(),
                total,
                first.message()
            )));
        }

        info!(
            "Grade batch applied: {} created, {} modified",
            result.upserted, result.modified
        );
        Ok(result)
    }

    /// 查询某个学生的成绩并补全科目名称
    pub async fn list_for_student(
        &self,
        student_id: &str,
        semester: Option<i64>,
        year: Option<i64>,
    ) -> Result<Vec<GradeView>> {
        let student_id = student_id.trim();
        if student_id.is_empty() {
            return Err(SiakadError::validation("student_id is required"));
        }
        let filter = GradeFilter {
            student_id: student_id.to_string(),
            semester: semester.map(validate_semester).transpose()?,
            year: year.map(validate_year).transpose()?,
        };

        let mut records = self.store.find_grades(&filter).await?;
        records.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then(b.year.cmp(&a.year))
                .then(b.semester.cmp(&a.semester))
        });

        let subject_ids: Vec<String> = records
            .iter()
            .map(|record| record.subject_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let resolved = if subject_ids.is_empty() {
            HashMap::new()
        } else {
            match self.subjects.resolve_subject_names(&subject_ids).await {
                Ok(names) => names,
                Err(e) => {
                    warn!("Subject name lookup failed, falling back to stored labels: {e}");
                    HashMap::new()
                }
            }
        };

        debug!(
            "Loaded {} grades for student {}, {} subject names resolved",
            records.len(),
            student_id,
            resolved.len()
        );

        Ok(records
            .into_iter()
            .map(|record| {
                let subject_name = resolve_subject_name(&resolved, &record);
                GradeView {
                    record,
                    subject_name,
                }
            })
            .collect())
    }

    // 校验单条输入并生成写入内容
    fn prepare_write(
        &self,
        index: usize,
        item: GradeSubmission,
        now: DateTime<Utc>,
    ) -> Result<(GradeKey, GradeChanges)> {
        let invalid = |reason: String| SiakadError::validation(format!("items[{index}]: {reason}"));

        let student_id = item.student_id.trim();
        if student_id.is_empty() {
            return Err(invalid("student_id is required".into()));
        }
        let subject_id = item.subject_id.trim();
        if subject_id.is_empty() {
            return Err(invalid("subject_id is required".into()));
        }
        let semester = validate_semester(item.semester).map_err(|e| invalid(e.message().into()))?;
        let year = validate_year(item.year).map_err(|e| invalid(e.message().into()))?;

        let assignments = self.resolve_score(item.assignments, "assignments", index)?;
        let midterm = self.resolve_score(item.midterm, "midterm", index)?;
        let final_exam = self.resolve_score(item.final_exam, "final", index)?;
        let (total, grade) = compute_derived(assignments, midterm, final_exam)
            .map_err(|e| invalid(e.message().into()))?;

        Ok((
            GradeKey {
                student_id: student_id.to_string(),
                subject_id: subject_id.to_string(),
                semester,
                year,
            },
            GradeChanges {
                assignments,
                midterm,
                final_exam,
                total,
                grade,
                teacher_id: item.teacher_id,
                now,
            },
        ))
    }

    fn resolve_score(&self, score: Option<f64>, field: &str, index: usize) -> Result<f64> {
        match (score, self.policy) {
            (Some(value), _) => Ok(value),
            (None, MissingScorePolicy::TreatAsZero) => Ok(0.0),
            (None, MissingScorePolicy::Reject) => Err(SiakadError::validation(format!(
                "items[{index}]: {field} is missing or not a number"
            ))),
        }
    }
}

fn validate_semester(semester: i64) -> Result<i32> {
    match semester {
        1 | 2 => Ok(semester as i32),
        _ => Err(SiakadError::validation(format!(
            "semester must be 1 or 2, got {semester}"
        ))),
    }
}

fn validate_year(year: i64) -> Result<i32> {
    i32::try_from(year)
        .ok()
        .filter(|year| *year > 0)
        .ok_or_else(|| SiakadError::validation(format!("year must be positive, got {year}")))
}

/// 科目名称回退顺序：目录解析结果、历史 subject_name、历史 subject、subject_id、空串
///
/// 空白字符串在每一步都视为缺失。
pub fn resolve_subject_name(resolved: &HashMap<String, String>, record: &GradeRecord) -> String {
    let present = |value: Option<&String>| value.filter(|s| !s.trim().is_empty()).cloned();

    present(resolved.get(&record.subject_id))
        .or_else(|| present(record.stored_subject_name.as_ref()))
        .or_else(|| present(record.stored_subject.as_ref()))
        .or_else(|| present(Some(&record.subject_id)))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grades::entities::LetterGrade;
    use crate::models::grades::{requests::GradeListQuery, responses::GradeListResponse};
    use crate::storage::memory::MemoryStorage;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    fn submission(student: &str, subject: &str, scores: [Option<f64>; 3]) -> GradeSubmission {
        GradeSubmission {
            student_id: student.into(),
            subject_id: subject.into(),
            semester: 1,
            year: 2026,
            assignments: scores[0],
            midterm: scores[1],
            final_exam: scores[2],
            teacher_id: "t-1".into(),
        }
    }

    fn full(student: &str, subject: &str, a: f64, m: f64, f: f64) -> GradeSubmission {
        submission(student, subject, [Some(a), Some(m), Some(f)])
    }

    // 每次调用前进一秒的时钟
    fn ticking_clock() -> Clock {
        let base = Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap();
        let ticks = Arc::new(AtomicI64::new(0));
        Arc::new(move || base + chrono::TimeDelta::seconds(ticks.fetch_add(1, Ordering::SeqCst)))
    }

    fn ledger_over(storage: &Arc<MemoryStorage>) -> GradeLedger {
        GradeLedger::new(
            storage.clone(),
            storage.clone(),
            MissingScorePolicy::TreatAsZero,
        )
        .with_clock(ticking_clock())
    }

    fn record(subject: &str, semester: i32, year: i32, updated_secs: i64) -> GradeRecord {
        let at = Utc.timestamp_opt(1_780_000_000 + updated_secs, 0).unwrap();
        GradeRecord {
            id: 0,
            student_id: "s1".into(),
            subject_id: subject.into(),
            semester,
            year,
            assignments: 80.0,
            midterm: 80.0,
            final_exam: 80.0,
            total: 80.0,
            grade: LetterGrade::B,
            teacher_id: "t-1".into(),
            stored_subject_name: None,
            stored_subject: None,
            created_at: at,
            updated_at: at,
        }
    }

    /// 对指定科目的写入返回错误，并记录尝试次数
    struct FlakyStore {
        inner: MemoryStorage,
        failing_subject: String,
        attempts: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl GradeStore for FlakyStore {
        async fn find_grade(&self, key: &GradeKey) -> Result<Option<GradeRecord>> {
            self.inner.find_grade(key).await
        }

        async fn find_grades(&self, filter: &GradeFilter) -> Result<Vec<GradeRecord>> {
            self.inner.find_grades(filter).await
        }

        async fn upsert_grade(
            &self,
            key: &GradeKey,
            changes: GradeChanges,
        ) -> Result<UpsertOutcome> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if key.subject_id == self.failing_subject {
                return Err(SiakadError::database_connection("connection reset"));
            }
            self.inner.upsert_grade(key, changes).await
        }

        async fn list_grades_with_pagination(
            &self,
            query: GradeListQuery,
        ) -> Result<GradeListResponse> {
            self.inner.list_grades_with_pagination(query).await
        }
    }

    /// 记录调用参数的科目目录
    #[derive(Default)]
    struct RecordingDirectory {
        names: HashMap<String, String>,
        calls: Mutex<Vec<Vec<String>>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl SubjectDirectory for RecordingDirectory {
        async fn resolve_subject_names(&self, ids: &[String]) -> Result<HashMap<String, String>> {
            self.calls.lock().unwrap().push(ids.to_vec());
            if self.fail {
                return Err(SiakadError::database_connection("directory offline"));
            }
            Ok(ids
                .iter()
                .filter_map(|id| self.names.get(id).map(|name| (id.clone(), name.clone())))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_single_item_creates_record() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ledger_over(&storage);

        let result = ledger
            .apply_batch(vec![full("s1", "math", 80.0, 70.0, 90.0)])
            .await
            .unwrap();
        assert_eq!(result, BatchResult { upserted: 1, modified: 0 });

        let key = GradeKey {
            student_id: "s1".into(),
            subject_id: "math".into(),
            semester: 1,
            year: 2026,
        };
        let stored = storage.find_grade(&key).await.unwrap().unwrap();
        assert_eq!(stored.total, 80.0);
        assert_eq!(stored.grade, LetterGrade::B);
        assert_eq!(stored.teacher_id, "t-1");
        assert_eq!(stored.created_at, stored.updated_at);
    }

    #[tokio::test]
    async fn test_resubmission_modifies_and_keeps_created_at() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ledger_over(&storage);
        let item = full("s1", "math", 80.0, 70.0, 90.0);

        let first = ledger.apply_batch(vec![item.clone()]).await.unwrap();
        assert_eq!(first, BatchResult { upserted: 1, modified: 0 });
        let before = storage.find_grades(&GradeFilter {
            student_id: "s1".into(),
            ..Default::default()
        })
        .await
        .unwrap();

        let second = ledger.apply_batch(vec![item]).await.unwrap();
        assert_eq!(second, BatchResult { upserted: 0, modified: 1 });
        let after = storage.find_grades(&GradeFilter {
            student_id: "s1".into(),
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(storage.grade_count(), 1);
        assert_eq!(after[0].created_at, before[0].created_at);
        assert!(after[0].updated_at > before[0].updated_at);
        assert_eq!(after[0].total, before[0].total);
    }

    #[tokio::test]
    async fn test_update_replaces_scores_and_teacher() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ledger_over(&storage);
        ledger
            .apply_batch(vec![full("s1", "math", 50.0, 50.0, 50.0)])
            .await
            .unwrap();

        let mut regrade = full("s1", "math", 90.0, 90.0, 90.0);
        regrade.teacher_id = "t-2".into();
        ledger.apply_batch(vec![regrade]).await.unwrap();

        let views = ledger.list_for_student("s1", None, None).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].record.total, 90.0);
        assert_eq!(views[0].record.grade, LetterGrade::A);
        assert_eq!(views[0].record.teacher_id, "t-2");
    }

    #[tokio::test]
    async fn test_batch_order_does_not_change_outcome() {
        let items = vec![
            full("s1", "math", 80.0, 70.0, 90.0),
            full("s2", "math", 60.0, 60.0, 60.0),
            full("s1", "bio", 95.0, 90.0, 88.0),
        ];
        let mut reversed = items.clone();
        reversed.reverse();

        let mut snapshots = Vec::new();
        for batch in [items, reversed] {
            let storage = Arc::new(MemoryStorage::new());
            let ledger = ledger_over(&storage);
            let result = ledger.apply_batch(batch).await.unwrap();
            assert_eq!(result, BatchResult { upserted: 3, modified: 0 });

            let mut rows = Vec::new();
            for student in ["s1", "s2"] {
                for view in ledger.list_for_student(student, None, None).await.unwrap() {
                    rows.push((
                        view.record.student_id,
                        view.record.subject_id,
                        view.record.total,
                        view.record.grade,
                    ));
                }
            }
            rows.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
            snapshots.push(rows);
        }
        assert_eq!(snapshots[0], snapshots[1]);
    }

    #[tokio::test]
    async fn test_same_key_twice_in_one_batch_keeps_one_record() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ledger_over(&storage);
        let result = ledger
            .apply_batch(vec![
                full("s1", "math", 10.0, 10.0, 10.0),
                full("s1", "math", 20.0, 20.0, 20.0),
            ])
            .await
            .unwrap();
        assert_eq!(result, BatchResult { upserted: 1, modified: 1 });
        assert_eq!(storage.grade_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected_without_writes() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ledger_over(&storage);
        let err = ledger.apply_batch(Vec::new()).await.unwrap_err();
        assert!(matches!(err, SiakadError::EmptyBatch(_)));
        assert!(err.is_validation());
        assert_eq!(storage.grade_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_item_rejects_whole_batch() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ledger_over(&storage);

        let mut bad_semester = full("s2", "math", 1.0, 1.0, 1.0);
        bad_semester.semester = 3;
        let err = ledger
            .apply_batch(vec![full("s1", "math", 1.0, 1.0, 1.0), bad_semester])
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.message().contains("items[1]"));
        assert_eq!(storage.grade_count(), 0);

        let err = ledger
            .apply_batch(vec![full("  ", "math", 1.0, 1.0, 1.0)])
            .await
            .unwrap_err();
        assert!(err.message().contains("student_id"));

        let mut bad_year = full("s1", "math", 1.0, 1.0, 1.0);
        bad_year.year = 0;
        assert!(ledger.apply_batch(vec![bad_year]).await.is_err());
        assert_eq!(storage.grade_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_batch_is_rejected() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ledger_over(&storage).with_max_batch_size(2);
        let items = (0..3)
            .map(|i| full(&format!("s{i}"), "math", 1.0, 1.0, 1.0))
            .collect();
        let err = ledger.apply_batch(items).await.unwrap_err();
        assert!(matches!(err, SiakadError::Validation(_)));
        assert_eq!(storage.grade_count(), 0);
    }

    #[tokio::test]
    async fn test_unrepresentable_score_rejects_batch() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ledger_over(&storage);
        let err = ledger
            .apply_batch(vec![
                full("s1", "math", 80.0, 80.0, 80.0),
                full("s2", "math", 1e308, 80.0, 80.0),
            ])
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.message().starts_with("items[1]: assignments"));
        assert_eq!(storage.grade_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_scores_default_to_zero() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ledger_over(&storage);
        ledger
            .apply_batch(vec![submission("s1", "math", [Some(90.0), None, None])])
            .await
            .unwrap();

        let views = ledger.list_for_student("s1", None, None).await.unwrap();
        assert_eq!(views[0].record.midterm, 0.0);
        assert_eq!(views[0].record.final_exam, 0.0);
        assert_eq!(views[0].record.total, 30.0);
        assert_eq!(views[0].record.grade, LetterGrade::E);
    }

    #[tokio::test]
    async fn test_reject_policy_refuses_missing_scores() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = GradeLedger::new(storage.clone(), storage.clone(), MissingScorePolicy::Reject);
        let err = ledger
            .apply_batch(vec![submission("s1", "math", [Some(90.0), Some(80.0), None])])
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.message().contains("final"));
        assert_eq!(storage.grade_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_write_fails_call_after_attempting_all() {
        let store = Arc::new(FlakyStore {
            inner: MemoryStorage::new(),
            failing_subject: "bio".into(),
            attempts: AtomicUsize::new(0),
        });
        let ledger = GradeLedger::new(
            store.clone(),
            Arc::new(RecordingDirectory::default()),
            MissingScorePolicy::TreatAsZero,
        );

        let err = ledger
            .apply_batch(vec![
                full("s1", "math", 80.0, 80.0, 80.0),
                full("s1", "bio", 80.0, 80.0, 80.0),
                full("s2", "math", 80.0, 80.0, 80.0),
            ])
            .await
            .unwrap_err();

        assert!(err.is_storage());
        assert!(err.message().contains("1 of 3"));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
        // 其余写入已被尝试并落库
        assert_eq!(store.inner.grade_count(), 2);
    }

    #[tokio::test]
    async fn test_list_orders_by_updated_at_then_year_then_semester() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert_record(GradeRecord { id: 1, ..record("math", 1, 2025, 10) });
        storage.insert_record(GradeRecord { id: 2, ..record("bio", 2, 2026, 30) });
        storage.insert_record(GradeRecord { id: 3, ..record("art", 1, 2026, 20) });
        storage.insert_record(GradeRecord { id: 4, ..record("pe", 2, 2026, 20) });
        storage.insert_record(GradeRecord { id: 5, ..record("ict", 2, 2025, 20) });
        let ledger = ledger_over(&storage);

        let views = ledger.list_for_student("s1", None, None).await.unwrap();
        let subjects: Vec<&str> = views.iter().map(|v| v.record.subject_id.as_str()).collect();
        assert_eq!(subjects, ["bio", "pe", "art", "ict", "math"]);

        let filtered = ledger.list_for_student("s1", Some(2), Some(2026)).await.unwrap();
        assert_eq!(filtered.len(), 2);

        assert!(ledger.list_for_student("s1", Some(3), None).await.is_err());
        assert!(ledger.list_for_student(" ", None, None).await.is_err());
    }

    #[tokio::test]
    async fn test_list_resolves_names_once_with_distinct_ids() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert_record(GradeRecord { id: 1, ..record("math", 1, 2026, 1) });
        storage.insert_record(GradeRecord { id: 2, ..record("math", 2, 2026, 2) });
        storage.insert_record(GradeRecord { id: 3, ..record("bio", 1, 2026, 3) });
        let directory = Arc::new(RecordingDirectory {
            names: HashMap::from([("math".to_string(), "Matematika".to_string())]),
            ..Default::default()
        });
        let ledger = GradeLedger::new(storage, directory.clone(), MissingScorePolicy::TreatAsZero);

        let views = ledger.list_for_student("s1", None, None).await.unwrap();
        let calls = directory.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![vec!["bio".to_string(), "math".to_string()]]);

        let names: Vec<&str> = views.iter().map(|v| v.subject_name.as_str()).collect();
        assert_eq!(names, ["bio", "Matematika", "Matematika"]);
    }

    #[tokio::test]
    async fn test_list_uses_legacy_labels_when_unresolved() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert_record(GradeRecord {
            id: 1,
            stored_subject_name: Some("Bahasa Indonesia".into()),
            stored_subject: Some("BIND".into()),
            ..record("gone-1", 1, 2026, 3)
        });
        storage.insert_record(GradeRecord {
            id: 2,
            stored_subject_name: Some("   ".into()),
            stored_subject: Some("Sejarah".into()),
            ..record("gone-2", 1, 2026, 2)
        });
        storage.insert_record(GradeRecord { id: 3, ..record("gone-3", 1, 2026, 1) });
        let ledger = ledger_over(&storage);

        let views = ledger.list_for_student("s1", None, None).await.unwrap();
        let names: Vec<&str> = views.iter().map(|v| v.subject_name.as_str()).collect();
        assert_eq!(names, ["Bahasa Indonesia", "Sejarah", "gone-3"]);
    }

    #[tokio::test]
    async fn test_directory_failure_does_not_fail_read() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert_record(GradeRecord {
            id: 1,
            stored_subject_name: Some("Fisika".into()),
            ..record("phys", 1, 2026, 1)
        });
        let directory = Arc::new(RecordingDirectory {
            fail: true,
            ..Default::default()
        });
        let ledger = GradeLedger::new(storage, directory, MissingScorePolicy::TreatAsZero);

        let views = ledger.list_for_student("s1", None, None).await.unwrap();
        assert_eq!(views[0].subject_name, "Fisika");
    }

    #[tokio::test]
    async fn test_empty_result_skips_directory() {
        let storage = Arc::new(MemoryStorage::new());
        let directory = Arc::new(RecordingDirectory::default());
        let ledger = GradeLedger::new(storage, directory.clone(), MissingScorePolicy::TreatAsZero);

        assert!(ledger.list_for_student("nobody", None, None).await.unwrap().is_empty());
        assert!(directory.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_subject_name_fallback_chain() {
        let mut rec = record("math", 1, 2026, 0);
        let resolved = HashMap::from([("math".to_string(), "Matematika".to_string())]);
        assert_eq!(resolve_subject_name(&resolved, &rec), "Matematika");

        let blank = HashMap::from([("math".to_string(), " ".to_string())]);
        rec.stored_subject = Some("MTK".into());
        assert_eq!(resolve_subject_name(&blank, &rec), "MTK");

        rec.subject_id = "".into();
        rec.stored_subject = None;
        assert_eq!(resolve_subject_name(&HashMap::new(), &rec), "");
    }
}
