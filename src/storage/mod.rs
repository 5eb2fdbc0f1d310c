//! 存储层
//!
//! - `GradeStore` / `SubjectDirectory`: 成绩账本依赖的协作者
//! - `Storage`: 服务层使用的用户与科目管理

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{
    grades::{
        entities::{GradeChanges, GradeFilter, GradeKey, GradeRecord, UpsertOutcome},
        requests::GradeListQuery,
        responses::GradeListResponse,
    },
    subjects::{
        entities::Subject,
        requests::{CreateSubjectRequest, SubjectListQuery, UpdateSubjectRequest},
        responses::SubjectListResponse,
    },
    users::{
        entities::User,
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};

use crate::errors::Result;

pub mod memory;
pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait GradeStore: Send + Sync {
    // 按复合键查找成绩
    async fn find_grade(&self, key: &GradeKey) -> Result<Option<GradeRecord>>;
    // 按条件查找成绩，按 updated_at、year、semester 倒序
    async fn find_grades(&self, filter: &GradeFilter) -> Result<Vec<GradeRecord>>;
    // 按复合键新建或更新成绩，返回实际执行的操作
    async fn upsert_grade(&self, key: &GradeKey, changes: GradeChanges) -> Result<UpsertOutcome>;
    // 分页列出成绩
    async fn list_grades_with_pagination(&self, query: GradeListQuery)
    -> Result<GradeListResponse>;
}

#[async_trait::async_trait]
pub trait SubjectDirectory: Send + Sync {
    // 批量解析科目名称，无法解析的 id 不出现在结果中
    async fn resolve_subject_names(&self, ids: &[String]) -> Result<HashMap<String, String>>;
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户，password 字段为已哈希的密码
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 科目管理方法
    async fn create_subject(&self, subject: CreateSubjectRequest) -> Result<Subject>;
    async fn get_subject_by_id(&self, id: &str) -> Result<Option<Subject>>;
    async fn get_subject_by_code(&self, code: &str) -> Result<Option<Subject>>;
    async fn list_subjects_with_pagination(
        &self,
        query: SubjectListQuery,
    ) -> Result<SubjectListResponse>;
    async fn update_subject(
        &self,
        id: &str,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>>;
    async fn delete_subject(&self, id: &str) -> Result<bool>;
}

pub async fn create_storage() -> Result<Arc<sea_orm_storage::SeaOrmStorage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
