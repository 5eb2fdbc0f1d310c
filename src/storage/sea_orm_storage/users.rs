//! 账号存储：教师、学生与管理员共用一张表
//!
//! 学生账号的 id 即成绩记录中的 `student_id`。邮箱统一以小写保存和匹配。

use super::SeaOrmStorage;
use crate::entity::users::{ActiveModel, Column, Entity as Users, Model};
use crate::errors::{Result, SiakadError};
use crate::models::{
    PaginationInfo, clamp_page,
    users::{
        entities::{User, UserStatus},
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Select, Set,
};

impl SeaOrmStorage {
    async fn find_user(&self, select: Select<Users>) -> Result<Option<User>> {
        select
            .one(&self.db)
            .await
            .map(|model| model.map(Model::into_user))
            .map_err(|e| SiakadError::database_operation(format!("查询用户失败: {e}")))
    }

    /// 创建账号，新账号默认启用
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp_millis();

        let model = ActiveModel {
            username: Set(req.username.trim().to_string()),
            email: Set(req.email.trim().to_lowercase()),
            password_hash: Set(req.password),
            role: Set(req.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            display_name: Set(req
                .display_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        model
            .insert(&self.db)
            .await
            .map(Model::into_user)
            .map_err(|e| SiakadError::database_operation(format!("创建用户失败: {e}")))
    }

    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        self.find_user(Users::find_by_id(id)).await
    }

    /// 登录标识可以是用户名（区分大小写）或邮箱（不区分大小写）
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Ok(None);
        }

        self.find_user(
            Users::find().filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier.to_lowercase())),
            ),
        )
        .await
    }

    /// 分页列出账号，可按角色、状态和关键字筛选
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let (page, size) = clamp_page(query.page, query.size, 10);

        let mut select = Users::find();

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let escaped = escape_like_pattern(search);
            select = select.filter(
                Condition::any()
                    .add(Column::Username.contains(&escaped))
                    .add(Column::Email.contains(escaped.to_lowercase()))
                    .add(Column::DisplayName.contains(&escaped)),
            );
        }

        if let Some(role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| SiakadError::database_operation(format!("查询用户总数失败: {e}")))?;
        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| SiakadError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(UserListResponse {
            items: users.into_iter().map(Model::into_user).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: total.div_ceil(size) as i64,
            },
        })
    }

    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp_millis();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| SiakadError::database_operation(format!("更新最后登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(|e| SiakadError::database_operation(format!("查询用户总数失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::memory_storage;
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use crate::models::users::requests::UserListQuery;

    fn account(username: &str, email: &str, role: UserRole) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "hash".to_string(),
            role,
            display_name: Some(format!("  {username} ")),
        }
    }

    fn query() -> UserListQuery {
        UserListQuery {
            page: None,
            size: None,
            role: None,
            status: None,
            search: None,
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_email_and_display_name() {
        let storage = memory_storage().await;
        let user = storage
            .create_user_impl(account("guru_budi", " Budi@SMKN1.sch.id ", UserRole::Teacher))
            .await
            .unwrap();
        assert_eq!(user.email, "budi@smkn1.sch.id");
        assert_eq!(user.display_name.as_deref(), Some("guru_budi"));
        assert!(user.last_login.is_none());

        // 用户名唯一
        assert!(
            storage
                .create_user_impl(account("guru_budi", "lain@smkn1.sch.id", UserRole::Teacher))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_login_identifier_matches_username_or_email() {
        let storage = memory_storage().await;
        let created = storage
            .create_user_impl(account("siswa_ani", "ani@smkn1.sch.id", UserRole::Student))
            .await
            .unwrap();

        for identifier in ["siswa_ani", " ani@smkn1.sch.id", "ANI@smkn1.sch.id"] {
            let found = storage.get_user_by_username_or_email_impl(identifier).await.unwrap();
            assert_eq!(found.map(|u| u.id), Some(created.id), "{identifier}");
        }
        assert!(storage.get_user_by_username_or_email_impl("SISWA_ANI").await.unwrap().is_none());
        assert!(storage.get_user_by_username_or_email_impl("   ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_last_login() {
        let storage = memory_storage().await;
        let user = storage
            .create_user_impl(account("siswa_eko", "eko@smkn1.sch.id", UserRole::Student))
            .await
            .unwrap();

        assert!(storage.update_last_login_impl(user.id).await.unwrap());
        assert!(!storage.update_last_login_impl(user.id + 100).await.unwrap());
        let reloaded = storage.get_user_by_id_impl(user.id).await.unwrap().unwrap();
        assert!(reloaded.last_login.is_some());
    }

    #[tokio::test]
    async fn test_list_filters_by_role_and_search() {
        let storage = memory_storage().await;
        for (name, role) in [
            ("guru_budi", UserRole::Teacher),
            ("guru_sari", UserRole::Teacher),
            ("siswa_ani", UserRole::Student),
        ] {
            storage
                .create_user_impl(account(name, &format!("{name}@smkn1.sch.id"), role))
                .await
                .unwrap();
        }
        assert_eq!(storage.count_users_impl().await.unwrap(), 3);

        let teachers = storage
            .list_users_with_pagination_impl(UserListQuery {
                role: Some(UserRole::Teacher),
                size: Some(1),
                ..query()
            })
            .await
            .unwrap();
        assert_eq!(teachers.pagination.total, 2);
        assert_eq!(teachers.pagination.total_pages, 2);
        assert_eq!(teachers.items.len(), 1);

        let found = storage
            .list_users_with_pagination_impl(UserListQuery {
                search: Some(" sari ".to_string()),
                ..query()
            })
            .await
            .unwrap();
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].username, "guru_sari");
    }
}
