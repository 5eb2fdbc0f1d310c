pub mod list;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::ledger::GradeLedger;
use crate::models::grades::requests::{GradeBatchRequest, GradeListQuery, StudentGradeQuery};

pub struct GradeService {
    ledger: Option<Arc<GradeLedger>>,
}

impl GradeService {
    pub fn new_lazy() -> Self {
        Self { ledger: None }
    }

    pub(crate) fn get_ledger(&self, request: &HttpRequest) -> ActixResult<Arc<GradeLedger>> {
        if let Some(ledger) = &self.ledger {
            return Ok(ledger.clone());
        }
        request
            .app_data::<web::Data<GradeLedger>>()
            .map(|data| data.clone().into_inner())
            .ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("Grade ledger not found in app data")
            })
    }

    // 批量录入成绩
    pub async fn submit_batch(
        &self,
        batch: GradeBatchRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_batch(self, batch, request).await
    }

    // 当前学生自己的成绩
    pub async fn list_my_grades(
        &self,
        query: StudentGradeQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_my_grades(self, query, request).await
    }

    // 指定学生的成绩
    pub async fn list_student_grades(
        &self,
        student_id: &str,
        query: StudentGradeQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_student_grades(self, student_id, query, request).await
    }

    // 成绩分页列表（教师/管理员）
    pub async fn list_grades(
        &self,
        query: GradeListQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_grades(self, query, request).await
    }
}
