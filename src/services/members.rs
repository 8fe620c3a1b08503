use std::sync::Arc;

use crate::{
    db::MemberRepository,
    error::{AppError, AppResult},
    models::{CreateMember, Member},
};

#[derive(Clone)]
pub struct MemberService {
    members: Arc<dyn MemberRepository>,
}

impl MemberService {
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    pub async fn create_member(&self, request: CreateMember) -> AppResult<Member> {
        request.validate().map_err(AppError::InvalidInput)?;

        match self.members.create_member(&request).await {
            Ok(member) => {
                tracing::info!(member_id = member.id, "Member created");
                Ok(member)
            }
            Err(AppError::Database(sqlx::Error::Database(e))) if e.is_unique_violation() => Err(
                AppError::InvalidInput(format!("Email already registered: {}", request.email)),
            ),
            Err(e) => Err(e),
        }
    }

    pub async fn get_member(&self, member_id: i64) -> AppResult<Member> {
        self.members
            .find_member(member_id)
            .await?
            .ok_or(AppError::MemberNotFound(member_id))
    }
}
