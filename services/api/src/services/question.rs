//! Community questions and their answers

use chrono::Utc;
use common::store::{DEFAULTED, Filter, Order};
use uuid::Uuid;

use super::{ensure_owner_or_admin, fetch, requester};
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::question::{Answer, AnswerRequest, Question, QuestionDetail, QuestionRequest};
use crate::repositories::Repositories;
use crate::validation::require;

#[derive(Clone)]
pub struct QuestionService {
    repos: Repositories,
}

impl QuestionService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(&self, caller: &AuthUser, req: QuestionRequest) -> ApiResult<Question> {
        require("Title", &req.title).map_err(ApiError::BadRequest)?;
        require("Content", &req.content).map_err(ApiError::BadRequest)?;
        let user = requester(&self.repos, caller).await?;

        let question = Question {
            id: 0,
            uuid: Uuid::nil(),
            user_id: user.id,
            title: req.title.trim().to_string(),
            content: req.content,
            created_at: Utc::now(),
        };

        Ok(self.repos.questions.create_with_omit(DEFAULTED, question).await?)
    }

    pub async fn list(&self) -> ApiResult<Vec<Question>> {
        Ok(self
            .repos
            .questions
            .find(Filter::new().order_by("created_at", Order::Desc))
            .await?)
    }

    /// Question with its answers, oldest first
    pub async fn get(&self, uuid: Uuid) -> ApiResult<QuestionDetail> {
        let question = fetch(&self.repos.questions, uuid, "Question").await?;
        let answers = self
            .repos
            .answers
            .find(
                Filter::new()
                    .eq("question_id", question.id)
                    .order_by("created_at", Order::Asc),
            )
            .await?;

        Ok(QuestionDetail { question, answers })
    }

    pub async fn delete(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<()> {
        let user = requester(&self.repos, caller).await?;
        let question = fetch(&self.repos.questions, uuid, "Question").await?;
        ensure_owner_or_admin(question.user_id, &user)?;

        self.repos.questions.delete(&question).await?;
        Ok(())
    }

    pub async fn answer(&self, caller: &AuthUser, uuid: Uuid, req: AnswerRequest) -> ApiResult<Answer> {
        require("Content", &req.content).map_err(ApiError::BadRequest)?;
        let user = requester(&self.repos, caller).await?;
        let question = fetch(&self.repos.questions, uuid, "Question").await?;

        let answer = Answer {
            id: 0,
            uuid: Uuid::nil(),
            user_id: user.id,
            question_id: question.id,
            content: req.content,
            created_at: Utc::now(),
        };

        Ok(self.repos.answers.create_with_omit(DEFAULTED, answer).await?)
    }

    pub async fn delete_answer(&self, caller: &AuthUser, uuid: Uuid) -> ApiResult<()> {
        let user = requester(&self.repos, caller).await?;
        let answer = fetch(&self.repos.answers, uuid, "Answer").await?;
        ensure_owner_or_admin(answer.user_id, &user)?;

        self.repos.answers.delete(&answer).await?;
        Ok(())
    }
}
