//! SQLite implementation of [`ContentRepository`].
//!
//! Three tables hold story rows, each unique on `(biography_id, question_id)`:
//!
//! - `biography_core_stories`: the three core questions
//! - `biography_one_liners`: every other flat question
//! - `biography_stories`: categorized stories with a character count

use crate::error::db_error;
use async_trait::async_trait;
use biography_core::Result;
use biography_core::content::catalogue::{
    UNCATEGORIZED, category_of, is_core_story, is_known_category,
};
use biography_core::content::{
    AnswerInput, ContentItem, ContentRepository, OneLiners, OneLinersInput, Stories,
    StoriesInput,
};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

/// Target collection of a synced answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoryTable {
    Core,
    OneLiner,
    Categorized,
}

impl StoryTable {
    fn name(self) -> &'static str {
        match self {
            Self::Core => "biography_core_stories",
            Self::OneLiner => "biography_one_liners",
            Self::Categorized => "biography_stories",
        }
    }

    fn text_column(self) -> &'static str {
        match self {
            Self::OneLiner => "answer",
            Self::Core | Self::Categorized => "content",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncAction {
    Inserted,
    Updated,
    Deleted,
    Unchanged,
}

#[derive(Debug, sqlx::FromRow)]
struct AnswerRow {
    biography_id: String,
    question_id: String,
    answer: String,
    is_hidden: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct StoryRow {
    biography_id: String,
    question_id: String,
    category_id: String,
    answer: String,
    is_hidden: bool,
}

/// `SELECT ... FROM <table> WHERE <text> is not blank AND biography_id IN (...)`.
fn batch_query<'a>(
    table: StoryTable,
    extra_columns: &str,
    biography_ids: &'a [String],
) -> QueryBuilder<'a, Sqlite> {
    let column = table.text_column();
    let mut builder = QueryBuilder::new(format!(
        "SELECT biography_id, question_id{extra_columns}, {column} AS answer, is_hidden \
         FROM {} WHERE {column} IS NOT NULL AND TRIM({column}) != '' AND biography_id IN (",
        table.name()
    ));
    let mut ids = builder.separated(", ");
    for id in biography_ids {
        ids.push_bind(id.as_str());
    }
    builder.push(")");
    builder
}

/// Story content storage backed by SQLite.
#[derive(Clone)]
pub struct SqliteContentRepository {
    pool: SqlitePool,
}

impl SqliteContentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Applies one answer with diff-to-empty-deletes semantics.
    async fn apply_answer(
        conn: &mut SqliteConnection,
        table: StoryTable,
        biography_id: &str,
        question_id: &str,
        category_id: Option<&str>,
        input: &AnswerInput,
        now: DateTime<Utc>,
    ) -> Result<SyncAction> {
        let name = table.name();
        let column = table.text_column();

        let existing: Option<(String,)> = sqlx::query_as(&format!(
            "SELECT id FROM {name} WHERE biography_id = ? AND question_id = ?"
        ))
        .bind(biography_id)
        .bind(question_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error)?;

        let action = match (input.content(), existing) {
            (None, None) => SyncAction::Unchanged,
            (None, Some((row_id,))) => {
                sqlx::query(&format!("DELETE FROM {name} WHERE id = ?"))
                    .bind(row_id)
                    .execute(&mut *conn)
                    .await
                    .map_err(db_error)?;
                SyncAction::Deleted
            }
            (Some(text), Some((row_id,))) => {
                if table == StoryTable::Categorized {
                    sqlx::query(
                        "UPDATE biography_stories SET content = ?, is_hidden = COALESCE(?, is_hidden), \
                         category_id = ?, character_count = ?, updated_at = ? WHERE id = ?",
                    )
                    .bind(text)
                    .bind(input.hidden())
                    .bind(category_id)
                    .bind(text.chars().count() as i64)
                    .bind(now)
                    .bind(row_id)
                    .execute(&mut *conn)
                    .await
                    .map_err(db_error)?;
                } else {
                    let sql = format!(
                        "UPDATE {name} SET {column} = ?, is_hidden = COALESCE(?, is_hidden), \
                         updated_at = ? WHERE id = ?"
                    );
                    sqlx::query(&sql)
                        .bind(text)
                        .bind(input.hidden())
                        .bind(now)
                        .bind(row_id)
                        .execute(&mut *conn)
                        .await
                        .map_err(db_error)?;
                }
                SyncAction::Updated
            }
            (Some(text), None) => {
                let id = Uuid::new_v4().to_string();
                let hidden = input.hidden().unwrap_or(false);
                if table == StoryTable::Categorized {
                    sqlx::query(
                        "INSERT INTO biography_stories (id, biography_id, question_id, category_id, \
                         content, character_count, is_hidden, source, created_at, updated_at) \
                         VALUES (?, ?, ?, ?, ?, ?, ?, 'system', ?, ?)",
                    )
                    .bind(id)
                    .bind(biography_id)
                    .bind(question_id)
                    .bind(category_id)
                    .bind(text)
                    .bind(text.chars().count() as i64)
                    .bind(hidden)
                    .bind(now)
                    .bind(now)
                    .execute(&mut *conn)
                    .await
                    .map_err(db_error)?;
                } else {
                    let sql = format!(
                        "INSERT INTO {name} (id, biography_id, question_id, {column}, is_hidden, \
                         source, created_at, updated_at) VALUES (?, ?, ?, ?, ?, 'system', ?, ?)"
                    );
                    sqlx::query(&sql)
                        .bind(id)
                        .bind(biography_id)
                        .bind(question_id)
                        .bind(text)
                        .bind(hidden)
                        .bind(now)
                        .bind(now)
                        .execute(&mut *conn)
                        .await
                        .map_err(db_error)?;
                }
                SyncAction::Inserted
            }
        };

        tracing::debug!(
            biography_id = %biography_id,
            question_id = %question_id,
            table = name,
            "[ContentRepository] {:?}",
            action
        );
        Ok(action)
    }
}

#[async_trait]
impl ContentRepository for SqliteContentRepository {
    async fn batch_get_one_liners(
        &self,
        biography_ids: &[String],
    ) -> Result<HashMap<String, OneLiners>> {
        if biography_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut core_query = batch_query(StoryTable::Core, "", biography_ids);
        let mut one_liner_query = batch_query(StoryTable::OneLiner, "", biography_ids);
        let (core_rows, one_liner_rows) = tokio::try_join!(
            core_query.build_query_as::<AnswerRow>().fetch_all(&self.pool),
            one_liner_query.build_query_as::<AnswerRow>().fetch_all(&self.pool),
        )
        .map_err(db_error)?;

        let mut result: HashMap<String, OneLiners> = HashMap::new();
        for row in core_rows.into_iter().chain(one_liner_rows) {
            result
                .entry(row.biography_id)
                .or_default()
                .insert(row.question_id, ContentItem::from_row(row.answer, row.is_hidden));
        }
        Ok(result)
    }

    async fn batch_get_stories(
        &self,
        biography_ids: &[String],
    ) -> Result<HashMap<String, Stories>> {
        if biography_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let extra = format!(", COALESCE(category_id, '{UNCATEGORIZED}') AS category_id");
        let mut query = batch_query(StoryTable::Categorized, &extra, biography_ids);
        let rows: Vec<StoryRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        let mut result: HashMap<String, Stories> = HashMap::new();
        for row in rows {
            result
                .entry(row.biography_id)
                .or_default()
                .entry(row.category_id)
                .or_default()
                .insert(row.question_id, ContentItem::from_row(row.answer, row.is_hidden));
        }
        Ok(result)
    }

    async fn sync_one_liners(&self, biography_id: &str, input: &OneLinersInput) -> Result<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for (question_id, answer) in &input.answers {
            let table = if is_core_story(question_id) {
                StoryTable::Core
            } else {
                StoryTable::OneLiner
            };
            Self::apply_answer(&mut *tx, table, biography_id, question_id, None, answer, now)
                .await?;
        }

        tx.commit().await.map_err(db_error)
    }

    async fn sync_stories(&self, biography_id: &str, input: &StoriesInput) -> Result<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for (category_id, questions) in &input.categories {
            let submitted = is_known_category(category_id).then_some(category_id.as_str());
            for (question_id, answer) in questions {
                // A misfiled answer lands in its catalogue category when it has one.
                let (table, category) = if is_core_story(question_id) {
                    (StoryTable::Core, None)
                } else {
                    (StoryTable::Categorized, submitted.or_else(|| category_of(question_id)))
                };
                Self::apply_answer(
                    &mut *tx,
                    table,
                    biography_id,
                    question_id,
                    category,
                    answer,
                    now,
                )
                .await?;
            }
        }

        tx.commit().await.map_err(db_error)
    }
}
