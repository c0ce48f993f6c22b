//! PostgreSQL-backed [`ReviewRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ReviewListQuery, ReviewPage, ReviewRepository, ReviewRepositoryError};
use crate::domain::{FeedbackStatus, ParseLabelError, Rating, Review, ReviewDraft, ReviewId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::models::{NewReviewRow, ReviewFeedbackUpdate, ReviewRow};
use super::pool::{DbPool, PoolError};
use super::schema::reviews;

const EMAIL_CONSTRAINT: &str = "reviews_email_key";

/// Diesel adapter for customer reviews.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReviewRepositoryError {
    map_basic_pool_error(error, ReviewRepositoryError::connection)
}

fn map_diesel_error(error: &diesel::result::Error) -> ReviewRepositoryError {
    map_basic_diesel_error(
        error,
        ReviewRepositoryError::query,
        ReviewRepositoryError::connection,
    )
}

fn row_to_review(row: ReviewRow) -> Result<Review, ReviewRepositoryError> {
    let id = row.id;
    let corrupt = move |detail: String| {
        ReviewRepositoryError::query(format!("review {id} is inconsistent: {detail}"))
    };
    let feedback_status: FeedbackStatus = row
        .feedback_status
        .parse()
        .map_err(|err: ParseLabelError| corrupt(err.to_string()))?;
    let rating = row
        .rating
        .map(|value| u8::try_from(value).map_err(|_| corrupt(format!("rating {value}"))))
        .transpose()?;

    Review::new(ReviewDraft {
        id: ReviewId::from_uuid(id),
        name: row.name,
        email: row.email,
        phone: row.phone,
        rating,
        comment: row.comment,
        feedback_status,
        created_at: row.created_at,
    })
    .map_err(|err| corrupt(err.to_string()))
}

fn rating_column(review: &Review) -> Option<i16> {
    review.rating().map(|rating| i16::from(rating.value()))
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn insert(&self, review: &Review) -> Result<(), ReviewRepositoryError> {
        let row = NewReviewRow {
            id: *review.id().as_uuid(),
            name: review.name(),
            email: review.email().as_str(),
            phone: review.phone(),
            rating: rating_column(review),
            comment: review.comment(),
            feedback_status: review.feedback_status().as_str(),
            created_at: review.created_at(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(reviews::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| match unique_violation(&err) {
                Some(EMAIL_CONSTRAINT) => {
                    ReviewRepositoryError::duplicate_email(review.email().as_str())
                }
                _ => map_diesel_error(&err),
            })
    }

    async fn update(
        &self,
        review: &Review,
        expected_status: FeedbackStatus,
    ) -> Result<bool, ReviewRepositoryError> {
        let changes = ReviewFeedbackUpdate {
            rating: rating_column(review),
            comment: review.comment(),
            feedback_status: review.feedback_status().as_str(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(
            reviews::table
                .filter(reviews::id.eq(review.id().as_uuid()))
                .filter(reviews::feedback_status.eq(expected_status.as_str())),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(&err))?;
        Ok(affected > 0)
    }

    async fn find_by_id(&self, id: &ReviewId) -> Result<Option<Review>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ReviewRow> = reviews::table
            .find(*id.as_uuid())
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;
        row.map(row_to_review).transpose()
    }

    async fn list(&self, query: &ReviewListQuery) -> Result<ReviewPage, ReviewRepositoryError> {
        let offset = i64::try_from(query.offset)
            .map_err(|_| ReviewRepositoryError::query("offset exceeds column range"))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut count = reviews::table.count().into_boxed();
        let mut page = reviews::table
            .select(ReviewRow::as_select())
            .order((reviews::created_at.desc(), reviews::id.desc()))
            .limit(i64::from(query.limit))
            .offset(offset)
            .into_boxed();
        if let Some(since) = query.since {
            count = count.filter(reviews::created_at.ge(since));
            page = page.filter(reviews::created_at.ge(since));
        }

        let total: i64 = count
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        let rows: Vec<ReviewRow> = page
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;

        Ok(ReviewPage {
            total: u64::try_from(total).unwrap_or_default(),
            items: rows
                .into_iter()
                .map(row_to_review)
                .collect::<Result<_, _>>()?,
        })
    }

    async fn list_ratings(&self) -> Result<Vec<Rating>, ReviewRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let values: Vec<Option<i16>> = reviews::table
            .select(reviews::rating)
            .filter(reviews::rating.is_not_null())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err))?;
        values
            .into_iter()
            .flatten()
            .map(|value| {
                u8::try_from(value)
                    .ok()
                    .and_then(|value| Rating::new(value).ok())
                    .ok_or_else(|| ReviewRepositoryError::query(format!("stored rating {value}")))
            })
            .collect()
    }
}
