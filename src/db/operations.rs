use sqlx::PgPool;
use crate::models::*;
use crate::validation::NewInquiry;
use anyhow::Result;

pub struct DatabaseOperations;

impl DatabaseOperations {
    // Inquiry operations
    pub async fn create_inquiry(pool: &PgPool, inquiry: &NewInquiry) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO inquiries (name, phone, affiliation, vehicle_type, car_name, status)
            VALUES ($1, $2, $3, $4, $5, 'new')
            RETURNING id
            "#,
        )
        .bind(&inquiry.name)
        .bind(&inquiry.phone)
        .bind(&inquiry.affiliation)
        .bind(&inquiry.vehicle_type)
        .bind(&inquiry.car_name)
        .fetch_one(pool)
        .await?;

        Ok(id)
    }

    pub async fn list_inquiries(pool: &PgPool) -> Result<Vec<Inquiry>> {
        let rows = sqlx::query_as::<_, InquiryRow>(
            r#"
            SELECT id, name, phone, affiliation, vehicle_type, car_name, status, memo, created_at
            FROM inquiries
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Inquiry::from).collect())
    }

    pub async fn get_inquiry_status(pool: &PgPool, id: i64) -> Result<Option<InquiryStatus>> {
        let status = sqlx::query_scalar::<_, Option<String>>("SELECT status FROM inquiries WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(status.map(|s| InquiryStatus::from_stored(s.as_deref())))
    }

    /// Returns `false` when no inquiry has this id.
    pub async fn update_inquiry(
        pool: &PgPool,
        id: i64,
        status: Option<InquiryStatus>,
        memo: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE inquiries
            SET status = COALESCE($2, status),
                memo = COALESCE($3, memo)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.map(|s| s.as_str()))
        .bind(memo)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_inquiry(pool: &PgPool, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM inquiries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn inquiry_statistics(pool: &PgPool) -> Result<InquiryStatistics> {
        let (total, new, processing, completed) = sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'new' OR status IS NULL),
                COUNT(*) FILTER (WHERE status = 'processing'),
                COUNT(*) FILTER (WHERE status = 'completed')
            FROM inquiries
            "#,
        )
        .fetch_one(pool)
        .await?;

        let affiliation = sqlx::query_as::<_, CategoryCount>(
            r#"
            SELECT affiliation AS label, COUNT(*) AS count
            FROM inquiries
            WHERE affiliation IS NOT NULL
            GROUP BY affiliation
            ORDER BY count DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        let vehicle_type = sqlx::query_as::<_, CategoryCount>(
            r#"
            SELECT vehicle_type AS label, COUNT(*) AS count
            FROM inquiries
            WHERE vehicle_type IS NOT NULL
            GROUP BY vehicle_type
            ORDER BY count DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(InquiryStatistics {
            total,
            new,
            processing,
            completed,
            affiliation,
            vehicle_type,
        })
    }

    // Review operations
    pub async fn list_reviews(pool: &PgPool, active_only: bool) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, image_url, title, text_content, display_order, is_active, created_at, updated_at
            FROM reviews
            WHERE ($1 = FALSE OR is_active)
            ORDER BY display_order ASC, created_at DESC
            "#,
        )
        .bind(active_only)
        .fetch_all(pool)
        .await?;

        Ok(reviews)
    }

    pub async fn create_review(pool: &PgPool, review: &ReviewFields<'_>) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO reviews (image_url, title, text_content, display_order, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(review.image_url)
        .bind(review.title)
        .bind(review.text_content)
        .bind(review.display_order)
        .bind(review.is_active)
        .fetch_one(pool)
        .await?;

        Ok(id)
    }

    pub async fn update_review(pool: &PgPool, id: i64, review: &ReviewFields<'_>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE reviews
            SET image_url = $2,
                title = $3,
                text_content = $4,
                display_order = $5,
                is_active = $6,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(review.image_url)
        .bind(review.title)
        .bind(review.text_content)
        .bind(review.display_order)
        .bind(review.is_active)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_review(pool: &PgPool, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // Admin credential operations
    pub async fn get_admin_password_hash(pool: &PgPool) -> Result<Option<String>> {
        let hash = sqlx::query_scalar::<_, String>("SELECT password_hash FROM admin_password WHERE id = 1")
            .fetch_optional(pool)
            .await?;

        Ok(hash)
    }

    pub async fn set_admin_password_hash(pool: &PgPool, password_hash: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_password (id, password_hash, updated_at)
            VALUES (1, $1, NOW())
            ON CONFLICT (id) DO UPDATE
            SET password_hash = EXCLUDED.password_hash, updated_at = NOW()
            "#,
        )
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(())
    }
}

/// Column values shared by review insert and update.
#[derive(Debug, Clone)]
pub struct ReviewFields<'a> {
    pub image_url: &'a str,
    pub title: Option<&'a str>,
    pub text_content: Option<&'a str>,
    pub display_order: i32,
    pub is_active: bool,
}
