use crate::users::repo_types::User;
use sqlx::PgPool;

impl User {
    /// Find a user by exact email match. At most one row exists per
    /// email (unique constraint).
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, image_path, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Insert a new user. A duplicate email surfaces as a database
    /// unique violation.
    pub async fn create(
        db: &PgPool,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, full_name, email, password_hash, image_path, created_at
            "#,
        )
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    /// Partial update keyed by email: NULL arguments leave the stored
    /// column untouched. Returns rows affected (0 = no such user).
    pub async fn update_by_email(
        db: &PgPool,
        email: &str,
        full_name: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                password_hash = COALESCE($3, password_hash)
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(full_name)
        .bind(password_hash)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_image_path(
        db: &PgPool,
        email: &str,
        image_path: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET image_path = $2
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(image_path)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete by email, returning rows affected.
    pub async fn delete_by_email(db: &PgPool, email: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_all(db: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, image_path, created_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(db)
        .await
    }
}
