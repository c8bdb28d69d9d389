//! Course repository: catalogue and enrollments.

use sqlx::PgPool;

use crate::entities::{CourseEnrollmentEntity, CourseEntity};
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All courses with enrollment counts, emails and member ids.
    pub async fn list_with_enrollment(&self) -> Result<Vec<CourseEnrollmentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_courses_with_enrollment");
        let result = sqlx::query_as::<_, CourseEnrollmentEntity>(
            r#"
            SELECT c.code, c.name,
                   COUNT(m.id) AS enrolled_count,
                   COALESCE(ARRAY_AGG(m.email ORDER BY m.email) FILTER (WHERE m.id IS NOT NULL), '{}') AS enrolled_emails,
                   COALESCE(ARRAY_AGG(m.id ORDER BY m.id) FILTER (WHERE m.id IS NOT NULL), '{}') AS enrolled_member_ids
            FROM courses c
            LEFT JOIN course_enrollments ce ON ce.course_code = c.code
            LEFT JOIN members m ON m.id = ce.member_id
            GROUP BY c.code, c.name
            ORDER BY c.code
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<CourseEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_course_by_code");
        let result = sqlx::query_as::<_, CourseEntity>(
            "SELECT code, name, created_at FROM courses WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Creates a course. A duplicate code surfaces as a unique violation.
    pub async fn create(&self, code: &str, name: &str) -> Result<CourseEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_course");
        let result = sqlx::query_as::<_, CourseEntity>(
            r#"
            INSERT INTO courses (code, name)
            VALUES ($1, $2)
            RETURNING code, name, created_at
            "#,
        )
        .bind(code)
        .bind(name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes a course; its enrollments go with it.
    pub async fn delete(&self, code: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_course");
        let result = sqlx::query("DELETE FROM courses WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Enrolls a draft or rejected member. Idempotent; returns true only when
    /// a new enrollment row was written.
    pub async fn register(&self, code: &str, member_id: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("register_course");
        let result = sqlx::query(
            r#"
            INSERT INTO course_enrollments (course_code, member_id)
            SELECT $1, m.id FROM members m
            WHERE m.id = $2 AND m.status IN ('draft', 'rejected')
            ON CONFLICT (course_code, member_id) DO NOTHING
            "#,
        )
        .bind(code)
        .bind(member_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Removes an enrollment of a draft or rejected member.
    pub async fn unregister(&self, code: &str, member_id: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("unregister_course");
        let result = sqlx::query(
            r#"
            DELETE FROM course_enrollments ce
            USING members m
            WHERE ce.course_code = $1
              AND ce.member_id = $2
              AND m.id = ce.member_id
              AND m.status IN ('draft', 'rejected')
            "#,
        )
        .bind(code)
        .bind(member_id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
