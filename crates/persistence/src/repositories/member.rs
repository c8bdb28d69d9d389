//! Member repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::member::{Member, MemberStatus, NewMember};
use domain::services::lifecycle::enrollment_code;
use sqlx::PgPool;

use crate::db::with_retry;
use crate::entities::{EmploymentStatusDb, MemberEntity, MemberRoleDb, MemberStatusDb};
use crate::metrics::QueryTimer;

/// Member columns plus the member's course codes from `course_enrollments`.
const MEMBER_SELECT: &str = r#"
    SELECT m.id, m.email, m.status, m.role, m.full_name, m.age, m.gender, m.enrollment_code,
           m.profile_image_url, m.employment_status, m.company, m.industry, m.location,
           m.contact_number, m.profile_link, m.submitted, m.submitted_at, m.last_edit_at,
           m.created_at, m.updated_at,
           ARRAY(
               SELECT ce.course_code FROM course_enrollments ce
               WHERE ce.member_id = m.id
               ORDER BY ce.course_code
           ) AS courses
    FROM members m
"#;

/// Escapes `%`, `_` and `\` and wraps the term for a substring `ILIKE`.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Repository for member profiles.
#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find a member by identity-provider id.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_member_by_id");
        let sql = format!("{} WHERE m.id = $1", MEMBER_SELECT);
        let result = sqlx::query_as::<_, MemberEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Binds an identity to a member record, creating it on first sign-in.
    ///
    /// Returns the record and whether it was created by this call. The
    /// enrollment counter is incremented in the same transaction as the
    /// insert, so a lost race rolls the increment back.
    pub async fn create_if_absent(
        &self,
        new: &NewMember,
        code_prefix: &str,
    ) -> Result<(MemberEntity, bool), sqlx::Error> {
        let timer = QueryTimer::new("create_member_if_absent");
        let result = with_retry("create_member", || self.create_if_absent_once(new, code_prefix)).await;
        timer.record();
        result
    }

    async fn create_if_absent_once(
        &self,
        new: &NewMember,
        code_prefix: &str,
    ) -> Result<(MemberEntity, bool), sqlx::Error> {
        if let Some(existing) = self.find_by_id(&new.id).await? {
            return Ok((existing, false));
        }

        let mut tx = self.pool.begin().await?;

        let seq: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO counters (name, value) VALUES ('enrollment_code', 1)
            ON CONFLICT (name) DO UPDATE SET value = counters.value + 1
            RETURNING value
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO members (id, email, full_name, profile_image_url, role, enrollment_code)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&new.id)
        .bind(&new.email)
        .bind(&new.full_name)
        .bind(&new.profile_image_url)
        .bind(MemberRoleDb::from(new.role))
        .bind(enrollment_code(code_prefix, seq))
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            // Concurrent sign-in created the record first.
            tx.rollback().await?;
            let existing = self
                .find_by_id(&new.id)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
            return Ok((existing, false));
        }

        sqlx::query("INSERT INTO member_settings (member_id) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(&new.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let created = self
            .find_by_id(&new.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok((created, true))
    }

    /// Grants the admin role. Returns false if the member already had it.
    pub async fn promote_to_admin(&self, id: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("promote_member_to_admin");
        let result = sqlx::query(
            "UPDATE members SET role = 'admin', updated_at = NOW() WHERE id = $1 AND role <> 'admin'",
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Grants the admin role to existing members with any of the given
    /// emails (case-insensitive). Returns how many were promoted.
    pub async fn promote_by_emails(&self, emails: &[String]) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("promote_members_by_email");
        let lowered: Vec<String> = emails.iter().map(|e| e.trim().to_lowercase()).collect();
        let result = sqlx::query(
            r#"
            UPDATE members SET role = 'admin', updated_at = NOW()
            WHERE lower(email) = ANY($1) AND role <> 'admin'
            "#,
        )
        .bind(&lowered)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Writes the editable profile fields of `member`.
    ///
    /// Only applies if status and `last_edit_at` still match `previous`, so a
    /// concurrent edit or review cannot be overwritten. Returns false otherwise.
    pub async fn update_profile(&self, previous: &Member, member: &Member) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("update_member_profile");
        let p = &member.personal_details;
        let e = &member.employment_details;
        let c = &member.connection_details;

        let result = sqlx::query(
            r#"
            UPDATE members
            SET full_name = $2, age = $3, gender = $4,
                employment_status = $5, company = $6, industry = $7, location = $8,
                contact_number = $9, profile_link = $10,
                last_edit_at = $11, updated_at = $11
            WHERE id = $1
              AND status = $12
              AND last_edit_at IS NOT DISTINCT FROM $13
            "#,
        )
        .bind(&member.id)
        .bind(&p.full_name)
        .bind(p.age)
        .bind(&p.gender)
        .bind(EmploymentStatusDb::from(e.status))
        .bind(&e.company)
        .bind(&e.industry)
        .bind(&e.location)
        .bind(&c.contact_number)
        .bind(&c.profile_link)
        .bind(member.last_edit_at.unwrap_or_else(Utc::now))
        .bind(MemberStatusDb::from(previous.status))
        .bind(previous.last_edit_at)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Stores the profile image URL and stamps the edit time.
    ///
    /// Like [`Self::update_profile`], only applies while status and
    /// `last_edit_at` still match `previous`, so two uploads cannot both pass
    /// the edit lock.
    pub async fn set_profile_image(
        &self,
        previous: &Member,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("set_member_profile_image");
        let result = sqlx::query(
            r#"
            UPDATE members
            SET profile_image_url = $2, last_edit_at = $3, updated_at = $3
            WHERE id = $1
              AND status <> 'pending'
              AND status = $4
              AND last_edit_at IS NOT DISTINCT FROM $5
            "#,
        )
        .bind(&previous.id)
        .bind(url)
        .bind(now)
        .bind(MemberStatusDb::from(previous.status))
        .bind(previous.last_edit_at)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Moves a draft or rejected profile with at least one course to pending.
    ///
    /// `previous` is the snapshot the caller validated. The update only
    /// applies while status and `last_edit_at` still match it and the stored
    /// required fields are populated, so a concurrent edit cannot slip an
    /// incomplete profile into review.
    pub async fn submit(&self, previous: &Member, now: DateTime<Utc>) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("submit_member_profile");
        let result = sqlx::query(
            r#"
            UPDATE members
            SET status = 'pending', submitted = true, submitted_at = $2, updated_at = $2
            WHERE id = $1
              AND status IN ('draft', 'rejected')
              AND status = $3
              AND last_edit_at IS NOT DISTINCT FROM $4
              AND btrim(full_name) <> ''
              AND age IS NOT NULL
              AND btrim(coalesce(gender, '')) <> ''
              AND btrim(coalesce(contact_number, '')) <> ''
              AND btrim(coalesce(profile_link, '')) <> ''
              AND (employment_status = 'unemployed'
                   OR (btrim(coalesce(company, '')) <> '' AND btrim(coalesce(industry, '')) <> ''))
              AND EXISTS (SELECT 1 FROM course_enrollments WHERE member_id = $1)
            "#,
        )
        .bind(&previous.id)
        .bind(now)
        .bind(MemberStatusDb::from(previous.status))
        .bind(previous.last_edit_at)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Applies a review decision to a pending profile. Approval stamps
    /// `last_edit_at`, which starts the edit lock.
    pub async fn set_review_status(
        &self,
        id: &str,
        status: MemberStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("set_member_review_status");
        let result = sqlx::query(
            r#"
            UPDATE members
            SET status = $2,
                last_edit_at = CASE WHEN $2 = 'approved'::member_status THEN $3 ELSE last_edit_at END,
                updated_at = $3
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(MemberStatusDb::from(status))
        .bind(now)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Lists non-admin members, newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<MemberStatus>) -> Result<Vec<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_members");
        let sql = format!(
            "{} WHERE m.role = 'member' AND ($1::member_status IS NULL OR m.status = $1) \
             ORDER BY m.created_at DESC, m.id",
            MEMBER_SELECT
        );
        let result = sqlx::query_as::<_, MemberEntity>(&sql)
            .bind(status.map(MemberStatusDb::from))
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Approved members matching a case-insensitive term (name, email,
    /// enrollment code, company) and an optional industry.
    pub async fn search_directory(
        &self,
        search: Option<&str>,
        industry: Option<&str>,
    ) -> Result<Vec<MemberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("search_directory");
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);
        let industry = industry.map(str::trim).filter(|s| !s.is_empty());

        let sql = format!(
            r#"{}
            WHERE m.status = 'approved'
              AND ($1::text IS NULL
                   OR m.full_name ILIKE $1
                   OR m.email ILIKE $1
                   OR m.enrollment_code ILIKE $1
                   OR m.company ILIKE $1)
              AND ($2::text IS NULL OR LOWER(m.industry) = LOWER($2))
            ORDER BY m.full_name, m.id
            "#,
            MEMBER_SELECT
        );
        let result = sqlx::query_as::<_, MemberEntity>(&sql)
            .bind(pattern)
            .bind(industry)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Removes a member and everything that references them, all or nothing.
    /// Returns false if the member did not exist.
    pub async fn delete_cascade(&self, id: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_member_cascade");
        let result = with_retry("delete_member_cascade", || self.delete_cascade_once(id)).await;
        timer.record();
        result
    }

    async fn delete_cascade_once(&self, id: &str) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Lock the row so concurrent writers wait for the delete.
        let exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM members WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        let statements = [
            "DELETE FROM notifications WHERE member_id = $1",
            "DELETE FROM course_enrollments WHERE member_id = $1",
            "DELETE FROM forum_comments WHERE author_id = $1",
            "DELETE FROM forum_comments WHERE post_id IN (SELECT id FROM forum_posts WHERE author_id = $1)",
            "DELETE FROM forum_posts WHERE author_id = $1",
            "DELETE FROM connections WHERE from_member_id = $1 OR to_member_id = $1",
            "DELETE FROM member_settings WHERE member_id = $1",
            "DELETE FROM members WHERE id = $1",
        ];
        for statement in statements {
            sqlx::query(statement).bind(id).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
