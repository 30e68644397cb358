//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    CreateUniversityRequest, Material, MaterialFilter, MaterialType, NewMaterial, Role,
    University, User,
};

const MATERIAL_SELECT: &str = r#"SELECT m.id, m.title, m.kind, m.link, m.course, m.year,
           m.semester, m.subject, m.created_at,
           u.id AS u_id, u.name AS u_name, u.description AS u_description,
           u.logo_url AS u_logo_url, u.created_at AS u_created_at
    FROM materials m
    LEFT JOIN universities u ON u.id = m.university_id"#;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== UNIVERSITY OPERATIONS ====================

    /// List all universities.
    pub async fn list_universities(&self) -> Result<Vec<University>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, description, logo_url, created_at FROM universities ORDER BY created_at, rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(university_from_row).collect())
    }

    /// Get a university by ID.
    pub async fn get_university(&self, id: &str) -> Result<Option<University>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, description, logo_url, created_at FROM universities WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(university_from_row))
    }

    /// Create a new university. Names are unique.
    pub async fn create_university(
        &self,
        request: &CreateUniversityRequest,
    ) -> Result<University, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let name = request.name.trim().to_string();

        sqlx::query(
            "INSERT INTO universities (id, name, description, logo_url, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&name)
        .bind(&request.description)
        .bind(&request.logo_url)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, format!("University '{}' already exists", name)))?;

        Ok(University {
            id,
            name,
            description: request.description.clone(),
            logo_url: request.logo_url.clone(),
            created_at: now,
        })
    }

    /// Delete a university and every material that references it.
    ///
    /// Returns the number of materials removed alongside it.
    pub async fn delete_university(&self, id: &str) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        let materials = sqlx::query("DELETE FROM materials WHERE university_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = sqlx::query("DELETE FROM universities WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!("University {} not found", id)));
        }

        tx.commit().await?;
        Ok(materials)
    }

    // ==================== MATERIAL OPERATIONS ====================

    /// List materials matching every constraint in `filter`.
    pub async fn list_materials(&self, filter: &MaterialFilter) -> Result<Vec<Material>, AppError> {
        let mut query = QueryBuilder::<Sqlite>::new(MATERIAL_SELECT);
        query.push(" WHERE 1 = 1");

        if let Some(university_id) = &filter.university_id {
            query.push(" AND m.university_id = ").push_bind(university_id.clone());
        }
        if let Some(course) = &filter.course {
            query.push(" AND m.course = ").push_bind(course.clone());
        }
        if let Some(year) = filter.year {
            query.push(" AND m.year = ").push_bind(year);
        }
        if let Some(semester) = filter.semester {
            query.push(" AND m.semester = ").push_bind(semester);
        }
        if let Some(subject) = &filter.subject {
            query.push(" AND m.subject = ").push_bind(subject.clone());
        }
        query.push(" ORDER BY m.created_at, m.rowid");

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(material_from_row).collect()
    }

    /// Get a material by ID.
    pub async fn get_material(&self, id: &str) -> Result<Option<Material>, AppError> {
        let row = sqlx::query(&format!("{} WHERE m.id = ?", MATERIAL_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(material_from_row).transpose()
    }

    /// Store a validated material. The university must exist.
    pub async fn create_material(&self, material: &NewMaterial) -> Result<Material, AppError> {
        let university = self
            .get_university(&material.university_id)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "University {} does not exist",
                    material.university_id
                ))
            })?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        self.insert_material(&id, &now, material).await?;

        Ok(Material {
            id,
            title: material.title.clone(),
            kind: material.kind,
            link: material.link.clone(),
            university: Some(university),
            course: material.course.clone(),
            year: material.year,
            semester: material.semester,
            subject: material.subject.clone(),
            created_at: now,
        })
    }

    /// The university may vanish after the existence check; the foreign key
    /// still rejects the row.
    async fn insert_material(
        &self,
        id: &str,
        created_at: &str,
        material: &NewMaterial,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO materials (id, title, kind, link, university_id, course, year, semester, subject, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(id)
        .bind(&material.title)
        .bind(material.kind.as_str())
        .bind(&material.link)
        .bind(&material.university_id)
        .bind(&material.course)
        .bind(material.year)
        .bind(material.semester)
        .bind(&material.subject)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            foreign_key_violation(
                e,
                format!("University {} does not exist", material.university_id),
            )
        })?;
        Ok(())
    }

    /// Delete a material.
    pub async fn delete_material(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM materials WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Material {} not found", id)));
        }

        Ok(())
    }

    /// Remove materials whose university no longer exists.
    pub async fn purge_orphaned_materials(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM materials WHERE university_id NOT IN (SELECT id FROM universities)",
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // ==================== USER OPERATIONS ====================

    /// Find an account by email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, role, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Create an account from an already hashed password.
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "User already exists".to_string()))?;

        Ok(User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: now,
        })
    }
}

/// Map a unique constraint failure to [`AppError::Duplicate`].
fn unique_violation(err: sqlx::Error, message: String) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Duplicate(message),
        _ => AppError::from(err),
    }
}

fn foreign_key_violation(err: sqlx::Error, message: String) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::Validation(message)
        }
        _ => AppError::from(err),
    }
}

// ==================== ROW MAPPERS ====================

fn university_from_row(row: &SqliteRow) -> University {
    University {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        logo_url: row.get("logo_url"),
        created_at: row.get("created_at"),
    }
}

fn material_from_row(row: &SqliteRow) -> Result<Material, AppError> {
    let kind: String = row.get("kind");
    let kind = MaterialType::parse(&kind)
        .ok_or_else(|| AppError::Database(format!("Unknown material type '{}'", kind)))?;

    let university = row
        .get::<Option<String>, _>("u_id")
        .map(|id| University {
            id,
            name: row.get("u_name"),
            description: row.get("u_description"),
            logo_url: row.get("u_logo_url"),
            created_at: row.get("u_created_at"),
        });

    Ok(Material {
        id: row.get("id"),
        title: row.get("title"),
        kind,
        link: row.get("link"),
        university,
        course: row.get("course"),
        year: row.get("year"),
        semester: row.get("semester"),
        subject: row.get("subject"),
        created_at: row.get("created_at"),
    })
}

fn user_from_row(row: &SqliteRow) -> Result<User, AppError> {
    let role: String = row.get("role");
    let role = Role::parse(&role)
        .ok_or_else(|| AppError::Database(format!("Unknown role '{}'", role)))?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role,
        created_at: row.get("created_at"),
    })
}
