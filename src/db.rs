use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
    Sqlite, SqliteConnection, SqlitePool, Transaction,
};

use crate::{
    errors::AppError,
    structs::{
        Department, DepartmentFields, DepartmentListing, Job, JobFields, JobListing, NewUser, News,
        NewsFields, User,
    },
    utils::{hash_password, normalize_email, verify_password},
};

/// Request-scoped unit of work. Repository calls borrow it as `&mut *tx`;
/// nothing is persisted until the handler commits.
pub type UnitOfWork = Transaction<'static, Sqlite>;

pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .read_only(false)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePool::connect_with(opts).await?;
    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!()
        .run(pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.into()))?;
    log::info!("Database migrated successfully");
    Ok(())
}

/// Read-only unit of work for listing and display pages.
pub async fn begin(pool: &SqlitePool) -> Result<UnitOfWork, AppError> {
    pool.begin().await.map_err(|e| {
        log::error!("Failed to open transaction: {}", e);
        AppError::DatabaseError(e)
    })
}

/// Unit of work for requests that read and then write. Takes the write lock
/// up front so concurrent writers queue on `busy_timeout` instead of failing
/// when their read snapshot goes stale.
pub async fn begin_write(pool: &SqlitePool) -> Result<UnitOfWork, AppError> {
    pool.begin_with("BEGIN IMMEDIATE").await.map_err(|e| {
        log::error!("Failed to open write transaction: {}", e);
        AppError::DatabaseError(e)
    })
}

fn expect_one_row(rows_affected: u64) -> Result<(), AppError> {
    if rows_affected == 0 {
        Err(AppError::NotFound)
    } else {
        Ok(())
    }
}

// ---- users ----

pub async fn register_user(
    conn: &mut SqliteConnection,
    profile: NewUser,
    password: &str,
) -> Result<i64, AppError> {
    let email = normalize_email(&profile.email);
    if find_user_by_email(conn, &email).await?.is_some() {
        return Err(AppError::DuplicateEmail);
    }
    let pwd_hash = hash_password(password)?;
    let created_at = chrono::Utc::now();

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (email, pwd_hash, name, surname, age, position, speciality, address, is_admin, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id",
    )
    .bind(&email)
    .bind(pwd_hash)
    .bind(profile.name)
    .bind(profile.surname)
    .bind(profile.age)
    .bind(profile.position)
    .bind(profile.speciality)
    .bind(profile.address)
    .bind(profile.is_admin)
    .bind(created_at)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::DuplicateEmail,
        e => AppError::DatabaseError(e),
    })?;

    log::info!("User {} registered as id {}", email, id);
    Ok(id)
}

/// Returns the user only when `password` matches the stored hash.
pub async fn verify_credentials(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let user = find_user_by_email(conn, &normalize_email(email)).await?;
    Ok(user.filter(|user| verify_password(password, &user.pwd_hash)))
}

pub async fn find_user_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(normalize_email(email))
        .fetch_optional(&mut *conn)
        .await?;
    Ok(user)
}

pub async fn get_user_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(user)
}

// ---- jobs ----

pub async fn create_job(conn: &mut SqliteConnection, fields: JobFields) -> Result<i64, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO jobs (job_title, team_leader, collaborators, start_date, end_date, work_size, is_finished) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
    )
    .bind(fields.job_title)
    .bind(fields.team_leader)
    .bind(fields.collaborators)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.work_size)
    .bind(fields.is_finished)
    .fetch_one(&mut *conn)
    .await?;
    log::info!("Job {} created", id);
    Ok(id)
}

pub async fn get_job(conn: &mut SqliteConnection, id: i64) -> Result<Option<Job>, AppError> {
    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(job)
}

pub async fn get_all_jobs(conn: &mut SqliteConnection) -> Result<Vec<JobListing>, AppError> {
    let jobs = sqlx::query_as::<_, JobListing>(
        "SELECT jobs.*, users.name AS leader_name, users.surname AS leader_surname \
         FROM jobs JOIN users ON users.id = jobs.team_leader ORDER BY jobs.id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(jobs)
}

pub async fn update_job(conn: &mut SqliteConnection, id: i64, fields: JobFields) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE jobs SET job_title = $1, team_leader = $2, collaborators = $3, start_date = $4, \
         end_date = $5, work_size = $6, is_finished = $7 WHERE id = $8",
    )
    .bind(fields.job_title)
    .bind(fields.team_leader)
    .bind(fields.collaborators)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.work_size)
    .bind(fields.is_finished)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    expect_one_row(result.rows_affected())?;
    log::info!("Job {} updated", id);
    Ok(())
}

pub async fn delete_job(conn: &mut SqliteConnection, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    expect_one_row(result.rows_affected())?;
    log::info!("Job with id {} deleted", id);
    Ok(())
}

// ---- news ----

pub async fn create_news(
    conn: &mut SqliteConnection,
    author_id: i64,
    fields: NewsFields,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO news (title, content, is_private, user_id, created_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(fields.title)
    .bind(fields.content)
    .bind(fields.is_private)
    .bind(author_id)
    .bind(chrono::Utc::now())
    .fetch_one(&mut *conn)
    .await?;
    log::info!("News {} created by user {}", id, author_id);
    Ok(id)
}

pub async fn get_news(conn: &mut SqliteConnection, id: i64) -> Result<Option<News>, AppError> {
    let news = sqlx::query_as::<_, News>("SELECT * FROM news WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(news)
}

pub async fn get_all_news(conn: &mut SqliteConnection) -> Result<Vec<News>, AppError> {
    let news = sqlx::query_as::<_, News>("SELECT * FROM news ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;
    Ok(news)
}

pub async fn update_news(conn: &mut SqliteConnection, id: i64, fields: NewsFields) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE news SET title = $1, content = $2, is_private = $3 WHERE id = $4")
        .bind(fields.title)
        .bind(fields.content)
        .bind(fields.is_private)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    expect_one_row(result.rows_affected())?;
    log::info!("News {} updated", id);
    Ok(())
}

pub async fn delete_news(conn: &mut SqliteConnection, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM news WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    expect_one_row(result.rows_affected())?;
    log::info!("News with id {} deleted", id);
    Ok(())
}

// ---- departments ----

pub async fn create_department(
    conn: &mut SqliteConnection,
    fields: DepartmentFields,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO departments (title, chief, email, members) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(fields.title)
    .bind(fields.chief)
    .bind(fields.email)
    .bind(fields.members)
    .fetch_one(&mut *conn)
    .await?;
    log::info!("Department {} created", id);
    Ok(id)
}

pub async fn get_department(conn: &mut SqliteConnection, id: i64) -> Result<Option<Department>, AppError> {
    let department = sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(department)
}

pub async fn get_all_departments(
    conn: &mut SqliteConnection,
) -> Result<Vec<DepartmentListing>, AppError> {
    let departments = sqlx::query_as::<_, DepartmentListing>(
        "SELECT departments.*, users.name AS chief_name, users.surname AS chief_surname \
         FROM departments JOIN users ON users.id = departments.chief ORDER BY departments.id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(departments)
}

pub async fn update_department(
    conn: &mut SqliteConnection,
    id: i64,
    fields: DepartmentFields,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE departments SET title = $1, chief = $2, email = $3, members = $4 WHERE id = $5")
        .bind(fields.title)
        .bind(fields.chief)
        .bind(fields.email)
        .bind(fields.members)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    expect_one_row(result.rows_affected())?;
    log::info!("Department {} updated", id);
    Ok(())
}

pub async fn delete_department(conn: &mut SqliteConnection, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM departments WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    expect_one_row(result.rows_affected())?;
    log::info!("Department with id {} deleted", id);
    Ok(())
}
