use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub pwd_hash: String,
    pub name: String,
    pub surname: String,
    pub age: Option<i64>,
    pub position: Option<String>,
    pub speciality: Option<String>,
    pub address: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Profile fields collected at registration.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub surname: String,
    pub age: Option<i64>,
    pub position: Option<String>,
    pub speciality: Option<String>,
    pub address: Option<String>,
    pub is_admin: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Job {
    pub id: i64,
    pub job_title: String,
    pub team_leader: i64,
    pub collaborators: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub work_size: i64,
    pub is_finished: bool,
}

/// Job row joined with its team leader's name.
#[derive(Debug, Clone, FromRow)]
pub struct JobListing {
    #[sqlx(flatten)]
    pub job: Job,
    pub leader_name: String,
    pub leader_surname: String,
}

/// Job columns as written by the create and edit forms.
#[derive(Debug, Clone, PartialEq)]
pub struct JobFields {
    pub job_title: String,
    pub team_leader: i64,
    pub collaborators: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub work_size: i64,
    pub is_finished: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub is_private: bool,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsFields {
    pub title: String,
    pub content: String,
    pub is_private: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Department {
    pub id: i64,
    pub title: String,
    pub chief: i64,
    pub email: String,
    pub members: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct DepartmentListing {
    #[sqlx(flatten)]
    pub department: Department,
    pub chief_name: String,
    pub chief_surname: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentFields {
    pub title: String,
    pub chief: i64,
    pub email: String,
    pub members: String,
}

/// Records carrying a single owning user.
pub trait Owned {
    fn owner_id(&self) -> i64;
}

impl Owned for Job {
    fn owner_id(&self) -> i64 {
        self.team_leader
    }
}

impl Owned for News {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

impl Owned for Department {
    fn owner_id(&self) -> i64 {
        self.chief
    }
}
