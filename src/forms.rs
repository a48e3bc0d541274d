//! Submitted forms. Every field arrives as text so a bad value can be echoed
//! back on the form instead of failing extraction.

use serde::{Deserialize, Serialize};

use crate::{
    errors::AppError,
    structs::{Department, DepartmentFields, Job, JobFields, NewUser, News, NewsFields},
    utils::{format_datetime, normalize_email, parse_datetime},
};

const CHECKED: &str = "on";

fn required<'a>(value: &'a str, label: &str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        Err(AppError::ValidationError(format!("{} is required", label)))
    } else {
        Ok(value)
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

fn checkbox(value: bool) -> Option<String> {
    value.then(|| CHECKED.to_owned())
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub remember_me: Option<String>,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), AppError> {
        required(&self.email, "Email")?;
        required(&self.password, "Password")?;
        Ok(())
    }

    pub fn remember(&self) -> bool {
        self.remember_me.is_some()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RegisterForm {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub password_again: String,
    pub surname: String,
    pub name: String,
    pub age: String,
    pub position: String,
    pub speciality: String,
    pub address: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<NewUser, AppError> {
        let email = required(&self.email, "Email")?;
        required(&self.password, "Password")?;
        required(&self.password_again, "Repeat password")?;
        let surname = required(&self.surname, "Surname")?;
        let name = required(&self.name, "Name")?;
        if self.password != self.password_again {
            return Err(AppError::ValidationError("Passwords do not match".to_owned()));
        }
        let age = match optional(&self.age) {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .ok()
                    .filter(|age| *age >= 0)
                    .ok_or_else(|| AppError::ValidationError("Age must be a whole number".to_owned()))?,
            ),
            None => None,
        };

        Ok(NewUser {
            email: normalize_email(email),
            name: name.to_owned(),
            surname: surname.to_owned(),
            age,
            position: optional(&self.position),
            speciality: optional(&self.speciality),
            address: optional(&self.address),
            is_admin: false,
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct JobForm {
    /// Team leader email.
    pub email: String,
    pub job_title: String,
    pub work_size: String,
    pub collaborators: String,
    pub start_date: String,
    pub end_date: String,
    pub is_finished: Option<String>,
}

/// A job form that passed validation but whose team leader is not resolved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDraft {
    pub leader_email: String,
    pub job_title: String,
    pub work_size: i64,
    pub collaborators: String,
    pub start_date: chrono::NaiveDateTime,
    pub end_date: chrono::NaiveDateTime,
    pub is_finished: bool,
}

impl JobDraft {
    pub fn into_fields(self, team_leader: i64) -> JobFields {
        JobFields {
            job_title: self.job_title,
            team_leader,
            collaborators: self.collaborators,
            start_date: self.start_date,
            end_date: self.end_date,
            work_size: self.work_size,
            is_finished: self.is_finished,
        }
    }
}

impl JobForm {
    pub fn from_record(job: &Job, leader_email: &str) -> Self {
        Self {
            email: leader_email.to_owned(),
            job_title: job.job_title.clone(),
            work_size: job.work_size.to_string(),
            collaborators: job.collaborators.clone(),
            start_date: format_datetime(&job.start_date),
            end_date: format_datetime(&job.end_date),
            is_finished: checkbox(job.is_finished),
        }
    }

    pub fn validate(&self) -> Result<JobDraft, AppError> {
        let email = required(&self.email, "Team leader email")?;
        let job_title = required(&self.job_title, "Title of job")?;
        let work_size = required(&self.work_size, "Work size")?
            .parse::<i64>()
            .map_err(|_| AppError::ValidationError("Work size must be a whole number of hours".to_owned()))?;
        let start_date = parse_datetime(required(&self.start_date, "Start date")?)
            .ok_or_else(|| AppError::ValidationError("Start date is not a valid date and time".to_owned()))?;
        let end_date = parse_datetime(required(&self.end_date, "End date")?)
            .ok_or_else(|| AppError::ValidationError("End date is not a valid date and time".to_owned()))?;

        Ok(JobDraft {
            leader_email: normalize_email(email),
            job_title: job_title.to_owned(),
            work_size,
            collaborators: self.collaborators.trim().to_owned(),
            start_date,
            end_date,
            is_finished: self.is_finished.is_some(),
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct NewsForm {
    pub title: String,
    pub content: String,
    pub is_private: Option<String>,
}

impl NewsForm {
    pub fn from_record(news: &News) -> Self {
        Self {
            title: news.title.clone(),
            content: news.content.clone(),
            is_private: checkbox(news.is_private),
        }
    }

    pub fn validate(&self) -> Result<NewsFields, AppError> {
        let title = required(&self.title, "Title")?;
        Ok(NewsFields {
            title: title.to_owned(),
            content: self.content.clone(),
            is_private: self.is_private.is_some(),
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DepartmentForm {
    pub title: String,
    /// Chief email.
    pub email: String,
    /// Department contact email.
    pub email_dep: String,
    pub members: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentDraft {
    pub chief_email: String,
    pub title: String,
    pub email: String,
    pub members: String,
}

impl DepartmentDraft {
    pub fn into_fields(self, chief: i64) -> DepartmentFields {
        DepartmentFields {
            title: self.title,
            chief,
            email: self.email,
            members: self.members,
        }
    }
}

impl DepartmentForm {
    pub fn from_record(department: &Department, chief_email: &str) -> Self {
        Self {
            title: department.title.clone(),
            email: chief_email.to_owned(),
            email_dep: department.email.clone(),
            members: department.members.clone(),
        }
    }

    pub fn validate(&self) -> Result<DepartmentDraft, AppError> {
        let title = required(&self.title, "Department name")?;
        let chief_email = required(&self.email, "Chief email")?;
        let email = required(&self.email_dep, "Department email")?;
        Ok(DepartmentDraft {
            chief_email: normalize_email(chief_email),
            title: title.to_owned(),
            email: email.to_owned(),
            members: self.members.trim().to_owned(),
        })
    }
}
