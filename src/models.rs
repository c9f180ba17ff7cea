use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::*;

/// Deserializes from any casing of the team name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Team {
    Design,
    Finance,
    Logistics,
    Stats,
}

impl Team {
    pub const ALL: [Team; 4] = [Team::Design, Team::Finance, Team::Logistics, Team::Stats];

    /// Value stored in the `teams` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Team::Design => "design",
            Team::Finance => "finance",
            Team::Logistics => "logistics",
            Team::Stats => "stats",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Team::ALL
            .into_iter()
            .find(|team| team.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown team {value}"))
    }
}

impl TryFrom<String> for Team {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = cc_recruitments)]
pub struct CcApplication {
    pub id: Uuid,
    pub uid: String,
    pub email: String,
    pub teams: Vec<String>,
    pub design_experience: Option<String>,
    pub why_this_position: String,
    pub why_cc: String,
    pub ideas: String,
    pub other_bodies: Option<String>,
    pub good_fit: String,
    pub apply_year: i32,
    pub sent_time: NaiveDateTime,
}

impl CcApplication {
    /// Stored team names that no longer parse are skipped.
    pub fn teams(&self) -> Vec<Team> {
        self.teams
            .iter()
            .filter_map(|value| value.parse().ok())
            .collect()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cc_recruitments)]
pub struct NewCcApplication {
    pub id: Uuid,
    pub uid: String,
    pub email: String,
    pub teams: Vec<String>,
    pub design_experience: Option<String>,
    pub why_this_position: String,
    pub why_cc: String,
    pub ideas: String,
    pub other_bodies: Option<String>,
    pub good_fit: String,
    pub apply_year: i32,
    pub sent_time: NaiveDateTime,
}

impl From<NewCcApplication> for CcApplication {
    fn from(value: NewCcApplication) -> Self {
        Self {
            id: value.id,
            uid: value.uid,
            email: value.email,
            teams: value.teams,
            design_experience: value.design_experience,
            why_this_position: value.why_this_position,
            why_cc: value.why_cc,
            ideas: value.ideas,
            other_bodies: value.other_bodies,
            good_fit: value.good_fit,
            apply_year: value.apply_year,
            sent_time: value.sent_time,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = storage_files)]
pub struct StorageFile {
    pub id: Uuid,
    pub title: String,
    pub filetype: String,
    pub filename: String,
    pub modified_time: NaiveDateTime,
    pub creation_time: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = storage_files)]
pub struct NewStorageFile {
    pub id: Uuid,
    pub title: String,
    pub filetype: String,
    pub filename: String,
    pub modified_time: NaiveDateTime,
    pub creation_time: NaiveDateTime,
}

impl From<NewStorageFile> for StorageFile {
    fn from(value: NewStorageFile) -> Self {
        Self {
            id: value.id,
            title: value.title,
            filetype: value.filetype,
            filename: value.filename,
            modified_time: value.modified_time,
            creation_time: value.creation_time,
        }
    }
}

/// Every mutable column. `creation_time` is set once on insert.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = storage_files)]
pub struct StorageFileChanges {
    pub title: String,
    pub filetype: String,
    pub filename: String,
    pub modified_time: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = mails)]
pub struct NewMailRecord {
    pub id: Uuid,
    pub uid: Option<String>,
    pub subject: String,
    pub body: String,
    pub to_recipients: Vec<String>,
    pub cc_recipients: Vec<String>,
    pub html_body: bool,
    pub sent_time: NaiveDateTime,
}
