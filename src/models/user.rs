use sqlx::FromRow;

use super::Skill;

/// A member of the service, who may mentor, learn, or both.
///
/// Every scalar is optional so a partially filled request body maps onto
/// the struct without loss; required fields are checked by `UserService`.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct User {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub irc_nick: Option<String>,
    pub twitter_handle: Option<String>,
    pub github_handle: Option<String>,
    pub mentor_available: Option<bool>,
    pub apprentice_available: Option<bool>,
    pub timezone: Option<String>,
    #[sqlx(skip)]
    pub teaching_skills: Vec<Skill>,
    #[sqlx(skip)]
    pub learning_skills: Vec<Skill>,
}

impl User {
    pub fn add_teaching_skill(&mut self, skill: Skill) {
        self.teaching_skills.push(skill);
    }

    pub fn add_learning_skill(&mut self, skill: Skill) {
        self.learning_skills.push(skill);
    }
}
