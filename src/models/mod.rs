pub mod partnership;
pub mod skill;
pub mod tag;
pub mod user;

pub use partnership::Partnership;
pub use skill::Skill;
pub use tag::Tag;
pub use user::User;
