//! Conversion between entity records and string-keyed JSON maps.
//!
//! `to_wire` is lenient: handing a serializer the wrong entity type yields
//! an empty map rather than an error. Every string leaving through
//! `to_wire` is HTML-escaped.

use std::any::Any;

use serde_json::{Map, Value};

use crate::models::{Partnership, Skill, Tag, User};

pub type WireMap = Map<String, Value>;

pub trait WireSerializer {
    type Entity: 'static;

    fn to_wire(&self, value: &dyn Any) -> WireMap;

    fn from_wire(&self, values: &WireMap) -> Self::Entity;
}

pub struct UserSerializer;
pub struct SkillSerializer;
pub struct TagSerializer;
pub struct PartnershipSerializer;

impl WireSerializer for UserSerializer {
    type Entity = User;

    fn to_wire(&self, value: &dyn Any) -> WireMap {
        let mut wire = WireMap::new();
        let Some(user) = value.downcast_ref::<User>() else {
            return wire;
        };
        wire.insert("id".into(), text(&user.id));
        wire.insert("first_name".into(), text(&user.first_name));
        wire.insert("last_name".into(), text(&user.last_name));
        wire.insert("email".into(), text(&user.email));
        wire.insert("github_handle".into(), text(&user.github_handle));
        wire.insert("irc_nick".into(), text(&user.irc_nick));
        wire.insert("twitter_handle".into(), text(&user.twitter_handle));
        wire.insert("mentor_available".into(), flag(user.mentor_available));
        wire.insert("apprentice_available".into(), flag(user.apprentice_available));
        wire.insert("timezone".into(), text(&user.timezone));
        wire
    }

    fn from_wire(&self, values: &WireMap) -> User {
        User {
            id: read_text(values, "id"),
            first_name: read_text(values, "first_name"),
            last_name: read_text(values, "last_name"),
            email: read_text(values, "email"),
            irc_nick: read_text(values, "irc_nick"),
            twitter_handle: read_text(values, "twitter_handle"),
            github_handle: read_text(values, "github_handle"),
            mentor_available: read_flag(values, "mentor_available"),
            apprentice_available: read_flag(values, "apprentice_available"),
            timezone: read_text(values, "timezone"),
            teaching_skills: read_skills(values, "teaching_skills"),
            learning_skills: read_skills(values, "learning_skills"),
        }
    }
}

impl WireSerializer for SkillSerializer {
    type Entity = Skill;

    fn to_wire(&self, value: &dyn Any) -> WireMap {
        let mut wire = WireMap::new();
        let Some(skill) = value.downcast_ref::<Skill>() else {
            return wire;
        };
        wire.insert("id".into(), text(&skill.id));
        wire.insert("name".into(), text(&skill.name));
        wire.insert("authorized".into(), flag(skill.authorized));
        wire.insert("added".into(), text(&skill.added));
        wire
    }

    fn from_wire(&self, values: &WireMap) -> Skill {
        Skill {
            id: read_text(values, "id"),
            name: read_text(values, "name"),
            authorized: read_flag(values, "authorized"),
            added: read_text(values, "added"),
        }
    }
}

impl WireSerializer for TagSerializer {
    type Entity = Tag;

    fn to_wire(&self, value: &dyn Any) -> WireMap {
        let mut wire = WireMap::new();
        let Some(tag) = value.downcast_ref::<Tag>() else {
            return wire;
        };
        wire.insert("name".into(), text(&tag.name));
        wire.insert("authorized".into(), flag(tag.authorized));
        wire.insert("added".into(), text(&tag.added));
        wire
    }

    fn from_wire(&self, values: &WireMap) -> Tag {
        Tag {
            name: read_text(values, "name"),
            authorized: read_flag(values, "authorized"),
            added: read_text(values, "added"),
        }
    }
}

impl WireSerializer for PartnershipSerializer {
    type Entity = Partnership;

    fn to_wire(&self, value: &dyn Any) -> WireMap {
        let mut wire = WireMap::new();
        let Some(partnership) = value.downcast_ref::<Partnership>() else {
            return wire;
        };
        wire.insert("id".into(), text(&partnership.id));
        wire.insert("mentor".into(), text(&partnership.mentor));
        wire.insert("apprentice".into(), text(&partnership.apprentice));
        wire
    }

    fn from_wire(&self, values: &WireMap) -> Partnership {
        Partnership {
            id: read_text(values, "id"),
            mentor: read_text(values, "mentor"),
            apprentice: read_text(values, "apprentice"),
        }
    }
}

/// Serialize a list of entities as a JSON array of wire maps.
pub fn to_wire_list<S, T>(serializer: &S, items: &[T]) -> Value
where
    S: WireSerializer,
    T: Any,
{
    Value::Array(
        items
            .iter()
            .map(|item| Value::Object(serializer.to_wire(item)))
            .collect(),
    )
}

/// Escape the characters HTML treats specially.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn text(value: &Option<String>) -> Value {
    match value {
        Some(s) => Value::String(escape_html(s)),
        None => Value::Null,
    }
}

fn flag(value: Option<bool>) -> Value {
    value.map(Value::Bool).unwrap_or(Value::Null)
}

fn read_text(values: &WireMap, key: &str) -> Option<String> {
    match values.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Booleans arrive as JSON booleans, integers or numeric strings.
fn read_flag(values: &WireMap, key: &str) -> Option<bool> {
    match values.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Skill lists are either bare ids or full skill objects.
fn read_skills(values: &WireMap, key: &str) -> Vec<Skill> {
    let Some(Value::Array(items)) = values.get(key) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(id) => Some(Skill {
                id: Some(id.clone()),
                ..Skill::default()
            }),
            Value::Object(map) => Some(SkillSerializer.from_wire(map)),
            _ => None,
        })
        .collect()
}
