use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tags` table
#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// Trims tag names, drops blanks and duplicates while keeping first-seen order
pub fn normalize_tag_names(names: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if !name.is_empty() && !normalized.iter().any(|n| n == name) {
            normalized.push(name.to_string());
        }
    }
    normalized
}
