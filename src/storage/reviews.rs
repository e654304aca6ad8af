use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use serde::Serialize;

const COLUMNS: &str = "id, product_id, user_name, rating, comment, created_at, updated_at";

/// A stored review row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub id: i64,
    pub product_id: i64,
    pub user_name: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Review {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            product_id: row.get(1)?,
            user_name: row.get(2)?,
            rating: row.get(3)?,
            comment: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

/// Validated fields for an insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub product_id: i64,
    pub user_name: String,
    pub rating: i64,
    pub comment: Option<String>,
}

/// Validated subset of fields for a partial update.
/// `comment: Some(None)` clears the comment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewPatch {
    pub product_id: Option<i64>,
    pub user_name: Option<String>,
    pub rating: Option<i64>,
    pub comment: Option<Option<String>>,
}

impl ReviewPatch {
    pub fn is_empty(&self) -> bool {
        self.product_id.is_none()
            && self.user_name.is_none()
            && self.rating.is_none()
            && self.comment.is_none()
    }

    fn assignments(&self) -> Vec<(&'static str, Value)> {
        let mut sets = Vec::new();
        if let Some(product_id) = self.product_id {
            sets.push(("product_id", Value::Integer(product_id)));
        }
        if let Some(user_name) = &self.user_name {
            sets.push(("user_name", Value::Text(user_name.clone())));
        }
        if let Some(rating) = self.rating {
            sets.push(("rating", Value::Integer(rating)));
        }
        if let Some(comment) = &self.comment {
            sets.push((
                "comment",
                comment.clone().map(Value::Text).unwrap_or(Value::Null),
            ));
        }
        sets
    }
}

/// All reviews, newest first
pub fn list(conn: &Connection) -> rusqlite::Result<Vec<Review>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COLUMNS} FROM reviews ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map([], Review::from_row)?;
    rows.collect()
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Review>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM reviews WHERE id = ?1"),
        params![id],
        Review::from_row,
    )
    .optional()
}

pub fn exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM reviews WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

/// Insert and return the generated id
pub fn insert(conn: &Connection, review: &NewReview) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO reviews (product_id, user_name, rating, comment) VALUES (?1, ?2, ?3, ?4)",
        params![review.product_id, review.user_name, review.rating, review.comment],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Update only the columns present in `patch`. Returns rows affected.
pub fn update(conn: &Connection, id: i64, patch: &ReviewPatch) -> rusqlite::Result<usize> {
    let assignments = patch.assignments();
    if assignments.is_empty() {
        return Ok(0);
    }

    let set_clause = assignments
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE reviews SET {set_clause}, updated_at = CURRENT_TIMESTAMP WHERE id = ?{}",
        assignments.len() + 1
    );

    let values = assignments
        .into_iter()
        .map(|(_, value)| value)
        .chain(std::iter::once(Value::Integer(id)));
    conn.execute(&sql, params_from_iter(values))
}

pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM reviews WHERE id = ?1", params![id])
}
