//! Builder for table requests against the REST interface.
//!
//! Filters follow the PostgREST query grammar: `column=eq.value`,
//! `order=column.desc`, `limit=n`.

use serde::Serialize;
use serde_json::Value;

use super::RemoteError;

/// HTTP verb plus the `Prefer` semantics of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Select,
    Insert,
    Update,
    Delete,
    Upsert,
}

/// Sort direction for `order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A single request against one table.
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub(crate) operation: Operation,
    pub(crate) table: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<Value>,
}

impl RestRequest {
    fn new(operation: Operation, table: &str) -> Self {
        Self {
            operation,
            table: table.to_string(),
            query: Vec::new(),
            body: None,
        }
    }

    /// `GET` all columns.
    #[must_use]
    pub fn select(table: &str) -> Self {
        Self::new(Operation::Select, table).columns("*")
    }

    /// `POST` a row, returning the inserted representation.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Parse` if the row cannot be serialized.
    pub fn insert(table: &str, row: &impl Serialize) -> Result<Self, RemoteError> {
        Self::new(Operation::Insert, table).with_body(row)
    }

    /// `PATCH` matching rows with the given partial row.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Parse` if the patch cannot be serialized.
    pub fn update(table: &str, patch: &impl Serialize) -> Result<Self, RemoteError> {
        Self::new(Operation::Update, table).with_body(patch)
    }

    /// `DELETE` matching rows.
    #[must_use]
    pub fn delete(table: &str) -> Self {
        Self::new(Operation::Delete, table)
    }

    /// `POST` merging on `on_conflict` when the row already exists.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Parse` if the row cannot be serialized.
    pub fn upsert(table: &str, row: &impl Serialize, on_conflict: &str) -> Result<Self, RemoteError> {
        let mut request = Self::new(Operation::Upsert, table).with_body(row)?;
        request.push("on_conflict", on_conflict.to_string());
        Ok(request)
    }

    fn with_body(mut self, body: &impl Serialize) -> Result<Self, RemoteError> {
        let value = serde_json::to_value(body).map_err(|e| RemoteError::Parse(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    fn push(&mut self, key: &str, value: String) {
        self.query.push((key.to_string(), value));
    }

    /// Replace the selected column list.
    #[must_use]
    pub fn columns(mut self, columns: &str) -> Self {
        self.query.retain(|(k, _)| k != "select");
        self.push("select", columns.to_string());
        self
    }

    #[must_use]
    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.push(column, format!("eq.{value}"));
        self
    }

    #[must_use]
    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.push("order", format!("{column}.{}", direction.as_str()));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.push("limit", limit.to_string());
        self
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Value of the `Prefer` header, if any.
    #[must_use]
    pub const fn prefer(&self) -> Option<&'static str> {
        match self.operation {
            Operation::Select => None,
            Operation::Insert => Some("return=representation"),
            Operation::Update | Operation::Delete => Some("return=minimal"),
            Operation::Upsert => Some("resolution=merge-duplicates,return=minimal"),
        }
    }

    /// Whether a failed attempt under the session token may be repeated
    /// under the anon key. Inserts are sent once.
    #[must_use]
    pub const fn retries_with_anon_key(&self) -> bool {
        !matches!(self.operation, Operation::Insert)
    }

    #[must_use]
    pub fn method(&self) -> reqwest::Method {
        match self.operation {
            Operation::Select => reqwest::Method::GET,
            Operation::Insert | Operation::Upsert => reqwest::Method::POST,
            Operation::Update => reqwest::Method::PATCH,
            Operation::Delete => reqwest::Method::DELETE,
        }
    }

    /// Query string pairs in insertion order.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pairs(request: &RestRequest) -> Vec<(&str, &str)> {
        request
            .query()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_select_with_filters() {
        let request = RestRequest::select("appointments")
            .eq("owner_id", "u-1")
            .order("appointment_date", Direction::Desc)
            .limit(5);
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.prefer(), None);
        assert_eq!(
            pairs(&request),
            [
                ("select", "*"),
                ("owner_id", "eq.u-1"),
                ("order", "appointment_date.desc"),
                ("limit", "5"),
            ]
        );
    }

    #[test]
    fn test_columns_replaces_default_select() {
        let request = RestRequest::select("appointments").columns("id").limit(1);
        assert_eq!(pairs(&request), [("select", "id"), ("limit", "1")]);
    }

    #[test]
    fn test_mutations_prefer_headers() {
        let body = serde_json::json!({"status": "completed"});
        let update = RestRequest::update("appointments", &body).unwrap().eq("id", "a1");
        assert_eq!(update.method(), reqwest::Method::PATCH);
        assert_eq!(update.prefer(), Some("return=minimal"));

        let insert = RestRequest::insert("pets", &body).unwrap();
        assert_eq!(insert.prefer(), Some("return=representation"));

        let upsert = RestRequest::upsert("admins", &body, "user_id").unwrap();
        assert_eq!(pairs(&upsert), [("on_conflict", "user_id")]);
        assert!(upsert.prefer().unwrap().contains("merge-duplicates"));
    }

    #[test]
    fn test_inserts_are_not_retried_with_anon_key() {
        let body = serde_json::json!({"pet_name": "Mochi"});
        assert!(!RestRequest::insert("appointments", &body).unwrap().retries_with_anon_key());

        assert!(RestRequest::select("appointments").retries_with_anon_key());
        assert!(RestRequest::update("appointments", &body).unwrap().retries_with_anon_key());
        assert!(RestRequest::delete("appointments").retries_with_anon_key());
        assert!(RestRequest::upsert("admins", &body, "user_id").unwrap().retries_with_anon_key());
    }
}
