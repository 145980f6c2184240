use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An opaque field-to-operator/value mapping selecting records.
///
/// Conditions are never interpreted by the pipeline, only serialized, so
/// any JSON-serializable mapping passes through unchanged, nested
/// operators included.
pub type Condition = serde_json::Map<String, Value>;

/// A two-level record filter shared by all data-access operations.
///
/// The outer level is a conjunction (`AND`) of groups, the inner level a
/// disjunction (`OR`) of [`Condition`]s; the nesting depth is fixed.
/// Element order is preserved exactly through serialization.
///
/// A [`Query`] is always passed as `Option<&Query>` to read, update, and
/// delete operations: `None` means no filter at all, while an
/// empty-but-present filter is a valid, distinct wire value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query {
    groups: Vec<Vec<Condition>>,
}

impl Query {
    /// Creates an empty [`Query`].
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one `OR`-group of [`Condition`]s while constructing a
    /// [`Query`]. Groups are combined with `AND`.
    #[must_use]
    #[inline]
    pub fn group(mut self, conditions: Vec<Condition>) -> Self {
        self.groups.push(conditions);
        self
    }

    /// Encodes the filter as a percent-encoded JSON string, the wire form
    /// of the `query` URL parameter.
    ///
    /// The JSON text is an array of arrays of objects mirroring the
    /// `AND`/`OR` nesting; an empty filter encodes to `%5B%5D`.
    #[must_use]
    pub fn encode(&self) -> String {
        let json = Value::from(self).to_string();
        urlencoding::encode(&json).into_owned()
    }
}

impl From<Vec<Vec<Condition>>> for Query {
    fn from(groups: Vec<Vec<Condition>>) -> Self {
        Self { groups }
    }
}

impl From<&Query> for Value {
    fn from(query: &Query) -> Self {
        Self::Array(
            query
                .groups
                .iter()
                .map(|group| {
                    Self::Array(
                        group
                            .iter()
                            .map(|condition| Self::Object(condition.clone()))
                            .collect(),
                    )
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use crate::tests::condition;

    use super::Query;

    #[test]
    fn empty_query_encodes_to_escaped_brackets() {
        assert_eq!(Query::new().encode(), "%5B%5D");
    }

    #[test]
    fn encoding_round_trips() {
        let query = Query::new()
            .group(vec![
                condition(json!({"age": {"$gt": 5}})),
                condition(json!({"name": "alice"})),
            ])
            .group(vec![condition(json!({"status": {"$ne": "inactive"}}))]);

        let encoded = query.encode();
        let decoded = urlencoding::decode(&encoded).unwrap();

        assert_eq!(serde_json::from_str::<Query>(&decoded).unwrap(), query);
    }

    #[test]
    fn conditions_pass_through_unexamined() {
        let query = Query::new().group(vec![condition(
            json!({"position": {"$within": {"center": [1.5, 2.5], "radius": 10}}}),
        )]);

        assert_eq!(
            Value::from(&query),
            json!([[{"position": {"$within": {"center": [1.5, 2.5], "radius": 10}}}]])
        );
    }

    #[test]
    fn group_order_is_preserved() {
        let query = Query::new()
            .group(vec![condition(json!({"a": 1}))])
            .group(vec![condition(json!({"b": 2}))]);

        assert_eq!(Value::from(&query), json!([[{"a": 1}], [{"b": 2}]]));
    }
}
