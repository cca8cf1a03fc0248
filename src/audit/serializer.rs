//! Change serialization
//!
//! Renders the before/after snapshots stored on an audit entry. Inserts and
//! deletes store the whole entity graph; updates store only the changed
//! fields, as two flat objects with identical keys.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::scanner::{self, ChangedField};
use crate::error::AuditResult;
use crate::models::ChangeType;
use crate::tracking::{node_id, GraphNode, Member, TrackedEntity};

/// Serializer options
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SerializerSettings {
    /// How many levels of navigation members to expand below the root entity
    /// (unbounded if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    /// Indent the JSON output
    #[serde(default)]
    pub pretty: bool,
}

/// Serializes entities and change sets to JSON text
#[derive(Debug, Clone, Default)]
pub struct ChangeSerializer {
    settings: SerializerSettings,
}

impl ChangeSerializer {
    /// Create a serializer with the given settings
    pub fn new(settings: SerializerSettings) -> Self {
        Self { settings }
    }

    /// Get the serializer settings
    pub fn settings(&self) -> &SerializerSettings {
        &self.settings
    }

    /// Convert an entity graph to a JSON value
    ///
    /// A reference back to a node that is already being written (a cycle) is
    /// written as null; in a collection it is left out.
    pub fn to_value(&self, root: &dyn GraphNode) -> Value {
        let mut path = Vec::new();
        self.write_node(root, &mut path, 0)
    }

    fn write_node(&self, node: &dyn GraphNode, path: &mut Vec<usize>, depth: usize) -> Value {
        path.push(node_id(node));

        let mut object = Map::new();
        for (name, member) in node.members() {
            let value = match member {
                Member::Value(value) => value,
                Member::Reference(None) => Value::Null,
                Member::Reference(Some(target)) => {
                    if self.can_descend(depth) && !path.contains(&node_id(&*target)) {
                        self.write_node(&*target, path, depth + 1)
                    } else {
                        Value::Null
                    }
                }
                Member::Collection(items) => {
                    if self.can_descend(depth) {
                        let mut values = Vec::with_capacity(items.len());
                        for item in &items {
                            if !path.contains(&node_id(&**item)) {
                                values.push(self.write_node(&**item, path, depth + 1));
                            }
                        }
                        Value::Array(values)
                    } else {
                        Value::Array(Vec::new())
                    }
                }
            };
            object.insert(name, value);
        }

        path.pop();
        Value::Object(object)
    }

    fn can_descend(&self, depth: usize) -> bool {
        self.settings.max_depth.map_or(true, |max| depth < max)
    }

    fn render(&self, value: &Value) -> AuditResult<String> {
        let text = if self.settings.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }

    /// Serialize a whole entity graph
    pub fn serialize_whole(&self, root: &dyn GraphNode) -> AuditResult<String> {
        self.render(&self.to_value(root))
    }

    /// Serialize a change set as `(before, after)` objects keyed by field name
    pub fn serialize_delta(&self, changes: &[ChangedField]) -> AuditResult<(String, String)> {
        let mut before = Map::new();
        let mut after = Map::new();

        for change in changes {
            before.insert(change.name.clone(), change.before.clone());
            after.insert(change.name.clone(), change.after.clone());
        }

        Ok((
            self.render(&Value::Object(before))?,
            self.render(&Value::Object(after))?,
        ))
    }

    /// Serialize the snapshots for a given change type
    ///
    /// Inserts produce `(None, whole)`, deletes `(whole, None)` and updates
    /// the delta of the changed fields.
    pub fn serialize_entity_changes(
        &self,
        change_type: ChangeType,
        entity: &dyn TrackedEntity,
    ) -> AuditResult<(Option<String>, Option<String>)> {
        match change_type {
            ChangeType::Insert => Ok((None, Some(self.serialize_whole(entity.graph())?))),
            ChangeType::Delete => Ok((Some(self.serialize_whole(entity.graph())?), None)),
            ChangeType::Update => {
                let changes = scanner::diff(entity)?;
                let (before, after) = self.serialize_delta(&changes)?;
                Ok((Some(before), Some(after)))
            }
        }
    }

    /// Serialize the snapshots for a stored change type code
    ///
    /// # Errors
    ///
    /// Returns a range error naming the code if it is not a known change type.
    pub fn serialize_entity_changes_raw(
        &self,
        change_type_code: i32,
        entity: &dyn TrackedEntity,
    ) -> AuditResult<(Option<String>, Option<String>)> {
        let change_type = ChangeType::try_from(change_type_code)?;
        self.serialize_entity_changes(change_type, entity)
    }
}
