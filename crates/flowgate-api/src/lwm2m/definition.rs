// ── Object and resource definitions ──
//
// Schema records submitted with `define` and returned on `connect`.
// Both sessions cache them so "is this object defined?" never needs a
// round trip.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::path::{ObjectId, Path, ResourceId};
use super::value::{ResourceType, Value};
use crate::error::Error;

/// Which operations a resource allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operations {
    ReadOnly,
    WriteOnly,
    ReadWrite,
    Execute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub id: ResourceId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub mandatory: bool,
    pub operations: Operations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ResourceDefinition {
    /// A mandatory, single-instance, read-write resource.
    pub fn read_write(id: ResourceId, name: impl Into<String>, kind: ResourceType) -> Self {
        let default = match kind {
            ResourceType::Integer => Value::Integer(0),
            ResourceType::Boolean => Value::Boolean(false),
        };
        Self {
            id,
            name: name.into(),
            kind,
            mandatory: true,
            operations: Operations::ReadWrite,
            default: Some(default),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDefinition {
    pub id: ObjectId,
    pub name: String,
    pub min_instances: u16,
    pub max_instances: u16,
    #[serde(default)]
    pub resources: Vec<ResourceDefinition>,
}

impl ObjectDefinition {
    pub fn new(id: ObjectId, name: impl Into<String>, min_instances: u16, max_instances: u16) -> Self {
        Self {
            id,
            name: name.into(),
            min_instances,
            max_instances,
            resources: Vec::new(),
        }
    }

    /// Append a resource, rejecting duplicate IDs and mistyped defaults.
    pub fn add_resource(&mut self, resource: ResourceDefinition) -> Result<(), Error> {
        if self.resource(resource.id).is_some() {
            return Err(Error::Definition {
                object: self.id,
                reason: format!("resource {} defined twice", resource.id),
            });
        }
        if let Some(default) = resource.default {
            if default.kind() != resource.kind {
                return Err(Error::Definition {
                    object: self.id,
                    reason: format!(
                        "default for resource {} is {}, expected {}",
                        resource.id,
                        default.kind(),
                        resource.kind
                    ),
                });
            }
        }
        self.resources.push(resource);
        Ok(())
    }

    pub fn resource(&self, id: ResourceId) -> Option<&ResourceDefinition> {
        self.resources.iter().find(|r| r.id == id)
    }
}

/// Object definitions known to one session, keyed by object ID.
#[derive(Debug, Default, Clone)]
pub struct DefinitionCache {
    objects: HashMap<ObjectId, ObjectDefinition>,
}

impl DefinitionCache {
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn object(&self, id: ObjectId) -> Option<&ObjectDefinition> {
        self.objects.get(&id)
    }

    /// Resolve a resource path to its resource definition.
    pub fn resource(&self, path: &Path) -> Option<&ResourceDefinition> {
        let resource = path.resource_id()?;
        self.object(path.object_id())?.resource(resource)
    }

    pub fn extend(&mut self, objects: impl IntoIterator<Item = ObjectDefinition>) {
        for object in objects {
            self.objects.insert(object.id, object);
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
