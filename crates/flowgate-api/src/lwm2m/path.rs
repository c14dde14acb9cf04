// ── LWM2M addressing ──
//
// Object, object-instance and resource paths in the
// `/{object}/{instance}/{resource}` form used on both IPC surfaces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub type ObjectId = u16;
pub type InstanceId = u16;
pub type ResourceId = u16;

/// An LWM2M path addressing an object, an object instance, or a resource.
///
/// Serialized as its string form (`"/3311/0/5850"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path {
    object: ObjectId,
    instance: Option<InstanceId>,
    resource: Option<ResourceId>,
}

impl Path {
    /// `/{object}`
    pub const fn object(object: ObjectId) -> Self {
        Self {
            object,
            instance: None,
            resource: None,
        }
    }

    /// `/{object}/{instance}`
    pub const fn object_instance(object: ObjectId, instance: InstanceId) -> Self {
        Self {
            object,
            instance: Some(instance),
            resource: None,
        }
    }

    /// `/{object}/{instance}/{resource}`
    pub const fn resource(object: ObjectId, instance: InstanceId, resource: ResourceId) -> Self {
        Self {
            object,
            instance: Some(instance),
            resource: Some(resource),
        }
    }

    pub fn object_id(&self) -> ObjectId {
        self.object
    }

    pub fn instance_id(&self) -> Option<InstanceId> {
        self.instance
    }

    pub fn resource_id(&self) -> Option<ResourceId> {
        self.resource
    }

    /// The object-instance prefix of this path, if it has one.
    pub fn instance_path(&self) -> Option<Self> {
        self.instance.map(|i| Self::object_instance(self.object, i))
    }

    pub fn is_resource(&self) -> bool {
        self.resource.is_some()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.object)?;
        if let Some(instance) = self.instance {
            write!(f, "/{instance}")?;
        }
        if let Some(resource) = self.resource {
            write!(f, "/{resource}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| Error::InvalidPath {
            path: s.to_owned(),
            reason: reason.to_owned(),
        };

        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;
        let segments: Vec<u16> = rest
            .split('/')
            .map(|seg| seg.parse::<u16>().map_err(|_| invalid("segment is not an ID")))
            .collect::<Result<_, _>>()?;

        if segments.contains(&u16::MAX) {
            return Err(invalid("65535 is reserved"));
        }

        match segments.as_slice() {
            [object] => Ok(Self::object(*object)),
            [object, instance] => Ok(Self::object_instance(*object, *instance)),
            [object, instance, resource] => Ok(Self::resource(*object, *instance, *resource)),
            _ => Err(invalid("expected one to three segments")),
        }
    }
}

impl TryFrom<String> for Path {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn displays_each_depth() {
        assert_eq!(Path::object(20001).to_string(), "/20001");
        assert_eq!(Path::object_instance(3311, 0).to_string(), "/3311/0");
        assert_eq!(Path::resource(3200, 0, 5501).to_string(), "/3200/0/5501");
    }

    #[test]
    fn parses_resource_path() {
        let path: Path = "/3311/0/5850".parse().unwrap();
        assert_eq!(path, Path::resource(3311, 0, 5850));
        assert_eq!(path.instance_path(), Some(Path::object_instance(3311, 0)));
        assert!(path.is_resource());
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", "3311/0", "/", "/3311/x", "/1/2/3/4", "/65535"] {
            assert!(bad.parse::<Path>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Path::object_instance(20001, 0)).unwrap();
        assert_eq!(json, "\"/20001/0\"");
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Path::object_instance(20001, 0));
    }
}
