// ── Object/resource catalog ──
//
// Immutable description of the LWM2M objects the gateway works with.
// Built once at startup and shared by reference with the definition,
// provisioning, and polling code.

use strum::Display;

use flowgate_api::lwm2m::{
    InstanceId, ObjectDefinition, ObjectId, Path, ResourceDefinition, ResourceId, ResourceType,
};

pub const BUTTON_OBJECT_ID: ObjectId = 3200;
pub const BUTTON_RESOURCE_ID: ResourceId = 5501;
pub const BUTTON_CLIENT_ID: &str = "ButtonDevice";

pub const LED_OBJECT_ID: ObjectId = 3311;
pub const LED_RESOURCE_ID: ResourceId = 5850;
pub const LED_CLIENT_ID: &str = "LedDevice";

/// Object instance whose presence on the client means the gateway is provisioned.
pub const GATEWAY_ACCESS_PATH: Path = Path::object_instance(20001, 0);

const MIN_INSTANCES: u16 = 0;
const MAX_INSTANCES: u16 = 1;

/// What an object is used for by the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ObjectRole {
    Button,
    Led,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub id: ResourceId,
    pub instance: u16,
    pub kind: ResourceType,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    /// Endpoint name of the constrained device that hosts this object.
    pub client_id: String,
    pub id: ObjectId,
    pub instance: InstanceId,
    pub name: String,
    pub role: ObjectRole,
    pub resources: Vec<ResourceDescriptor>,
}

impl ObjectDescriptor {
    pub fn instance_path(&self) -> Path {
        Path::object_instance(self.id, self.instance)
    }

    /// Path of the first (and for this gateway, only) resource.
    pub fn primary_resource_path(&self) -> Option<Path> {
        self.resources
            .first()
            .map(|r| Path::resource(self.id, self.instance, r.id))
    }

    /// The definition submitted to a session: every resource mandatory,
    /// read-write, with a zero/false default.
    pub fn definition(&self) -> Result<ObjectDefinition, flowgate_api::Error> {
        let mut object = ObjectDefinition::new(self.id, &self.name, MIN_INSTANCES, MAX_INSTANCES);
        for resource in &self.resources {
            object.add_resource(ResourceDefinition::read_write(
                resource.id,
                &resource.name,
                resource.kind,
            ))?;
        }
        Ok(object)
    }
}

/// Ordered, read-only set of object descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    objects: Vec<ObjectDescriptor>,
}

impl Catalog {
    pub fn new(objects: Vec<ObjectDescriptor>) -> Self {
        Self { objects }
    }

    /// The button input and LED output objects.
    pub fn standard() -> Self {
        Self::new(vec![
            ObjectDescriptor {
                client_id: BUTTON_CLIENT_ID.into(),
                id: BUTTON_OBJECT_ID,
                instance: 0,
                name: "DigitalInput".into(),
                role: ObjectRole::Button,
                resources: vec![ResourceDescriptor {
                    id: BUTTON_RESOURCE_ID,
                    instance: 0,
                    kind: ResourceType::Integer,
                    name: "Counter".into(),
                }],
            },
            ObjectDescriptor {
                client_id: LED_CLIENT_ID.into(),
                id: LED_OBJECT_ID,
                instance: 0,
                name: "LightControl".into(),
                role: ObjectRole::Led,
                resources: vec![ResourceDescriptor {
                    id: LED_RESOURCE_ID,
                    instance: 0,
                    kind: ResourceType::Boolean,
                    name: "On/Off".into(),
                }],
            },
        ])
    }

    pub fn objects(&self) -> &[ObjectDescriptor] {
        &self.objects
    }

    pub fn by_role(&self, role: ObjectRole) -> Option<&ObjectDescriptor> {
        self.objects.iter().find(|o| o.role == role)
    }

    pub fn button(&self) -> Option<&ObjectDescriptor> {
        self.by_role(ObjectRole::Button)
    }

    pub fn led(&self) -> Option<&ObjectDescriptor> {
        self.by_role(ObjectRole::Led)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
