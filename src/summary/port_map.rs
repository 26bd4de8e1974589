use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Port-keyed entries kept in the order they were first recorded.
///
/// Recording a port twice replaces the earlier value in place. Serializes as a
/// JSON object whose keys are the port numbers as strings.
#[derive(Debug, Clone, PartialEq)]
pub struct PortMap<T> {
    entries: Vec<(u32, T)>,
}

impl<T> PortMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, port: u32, value: T) {
        match self.entries.iter_mut().find(|(p, _)| *p == port) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((port, value)),
        }
    }

    pub fn get(&self, port: u32) -> Option<&T> {
        self.entries
            .iter()
            .find(|(p, _)| *p == port)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.entries.iter().map(|(port, value)| (*port, value))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn ports(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|(port, _)| *port)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for PortMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize> Serialize for PortMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (port, value) in &self.entries {
            map.serialize_entry(port, value)?;
        }
        map.end()
    }
}

struct PortMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for PortMapVisitor<T> {
    type Value = PortMap<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map keyed by port number")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut ports = PortMap::new();
        while let Some((port, value)) = access.next_entry::<u32, T>()? {
            ports.insert(port, value);
        }
        Ok(ports)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for PortMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PortMapVisitor(PhantomData))
    }
}
