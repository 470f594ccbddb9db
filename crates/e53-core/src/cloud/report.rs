//! Property report payloads
//!
//! A report carries one service with one key/value property:
//!
//! ```json
//! {"services":[{"service_id":"Infrared","properties":{"Infrared_Status":"Intrude"}}]}
//! ```

use alloc::vec::Vec;
use core::fmt::Write;

use heapless::String;
use log::error;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::ReportError;

/// Longest topic [`report_topic`] can build.
pub const MAX_TOPIC_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue<'a> {
    Text(&'a str),
    Integer(i64),
}

/// A single `key: value` entry serialised as a JSON object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Property<'a> {
    pub key: &'a str,
    pub value: PropertyValue<'a>,
}

impl Serialize for Property<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, &self.value)?;
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServiceProperties<'a> {
    pub service_id: &'a str,
    pub properties: Property<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PropertyReport<'a> {
    pub services: [ServiceProperties<'a>; 1],
}

impl<'a> PropertyReport<'a> {
    pub fn single(service_id: &'a str, key: &'a str, value: PropertyValue<'a>) -> Self {
        Self {
            services: [ServiceProperties {
                service_id,
                properties: Property { key, value },
                event_time: None,
            }],
        }
    }

    /// Attach a timestamp in the cloud's `yyyyMMddTHHmmssZ` format.
    pub fn with_event_time(mut self, event_time: &'a str) -> Self {
        self.services[0].event_time = Some(event_time);
        self
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ReportError> {
        serde_json::to_vec(self).map_err(|e| {
            error!("Property report serialisation failed: {:?}", e);
            ReportError::Serialize
        })
    }
}

/// Topic the device publishes property reports on.
pub fn report_topic(device_id: &str) -> Result<String<MAX_TOPIC_LEN>, ReportError> {
    let mut topic = String::new();
    write!(topic, "$oc/devices/{}/sys/properties/report", device_id).map_err(|_| {
        error!("Report topic for device '{}' is too long", device_id);
        ReportError::TopicTooLong {
            capacity: MAX_TOPIC_LEN,
        }
    })?;
    Ok(topic)
}
