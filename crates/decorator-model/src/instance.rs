use serde::{Deserialize, Serialize};

/// Metadata describing the instance a node runs on.
///
/// Decoded from the metadata service `instance` document. Fields the decorator
/// does not use are ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceData {
    /// Numeric instance identifier.
    pub id: u64,
    /// Human readable instance name.
    pub label: String,
    /// Region the instance runs in.
    pub region: String,
    /// Instance plan / type.
    #[serde(rename = "type")]
    pub instance_type: String,
    /// Identifier of the physical host.
    pub host_uuid: String,
    /// Raw free-form tags, in the order the source reported them.
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::InstanceData;

    #[test]
    fn decodes_metadata_document() {
        let json = r#"{
            "id": 42,
            "label": "my-host",
            "region": "us-east",
            "type": "g6-standard-2",
            "host_uuid": "abc-123",
            "tags": ["env=prod", "team"],
            "specs": {"vcpus": 2, "memory": 4096, "gpus": 0, "transfer": 4000, "disk": 81920},
            "backups": {"enabled": false, "status": null}
        }"#;

        let data: InstanceData = serde_json::from_str(json).unwrap();
        assert_eq!(data.id, 42);
        assert_eq!(data.label, "my-host");
        assert_eq!(data.region, "us-east");
        assert_eq!(data.instance_type, "g6-standard-2");
        assert_eq!(data.host_uuid, "abc-123");
        assert_eq!(data.tags, vec!["env=prod", "team"]);
    }

    #[test]
    fn missing_tags_decode_as_empty() {
        let json = r#"{"id": 1, "label": "a", "region": "r", "type": "t", "host_uuid": "h"}"#;
        let data: InstanceData = serde_json::from_str(json).unwrap();
        assert!(data.tags.is_empty());
    }

    #[test]
    fn type_field_is_renamed_on_encode() {
        let data = InstanceData {
            instance_type: "g6-nanode-1".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains(r#""type":"g6-nanode-1""#));
    }
}
