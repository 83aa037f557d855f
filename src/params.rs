//! Query parameter encoding shared by all endpoints.
//!
//! The API expects booleans as `1`/`0` and lists as comma-separated strings,
//! neither of which is what `serde_urlencoded` produces by default. Query
//! structs opt into these encodings with `serialize_with`.

use serde::Serializer;

/// Serialize `Option<bool>` as `1`/`0`.
///
/// Pair with `skip_serializing_if = "Option::is_none"`.
pub(crate) fn int_bool<S: Serializer>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(b) => serializer.serialize_u8(u8::from(*b)),
        None => serializer.serialize_none(),
    }
}

/// Serialize `Option<Vec<String>>` as one comma-joined string.
///
/// Pair with `skip_serializing_if = "Option::is_none"`.
pub(crate) fn comma_list<S: Serializer>(
    value: &Option<Vec<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(list) => serializer.serialize_str(&list.join(",")),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    #[derive(Serialize, Default)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        #[serde(serialize_with = "super::int_bool", skip_serializing_if = "Option::is_none")]
        skip_empty: Option<bool>,
        #[serde(serialize_with = "super::comma_list", skip_serializing_if = "Option::is_none")]
        fields: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u64>,
    }

    #[test]
    fn test_bool_serializes_as_int() {
        let query = Sample {
            skip_empty: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_qs::to_string(&query).unwrap(), "skipEmpty=1");

        let query = Sample {
            skip_empty: Some(false),
            ..Default::default()
        };
        assert_eq!(serde_qs::to_string(&query).unwrap(), "skipEmpty=0");
    }

    #[test]
    fn test_list_serializes_comma_joined() {
        let query = Sample {
            fields: Some(vec!["url".to_string(), "title".to_string()]),
            ..Default::default()
        };
        let serialized = serde_qs::to_string(&query).unwrap();
        assert!(serialized.starts_with("fields=url"));
        assert!(serialized.contains("title"));
        assert!(!serialized.contains("fields[0]"));
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let serialized = serde_qs::to_string(&Sample::default()).unwrap();
        assert!(serialized.is_empty());

        let query = Sample {
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(serde_qs::to_string(&query).unwrap(), "limit=10");
    }
}
