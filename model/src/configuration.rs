use crate::error::{self, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use snafu::ResultExt;
use std::fmt::Debug;

/// The `Configuration` trait is for "plain old data" structs that are handed to a provider or
/// recorded by it: the configuration a provider needs, the progress memo it keeps and the resource
/// description it returns.
///
/// Every such type can be viewed as an untyped JSON object, which is how the values are logged and
/// how a memo is stored by an info client.
pub trait Configuration:
    Serialize + DeserializeOwned + Clone + Debug + Default + Send + Sync + Sized + 'static
{
    /// Convert the `Configuration` object to a serde `Map`.
    fn into_map(self) -> Result<Map<String, Value>> {
        match self.into_value()? {
            Value::Object(map) => Ok(map),
            _ => error::ConfigWrongValueTypeSnafu {}.fail(),
        }
    }

    /// Convert the `Configuration` object to a serde `Value`.
    fn into_value(self) -> Result<Value> {
        serde_json::to_value(self).context(error::ConfigSerializationSnafu)
    }

    /// Deserialize the `Configuration` object from a serde `Map`.
    fn from_map(map: Map<String, Value>) -> Result<Self> {
        Self::from_value(Value::Object(map))
    }

    /// Deserialize the `Configuration` object from a serde `Value`.
    fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).context(error::ConfigDeserializationSnafu)
    }
}

#[cfg(test)]
mod test {
    use super::Configuration;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Memo {
        current_status: String,
        attempts: u32,
    }

    impl Configuration for Memo {}

    #[test]
    fn map_view() {
        let memo = Memo {
            current_status: "Applying".into(),
            attempts: 1,
        };
        let map = memo.clone().into_map().unwrap();
        assert_eq!(map.get("current_status"), Some(&json!("Applying")));
        assert_eq!(Memo::from_map(map).unwrap(), memo);
    }

    #[test]
    fn non_object_value() {
        assert!(Memo::from_value(json!("nope")).is_err());
    }
}
