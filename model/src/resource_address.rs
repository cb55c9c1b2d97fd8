use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The address of a single managed resource instance inside a module, e.g. `aws_subnet.public[1]`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ResourceAddress {
    pub resource_type: String,
    pub name: String,
    pub index: Option<usize>,
}

impl ResourceAddress {
    pub fn single<S1, S2>(resource_type: S1, name: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            index: None,
        }
    }

    /// One address per `count` instance, in index order.
    pub fn counted<S1, S2>(resource_type: S1, name: S2, count: usize) -> Vec<Self>
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let resource_type = resource_type.into();
        let name = name.into();
        (0..count)
            .map(|index| Self {
                resource_type: resource_type.clone(),
                name: name.clone(),
                index: Some(index),
            })
            .collect()
    }
}

impl Display for ResourceAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}.{}[{}]", self.resource_type, self.name, index),
            None => write!(f, "{}.{}", self.resource_type, self.name),
        }
    }
}
