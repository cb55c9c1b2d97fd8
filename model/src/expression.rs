use serde::Serialize;
use std::fmt::Debug;

/// A value handed to a Terraform module input. It is either a literal that serializes as-is or a
/// Terraform expression that is embedded in the JSON configuration as a `${...}` template string.
#[derive(Serialize, Clone, Debug, Eq, PartialEq)]
#[serde(untagged)]
pub enum TfValue<T>
where
    T: Serialize + Clone + Debug,
{
    Value(T),
    Expression(String),
}

impl<T> TfValue<T>
where
    T: Serialize + Clone + Debug,
{
    /// Wrap a bare expression such as `var.region` into a template string.
    pub fn expression<S: AsRef<str>>(expression: S) -> Self {
        Self::Expression(template(expression))
    }
}

impl<T> From<T> for TfValue<T>
where
    T: Serialize + Clone + Debug,
{
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

/// `var.app_name` -> `${var.app_name}`
pub(crate) fn template<S: AsRef<str>>(expression: S) -> String {
    format!("${{{}}}", expression.as_ref())
}
