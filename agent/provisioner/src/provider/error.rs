use std::fmt::{Display, Formatter};

/// When a [`Create`] or [`Destroy`] implementation returns an error, it must explicitly state
/// whether or not it has left cloud resources behind.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Resources {
    /// Resources were left behind and a destroy run cannot remove them; they must be cleaned up by
    /// hand.
    Orphaned,

    /// Resources were left behind and `destroy-network-cluster` can remove them.
    Remaining,

    /// Nothing was provisioned, e.g. validation or rendering failed before `terraform apply`.
    Clear,

    /// It is not known whether anything is left; running a destroy is the safe choice.
    Unknown,
}

impl Resources {
    pub fn message(&self) -> &'static str {
        match self {
            Resources::Orphaned => "An error left orphaned resources that cannot be destroyed",
            Resources::Remaining => "An error left resources behind that can be destroyed",
            Resources::Clear => "An error occurred but no resources were left behind",
            Resources::Unknown => {
                "An error occurred and it is unknown whether or not resources were left behind"
            }
        }
    }

    /// Whether a destroy run should follow this error.
    pub fn needs_destroy(&self) -> bool {
        matches!(self, Resources::Remaining | Resources::Unknown)
    }
}

impl Display for Resources {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.message(), f)
    }
}

/// Implemented by types that can tell whether resources remain, such as a provider's memo.
pub trait AsResources {
    fn as_resources(&self) -> Resources;
}

impl AsResources for Resources {
    fn as_resources(&self) -> Resources {
        *self
    }
}

impl AsResources for &Resources {
    fn as_resources(&self) -> Resources {
        **self
    }
}

/// The error type returned by [`Create`] and [`Destroy`] implementations.
#[derive(Debug)]
pub struct ProviderError {
    resources: Resources,
    context: Option<String>,
    inner: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

impl ProviderError {
    pub fn new_with_source_and_context<R, S, E>(resources: R, context: S, source: E) -> Self
    where
        R: AsResources,
        S: Into<String>,
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            resources: resources.as_resources(),
            context: Some(context.into()),
            inner: Some(source.into()),
        }
    }

    pub fn new_with_context<R, S>(resources: R, context: S) -> Self
    where
        R: AsResources,
        S: Into<String>,
    {
        Self {
            resources: resources.as_resources(),
            context: Some(context.into()),
            inner: None,
        }
    }

    pub fn resources(&self) -> Resources {
        self.resources
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn inner(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.inner.as_deref()
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.context(), self.inner()) {
            (Some(context), Some(inner)) => write!(f, "{}: {}", context, inner)?,
            (Some(context), None) => write!(f, "{}", context)?,
            (None, Some(inner)) => write!(f, "{}", inner)?,
            (None, None) => {}
        }
        write!(f, " ({})", self.resources)
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Converts errors and options into a `ProviderError` with a `context` call that also names the
/// resource situation at that point.
pub trait IntoProviderError<T> {
    fn context<R, S>(self, resources: R, message: S) -> ProviderResult<T>
    where
        S: Into<String>,
        R: AsResources;
}

impl<T, E> IntoProviderError<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<R, S>(self, resources: R, message: S) -> ProviderResult<T>
    where
        S: Into<String>,
        R: AsResources,
    {
        self.map_err(|e| ProviderError::new_with_source_and_context(resources, message, e))
    }
}

impl<T> IntoProviderError<T> for std::option::Option<T> {
    fn context<R, S>(self, r: R, m: S) -> ProviderResult<T>
    where
        S: Into<String>,
        R: AsResources,
    {
        self.ok_or_else(|| ProviderError::new_with_context(r, m))
    }
}

#[cfg(test)]
mod test {
    use super::{IntoProviderError, ProviderError, Resources};

    #[test]
    fn display_names_resources() {
        let error = ProviderError::new_with_context(Resources::Remaining, "terraform apply failed");
        assert_eq!(
            error.to_string(),
            "terraform apply failed (An error left resources behind that can be destroyed)"
        );
        assert!(error.resources().needs_destroy());
    }

    #[test]
    fn option_context() {
        let missing: Option<u8> = None;
        let error = missing.context(Resources::Clear, "nothing here").unwrap_err();
        assert_eq!(error.resources(), Resources::Clear);
        assert!(!error.resources().needs_destroy());
    }
}
