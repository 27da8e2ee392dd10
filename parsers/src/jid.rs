use std::{fmt, str::FromStr};

use thiserror::Error;

/// Reasons an address string is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JidError {
    #[error("@ not found in {0:?}")]
    MissingAt(String),
    #[error("empty local part in {0:?}")]
    EmptyLocal(String),
    #[error("empty domain part in {0:?}")]
    EmptyDomain(String),
    #[error("empty resource part in {0:?}")]
    EmptyResource(String),
}

/// XMPP address of the form <localpart@domainpart/resourcepart>
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Jid {
    pub local_part: String,
    pub domain_part: String,
    pub resource_part: Option<String>,
}

impl Jid {
    /// Creates a new JID
    ///
    /// ## Generic Types
    /// - `T`: Any type that can be turned into String
    /// - `U`: Any type that can be turned into String
    ///
    /// ## Params
    /// - `local_part`: Local part of the JID
    /// - `domain_part`: Domain part of the JID
    pub fn new<T, U>(local_part: T, domain_part: U) -> Self
    where
        T: Into<String>,
        U: Into<String>,
    {
        Self {
            local_part: local_part.into(),
            domain_part: domain_part.into(),
            ..Default::default()
        }
    }

    /// Adds resource
    ///
    /// ## Generic Types
    /// - `T`: Any type that can be turned into String
    ///
    /// ## Params
    /// - `resource_part`: Resource part of the JID
    pub fn with_resource<T>(mut self, resource_part: T) -> Self
    where
        T: Into<String>,
    {
        self.resource_part = Some(resource_part.into());
        self
    }

    pub fn local_part(&self) -> &str {
        self.local_part.as_ref()
    }

    pub fn domain_part(&self) -> &str {
        self.domain_part.as_ref()
    }

    pub fn resource_part(&self) -> Option<&str> {
        self.resource_part.as_deref()
    }

    /// Returns the bare JID without resource
    pub fn bare(&self) -> Jid {
        Jid::new(self.local_part.clone(), self.domain_part.clone())
    }
}

impl FromStr for Jid {
    type Err = JidError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (local_part, rest) = value
            .split_once('@')
            .ok_or_else(|| JidError::MissingAt(value.to_string()))?;

        if local_part.is_empty() {
            return Err(JidError::EmptyLocal(value.to_string()));
        }

        let (domain_part, resource_part) = match rest.split_once('/') {
            Some((domain_part, resource_part)) => (domain_part, Some(resource_part)),
            None => (rest, None),
        };

        if domain_part.is_empty() {
            return Err(JidError::EmptyDomain(value.to_string()));
        }

        let jid = Jid::new(local_part, domain_part);
        match resource_part {
            Some("") => Err(JidError::EmptyResource(value.to_string())),
            Some(resource_part) => Ok(jid.with_resource(resource_part)),
            None => Ok(jid),
        }
    }
}

impl TryFrom<String> for Jid {
    type Error = JidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource_part {
            Some(resource_part) => {
                write!(f, "{}@{}/{}", self.local_part, self.domain_part, resource_part)
            }
            None => write!(f, "{}@{}", self.local_part, self.domain_part),
        }
    }
}
