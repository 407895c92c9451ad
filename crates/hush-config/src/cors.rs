use std::time::Duration;

use serde::{Deserialize, Deserializer, de};

/// CORS policy for the browser front-end
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins, `"*"` or a list
    #[serde(default)]
    pub origins: AnyOrList,
    /// Allowed HTTP methods, `"*"` or a list
    #[serde(default)]
    pub methods: AnyOrList,
    /// Allowed request headers, `"*"` or a list
    #[serde(default)]
    pub headers: AnyOrList,
    /// Preflight cache lifetime in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl CorsConfig {
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }
}

/// Either the `"*"` wildcard or an explicit list of values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnyOrList {
    #[default]
    Any,
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for AnyOrList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        let values = match Raw::deserialize(deserializer)
            .map_err(|_| de::Error::custom("expected \"*\" or an array of strings"))?
        {
            Raw::One(value) => vec![value],
            Raw::Many(values) => values,
        };

        if values.iter().any(|value| value == "*") {
            Ok(Self::Any)
        } else {
            Ok(Self::List(values))
        }
    }
}
