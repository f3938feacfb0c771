//! Expression language tag as written in block properties.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Jmespath,
    Sql,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Jmespath => "jmespath",
            Language::Sql => "sql",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jmespath" => Ok(Language::Jmespath),
            "sql" => Ok(Language::Sql),
            other => Err(format!("unknown expression language '{other}'")),
        }
    }
}
