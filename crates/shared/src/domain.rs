use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(ClusterId);
id_newtype!(ArticleId);

pub const DEFAULT_GROUP: &str = "default";
pub const COMBINE_GROUP: &str = "combine";
pub const IGNORE_GROUP: &str = "ignore";

/// Groups that always exist for a cluster, in display order.
pub const RESERVED_GROUPS: [&str; 3] = [DEFAULT_GROUP, COMBINE_GROUP, IGNORE_GROUP];

/// Groups never offered as a destination in the group picker.
pub const NON_ADDABLE_GROUPS: [&str; 2] = [COMBINE_GROUP, IGNORE_GROUP];

const COMBINED_WIRE: &str = "COMBINED";
const IGNORED_WIRE: &str = "IGNORED";

/// Review status as delivered by the data source.
///
/// The closed variants map to the reserved groups; any other string names a
/// custom group the article starts in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArticleStatus {
    #[default]
    Default,
    Combined,
    Ignored,
    Custom(String),
}

impl ArticleStatus {
    /// Group an article with this status is placed in when a cluster is first partitioned.
    pub fn initial_group(&self) -> &str {
        match self {
            ArticleStatus::Default => DEFAULT_GROUP,
            ArticleStatus::Combined => COMBINE_GROUP,
            ArticleStatus::Ignored => IGNORE_GROUP,
            ArticleStatus::Custom(name) => name,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ArticleStatus::Default)
    }
}

impl From<String> for ArticleStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" => ArticleStatus::Default,
            COMBINED_WIRE => ArticleStatus::Combined,
            IGNORED_WIRE => ArticleStatus::Ignored,
            _ => ArticleStatus::Custom(value),
        }
    }
}

impl From<&str> for ArticleStatus {
    fn from(value: &str) -> Self {
        ArticleStatus::from(value.to_string())
    }
}

impl From<ArticleStatus> for String {
    fn from(value: ArticleStatus) -> Self {
        match value {
            ArticleStatus::Default => String::new(),
            ArticleStatus::Combined => COMBINED_WIRE.to_string(),
            ArticleStatus::Ignored => IGNORED_WIRE.to_string(),
            ArticleStatus::Custom(name) => name,
        }
    }
}
