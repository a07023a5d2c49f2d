use serde::{Deserialize, Serialize};

/// Resource hints an executor reports when asking for work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    #[serde(rename = "numCPUs", default)]
    pub num_cpus: i32,
    #[serde(default)]
    pub memory: String,
    #[serde(rename = "diskSpace", default)]
    pub disk_space: String,
}
