use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::version::WireFormat;

/// 下发给 executor 的任务载荷
///
/// 字段顺序和空值表示属于对外协议：列表类字段缺省时序列化为 `null`，
/// `files` 始终序列化为对象。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub repository_name: String,
    #[serde(default)]
    pub repository_directory: String,
    #[serde(default)]
    pub commit: String,
    #[serde(default)]
    pub fetch_tags: bool,
    #[serde(default)]
    pub shallow_clone: bool,
    #[serde(default)]
    pub sparse_checkout: Option<Vec<String>>,
    #[serde(default)]
    pub files: BTreeMap<String, VirtualMachineFile>,
    #[serde(default)]
    pub docker_steps: Option<Vec<DockerStep>>,
    #[serde(default)]
    pub cli_steps: Option<Vec<CliStep>>,
    #[serde(default)]
    pub redacted_values: Option<BTreeMap<String, String>>,
    /// 仅在 V2 格式中输出
    #[serde(default, skip_serializing)]
    pub docker_auth_config: DockerAuthConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineFile {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerStep {
    #[serde(default)]
    pub key: String,
    pub image: String,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub dir: String,
    #[serde(default)]
    pub env: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliStep {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub dir: String,
    #[serde(default)]
    pub env: Vec<String>,
}

/// Registry credentials handed to V2 executors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DockerAuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auths: Option<BTreeMap<String, DockerAuthConfigAuth>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DockerAuthConfigAuth {
    pub auth: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JobV2<'a> {
    version: u8,
    #[serde(flatten)]
    job: &'a Job,
    docker_auth_config: &'a DockerAuthConfig,
}

/// A [`Job`] paired with the wire format negotiated for the calling executor.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedJob {
    pub format: WireFormat,
    pub job: Job,
}

impl VersionedJob {
    pub fn new(format: WireFormat, job: Job) -> Self {
        Self { format, job }
    }
}

impl Serialize for VersionedJob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.format {
            WireFormat::Baseline => self.job.serialize(serializer),
            WireFormat::V2 => JobV2 {
                version: 2,
                job: &self.job,
                docker_auth_config: &self.job.docker_auth_config,
            }
            .serialize(serializer),
        }
    }
}
