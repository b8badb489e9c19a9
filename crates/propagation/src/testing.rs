//! Shared fixtures for unit tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use contracts::{
    ConsumerTransport, ContractError, JobSubmitter, OutboundRequest, PropagationJob,
    RemoteResponse, ResourceDocument, ResourceUuid, Resourceable,
};

pub const SENDER: &str = "7a0c1d2e3f4a5b6c7d8e9f0a1b2c3d4e";
pub const CONSUMER: &str = "c1";
pub const REALM: &str = "e75234809111012d05ac478a8af8d2ea";
pub const OTHER_REALM: &str = "289e0df0219f012e52fb6c626d58b44c";
pub const SECRET: &str = "shared-secret";
pub const JENNY_UUID: &str = "84e8a690b6e1012e744a6c626d58b44c";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderModel {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub notes: String,
}

impl ProviderModel {
    pub fn new(uuid: &str, name: &str) -> Self {
        Self {
            uuid: uuid.to_string(),
            name: name.to_string(),
            notes: String::new(),
        }
    }
}

impl Resourceable for ProviderModel {
    const RESOURCE_TYPE: &'static str = "provider_models";
    const TRANSMISSIBLE_FIELDS: &'static [&'static str] = &["name", "uuid"];

    fn uuid(&self) -> ResourceUuid {
        self.uuid.as_str().into()
    }
}

/// Stored form of Jenny with an empty registry
pub fn jenny() -> ResourceDocument {
    let mut model = ProviderModel::new(JENNY_UUID, "Jenny");
    model.notes = "internal".into();
    crate::serializer::to_document(&model).unwrap()
}

/// Records every request; answers by URL prefix, falling back to a default status
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<OutboundRequest>>,
    default_status: u16,
    overrides: Mutex<Vec<(String, u16)>>,
}

impl RecordingTransport {
    pub fn with_status(status: u16) -> Self {
        Self {
            default_status: status,
            ..Default::default()
        }
    }

    pub fn respond(&self, url_prefix: &str, status: u16) {
        self.overrides
            .lock()
            .unwrap()
            .push((url_prefix.to_string(), status));
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ConsumerTransport for RecordingTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RemoteResponse, ContractError> {
        let status = self
            .overrides
            .lock()
            .unwrap()
            .iter()
            .find(|(prefix, _)| request.url.starts_with(prefix))
            .map_or(self.default_status, |(_, status)| *status);
        self.requests.lock().unwrap().push(request);
        Ok(RemoteResponse { status })
    }
}

/// Collects submitted jobs instead of running them
#[derive(Debug, Clone, Default)]
pub struct RecordingSubmitter {
    jobs: Arc<Mutex<Vec<PropagationJob>>>,
    closed: Arc<AtomicBool>,
}

impl RecordingSubmitter {
    pub fn jobs(&self) -> Vec<PropagationJob> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl JobSubmitter for RecordingSubmitter {
    fn queue_name(&self) -> &str {
        "resource"
    }

    async fn submit(&self, job: PropagationJob) -> Result<(), ContractError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ContractError::QueueClosed {
                queue: "resource".into(),
            });
        }
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }
}
