pub extern crate k8s_openapi;

pub mod admission_request;
pub mod admission_response;
pub mod errors;
pub mod patch;
pub mod policy;
pub mod settings;
pub mod workload;

pub use policy::{Decision, LabelPolicy};
pub use settings::{LabelCheckMode, PolicySettings};
pub use workload::WorkloadObject;
