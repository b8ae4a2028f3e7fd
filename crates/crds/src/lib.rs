//! HypershiftDeployment CRD Definitions
//!
//! Kubernetes resource types shared by the HypershiftDeployment controller:
//! the user-facing `HypershiftDeployment` intent, the Open Cluster Management
//! `ManifestWork` bundle it owns, and the status conditions both carry.

pub mod condition;
pub mod hypershift_deployment;
pub mod manifest_work;

pub use condition::*;
pub use hypershift_deployment::*;
pub use manifest_work::*;
