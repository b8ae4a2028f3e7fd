//! # CRD Generator
//!
//! Prints the `HypershiftDeployment` CustomResourceDefinition as YAML.
//!
//! ```bash
//! cargo run -p crds --bin crdgen > config/crd/hypershiftdeployment.yaml
//! ```
//!
//! `ManifestWork` is owned by Open Cluster Management and is not generated.

use crds::HypershiftDeployment;
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    print!("{}", serde_yaml::to_string(&HypershiftDeployment::crd())?);
    Ok(())
}
