//! Hub Cluster API Client
//!
//! Typed access to the objects the HypershiftDeployment controller reads and
//! writes on the hub cluster: `ManifestWork` bundles, referenced `Secret`s and
//! the `HypershiftDeployment` status/finalizers.
//!
//! # Example
//!
//! ```no_run
//! use hub_client::{HubClientTrait, KubeHubClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = KubeHubClient::new(kube::Client::try_default().await?);
//!
//! match client.get_manifest_work("local-cluster", "my-cluster-abc12").await {
//!     Ok(work) => println!("found {:?}", work.metadata.name),
//!     Err(e) if e.is_not_found() => println!("not created yet"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
#[path = "trait.rs"]
pub mod hub_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::KubeHubClient;
pub use error::HubError;
pub use hub_trait::HubClientTrait;
#[cfg(feature = "test-util")]
pub use mock::{HubCall, HubOperation, MockHubClient};
