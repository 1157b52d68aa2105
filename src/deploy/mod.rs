// ABOUTME: Deployment pipeline stages and the type state pipeline that sequences them.
// ABOUTME: Exports each stage operation, the build recipe and the stage error type.

pub mod environment;
mod error;
mod pipeline;
pub mod proxy;
mod recipe;
pub mod release;
pub mod repository;
mod state;
mod step;
pub mod teardown;
pub mod transfer;
pub mod verify;

pub use environment::{Dependency, EnvironmentReport, InstallOutcome, Installer, prepare_remote};
pub use error::{DeployError, DeployErrorKind};
pub use pipeline::{DeploymentReport, Pipeline, resolve_home, run_pipeline};
pub use recipe::{COMPOSE_FILES, DOCKERFILE, Recipe};
pub use repository::{HostFamily, authenticated_url, detect_docker_config, sync_repository};
pub use state::{
    Connected, HasRecipe, Prepared, Proxied, Released, Started, Synced, Transferred, Verified,
};
pub use teardown::{TeardownReport, confirmed_teardown, teardown};
pub use verify::{ExternalProbe, HttpProbe, validate};
