// ABOUTME: Pipeline state markers for the type state pattern.
// ABOUTME: Each marker names the stages completed so far and carries what they decided.

use super::environment::EnvironmentReport;
use super::recipe::Recipe;

/// Context built, nothing run yet.
/// Available actions: `check_connectivity()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Started;

/// Remote host answered over SSH.
/// Available actions: `sync_repository()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Connected;

/// Working copy is at the branch tip and its build recipe is known.
/// Available actions: `prepare_remote()`
#[derive(Debug, Clone, Copy)]
pub struct Synced {
    pub(crate) recipe: Recipe,
}

/// Engine, compose tool and proxy are installed and running.
/// Available actions: `transfer()`
#[derive(Debug, Clone)]
pub struct Prepared {
    pub(crate) recipe: Recipe,
    pub(crate) environment: EnvironmentReport,
}

/// Files are on the remote host.
/// Available actions: `release()`
#[derive(Debug, Clone)]
pub struct Transferred {
    pub(crate) recipe: Recipe,
    pub(crate) environment: EnvironmentReport,
}

/// New release started and settled.
/// Available actions: `configure_proxy()`
#[derive(Debug, Clone)]
pub struct Released {
    pub(crate) recipe: Recipe,
    pub(crate) environment: EnvironmentReport,
}

/// Proxy site installed and reloaded.
/// Available actions: `validate()`
#[derive(Debug, Clone)]
pub struct Proxied {
    pub(crate) recipe: Recipe,
    pub(crate) environment: EnvironmentReport,
}

/// Container confirmed running; probes done.
/// Available actions: `finish()`
#[derive(Debug, Clone)]
pub struct Verified {
    pub(crate) recipe: Recipe,
    pub(crate) environment: EnvironmentReport,
}

/// Accessor for the recipe decided by the repository stage.
pub trait HasRecipe {
    fn recipe(&self) -> Recipe;
}

macro_rules! has_recipe {
    ($($state:ty),*) => {
        $(impl HasRecipe for $state {
            fn recipe(&self) -> Recipe {
                self.recipe
            }
        })*
    };
}

has_recipe!(Synced, Prepared, Transferred, Released, Proxied, Verified);
