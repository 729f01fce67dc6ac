use thiserror::Error;

use crate::config::ConfigError;
use crate::filter::FilterError;
use crate::input::InputError;
use crate::registry::RegistryError;
use crate::report::ReportError;
use crate::smarts::SmartsError;
use crate::smiles::SmilesError;
use crate::toolkit::ToolkitError;

/// Any error the crate can produce.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Smiles(#[from] SmilesError),
    #[error(transparent)]
    Smarts(#[from] SmartsError),
    #[error(transparent)]
    Toolkit(#[from] ToolkitError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
