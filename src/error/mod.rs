/////////////////////////////////////////////////////////////////////////////////////
//
// Contagion model
//
// error module
//
// the one error type shared by the engine, the loaders and the driver
//
////////////////////////////////////////////////////////////////////////////////////

use std::fmt::{self, Display};
use std::io;

#[derive(Debug)]
pub enum ContagionError {
    // graph construction
    UnknownContact(String),
    DuplicatePerson(String),
    PopulationSealed(String),
    ProbabilitiesAlreadyDerived,

    // simulation
    ProbabilitiesNotDerived,
    EmptyPopulation,
    Unseedable,

    // parameters and files
    Parameter(String),
    Io(io::Error),
    Csv(csv::Error),
    Yaml(yaml_rust::ScanError),
}

impl From<io::Error> for ContagionError {
    fn from(error: io::Error) -> Self {
        ContagionError::Io(error)
    }
}

impl From<csv::Error> for ContagionError {
    fn from(error: csv::Error) -> Self {
        ContagionError::Csv(error)
    }
}

impl From<yaml_rust::ScanError> for ContagionError {
    fn from(error: yaml_rust::ScanError) -> Self {
        ContagionError::Yaml(error)
    }
}

impl From<String> for ContagionError {
    fn from(error: String) -> Self {
        ContagionError::Parameter(error)
    }
}

impl From<&str> for ContagionError {
    fn from(error: &str) -> Self {
        ContagionError::Parameter(error.to_string())
    }
}

impl std::error::Error for ContagionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ContagionError::Io(e) => Some(e),
            ContagionError::Csv(e) => Some(e),
            ContagionError::Yaml(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for ContagionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContagionError::UnknownContact(name) => {
                write!(f, "contact refers to unknown person '{}'", name)
            }
            ContagionError::DuplicatePerson(name) => {
                write!(f, "person '{}' is already part of the population", name)
            }
            ContagionError::PopulationSealed(name) => write!(
                f,
                "cannot add '{}' - probabilities were already derived for this population",
                name
            ),
            ContagionError::ProbabilitiesAlreadyDerived => {
                write!(f, "disease probabilities can only be derived once")
            }
            ContagionError::ProbabilitiesNotDerived => {
                write!(f, "disease probabilities must be derived before simulating")
            }
            ContagionError::EmptyPopulation => write!(f, "the population is empty"),
            ContagionError::Unseedable => write!(
                f,
                "no outbreak could be seeded - nobody in the population has a contact"
            ),
            ContagionError::Parameter(msg) => write!(f, "parameter error - {}", msg),
            ContagionError::Io(e) => write!(f, "io error - {}", e),
            ContagionError::Csv(e) => write!(f, "csv error - {}", e),
            ContagionError::Yaml(e) => write!(f, "yaml error - {}", e),
        }
    }
}
