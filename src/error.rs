/// User-facing validation failures. Nothing is mutated when one of these is returned.
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum ValidationError {
    EmptyName,
    EmptyClient,
    InvalidRate(f64),
    InvalidColor(String),
    NoProjectSelected,
    UnknownProject(String),
    AmbiguousProject(String),
    DuplicateClient(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "Name is required."),
            ValidationError::EmptyClient => write!(f, "Client is required."),
            ValidationError::InvalidRate(rate) => {
                write!(f, "Hourly rate must be greater than zero (got {rate}).")
            }
            ValidationError::InvalidColor(color) => {
                write!(f, "Invalid color '{color}'. Use a hex code like #RRGGBB.")
            }
            ValidationError::NoProjectSelected => {
                write!(f, "Please select a project before starting the timer.")
            }
            ValidationError::UnknownProject(project) => write!(f, "Project '{project}' not found."),
            ValidationError::AmbiguousProject(project) => write!(
                f,
                "Multiple projects are named '{project}', use the project id instead."
            ),
            ValidationError::DuplicateClient(name) => write!(f, "Client '{name}' already exists."),
        }
    }
}

impl std::error::Error for ValidationError {}
