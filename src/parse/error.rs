use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    Meal(String),
    InvalidState(String),
    InvalidDate(String),
    NoMenus(String),
    UnsupportedFormat(String),
    NotFound(String),
    Internal(String),
}

impl Error {
    pub fn meal_error(msg: &str) -> Self {
        Self::Meal(msg.to_string())
    }
    pub fn invalid_date_error(msg: &str) -> Self {
        Self::InvalidDate(msg.to_string())
    }
}

impl Error {
    pub fn internal_error(msg: &str) -> Self {
        Self::Internal(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "HTML Parse Error: {}", msg),
            Self::Meal(msg) => write!(f, "Meal Error: {}", msg),
            Self::InvalidState(msg) => write!(f, "Invalid State Error: {}", msg),
            Self::InvalidDate(msg) => write!(f, "Invalid Date Error: {msg}"),
            Self::NoMenus(msg) => write!(f, "No Menus Found: {msg}"),
            Self::UnsupportedFormat(msg) => write!(f, "Unsupported Format: {msg}"),
            Self::NotFound(msg) => write!(f, "Not Found: {msg}"),
            Self::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
