use std::fmt::Formatter;

#[derive(Debug, Clone, PartialEq)]
pub enum GrabError {
    /// The gallery url cannot be built without a username
    EmptyUsername,
    InvalidUrl(String),
    ErrorCreatingDestinationDirectory(String),
    NetworkError(String),
    ErrorStatusCode {
        status_code: String,
        url: String,
    },
    /// Parameter is the page whose markup carried no usable page count
    PageCountNotFound(String),
    /// parameters are file path, additional error message
    FileOperationError {
        file_name: String,
        message: String,
    },
}

impl std::fmt::Display for GrabError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            GrabError::EmptyUsername => "no username provided".to_string(),
            GrabError::InvalidUrl(url) => format!("Invalid url received : {url}"),
            GrabError::ErrorCreatingDestinationDirectory(err) => {
                format!("error creating destination directory. {err}")
            }
            GrabError::NetworkError(err) => format!("error connecting to internet. {err}"),
            GrabError::ErrorStatusCode { status_code, url } => {
                format!("server returned an error response. {url} => {status_code}")
            }
            GrabError::PageCountNotFound(url) => {
                format!("no page count found in the markup of {url}")
            }
            GrabError::FileOperationError { file_name, message } => {
                format!("{message} : {file_name}")
            }
        };
        write!(f, "{str}")
    }
}

impl std::error::Error for GrabError {}
