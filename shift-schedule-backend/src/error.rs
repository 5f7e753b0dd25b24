use shift_schedule_config::ConfigError;
use shift_schedule_optimizer::ShiftDefinitionError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    File(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("webserver error: {0}")]
    Hyper(#[from] hyper::Error),
    #[error("join error: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("{0}")]
    Config(#[from] ConfigError),
}

/// Why a schedule request was refused with 400. The text is sent to the
/// client as `message`.
#[derive(thiserror::Error, Debug)]
pub enum RequestError {
    #[error("Request body empty/not JSON.")]
    NotJson,
    #[error("Missing or invalid type for input fields: {0}")]
    Fields(String),
    #[error("{0}")]
    ShiftDefinitions(#[from] ShiftDefinitionError),
    #[error("Invalid staff structure in staffList.")]
    StaffStructure,
    #[error("Invalid staff IDs found in staffPriority list: {0}")]
    UnknownPriorityIds(String),
}
