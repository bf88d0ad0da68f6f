//! Error types for TenderDesk

/// Result type alias using TenderDesk's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for TenderDesk operations
///
/// The `Display` output carries technical detail for logs. What the user
/// sees comes from [`Error::user_message`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed user input; the request is never sent
    #[error("validation error: {0}")]
    Validation(String),

    /// Filter-option domains could not be loaded
    #[error("filter options error: {0}")]
    Options(String),

    /// Tender search failed
    #[error("search error: {0}")]
    Search(String),

    /// Single or bulk prediction failed
    #[error("prediction error: {0}")]
    Prediction(String),

    /// The backend rejected the session token (HTTP 401)
    #[error("unauthorized: session is no longer valid")]
    Unauthorized,

    /// The backend answered with a non-success status
    #[error("remote returned status {status}: {detail}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Response body or error detail
        detail: String,
    },

    /// Connection-level failures
    #[error("transport error: {0}")]
    Transport(String),

    /// Timeout errors
    #[error("operation timed out")]
    Timeout,

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new validation error. The message is shown to the user as-is.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new filter options error
    pub fn options(msg: impl Into<String>) -> Self {
        Self::Options(msg.into())
    }

    /// Create a new search error
    pub fn search(msg: impl Into<String>) -> Self {
        Self::Search(msg.into())
    }

    /// Create a new prediction error
    pub fn prediction(msg: impl Into<String>) -> Self {
        Self::Prediction(msg.into())
    }

    /// Create a new transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error means the session must be re-established
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Short, localized, non-technical message for presentation
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation(msg) => msg,
            Self::Options(_) => "フィルターオプションの取得に失敗しました",
            Self::Search(_) => "検索に失敗しました。しばらくしてから再度お試しください。",
            Self::Prediction(_) => "予測に失敗しました",
            Self::Unauthorized => "ログインの有効期限が切れました。再度ログインしてください",
            Self::Remote { .. } | Self::Transport(_) | Self::Timeout => {
                "サーバーとの通信に失敗しました。しばらくしてから再度お試しください。"
            }
            Self::Config(_) => "設定ファイルの読み込みに失敗しました",
            Self::Io(_) | Self::Serialization(_) | Self::Internal(_) => {
                "予期しないエラーが発生しました"
            }
        }
    }
}
