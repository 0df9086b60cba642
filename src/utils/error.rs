use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{op}: invalid: {message}")]
    Invalid { op: &'static str, message: String },

    #[error("{op}: I/O error: {message}: {source}")]
    Io {
        op: &'static str,
        message: String,
        #[source]
        source: BoxError,
    },
}

/// 錯誤分類：只區分設定錯誤與遠端/檔案 I/O 錯誤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Invalid,
    Io,
}

impl StorageError {
    pub fn invalid(op: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            op,
            message: message.into(),
        }
    }

    pub fn io(op: &'static str, message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Io {
            op,
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid { .. } => ErrorKind::Invalid,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    pub fn op(&self) -> &'static str {
        match self {
            Self::Invalid { op, .. } | Self::Io { op, .. } => *op,
        }
    }

    /// 依錯誤種類決定程式結束碼
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Invalid => 2,
            ErrorKind::Io => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = StorageError::invalid("spaces.New", "SPACES_KEY env variable is required");
        assert_eq!(err.kind(), ErrorKind::Invalid);
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_string(),
            "spaces.New: invalid: SPACES_KEY env variable is required"
        );

        let err = StorageError::io(
            "spaces.Download",
            "unable to download ref \"a\" from bucket \"b\"",
            "NoSuchKey",
        );
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.op(), "spaces.Download");
        assert!(err.to_string().ends_with(": NoSuchKey"));
    }
}
