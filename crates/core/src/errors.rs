use std::fmt;

use thiserror::Error;

/// Errors returned by the collaborators the queue handlers call into:
/// the worker store, the job token store and the executor directory.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The targeted job is no longer in the state the caller's lease expects.
    #[error("execution log entry not updated")]
    ExecutionLogEntryNotUpdated,

    #[error("job token not found")]
    JobTokenNotFound,

    #[error("job token already exists")]
    JobTokenAlreadyExists,

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::JobTokenNotFound)
    }
}

/// Errors produced by the queue operations themselves.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Invalid Semantic Version")]
    InvalidVersion,

    #[error("unknown job")]
    UnknownJob,

    #[error("{0}")]
    BadRequest(String),

    /// A collaborator call failed; rendered as `<op>: <cause>`.
    #[error("{op}: {source}")]
    Operation {
        op: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("RecordTransformer: {0}")]
    Transform(anyhow::Error),

    #[error("{0}")]
    Multiple(ErrorList),
}

impl QueueError {
    pub fn op(op: &'static str, source: StoreError) -> Self {
        Self::Operation { op, source }
    }

    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Combines two failures of one logical step, keeping both causes in order.
    pub fn append(self, other: QueueError) -> Self {
        let mut list = match self {
            QueueError::Multiple(list) => list,
            single => ErrorList(vec![single]),
        };
        match other {
            QueueError::Multiple(more) => list.0.extend(more.0),
            single => list.0.push(single),
        }
        QueueError::Multiple(list)
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, QueueError::BadRequest(_))
    }
}

/// Ordered list of causes reported together.
#[derive(Debug)]
pub struct ErrorList(pub Vec<QueueError>);

impl ErrorList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueError> {
        self.0.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() == 1 {
            write!(f, "1 error occurred:")?;
        } else {
            write!(f, "{} errors occurred:", self.0.len())?;
        }
        for err in &self.0 {
            write!(f, "\n\t* {err}")?;
        }
        Ok(())
    }
}

pub type QueueResult<T> = Result<T, QueueError>;
pub type StoreResult<T> = Result<T, StoreError>;
