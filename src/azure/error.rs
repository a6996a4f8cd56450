/// Failures talking to the Azure DevOps work item API.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Work item query failed ({status}): {body}")]
    Query { status: u16, body: String },

    #[error("Work item fetch failed ({status}): {body}")]
    Fetch { status: u16, body: String },

    #[error("Update failed ({status}): {body}")]
    Update { status: u16, body: String },

    #[error("Batch of {0} ids exceeds the limit of {max}", max = super::BATCH_SIZE)]
    BatchTooLarge(usize),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}
