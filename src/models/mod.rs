pub mod event;
pub mod invite;
pub mod report;
pub mod response;

use serde::Serialize;

/// Envelope for every successful `/api/v1` payload.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
