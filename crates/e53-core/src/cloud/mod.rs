//! Cloud property reporting
//!
//! Status changes are serialised as an OceanConnect-style property report
//! and handed to a [`ReportSink`], which the firmware backs with an MQTT
//! connection. Delivery is best effort: a failed publish is logged by the
//! caller and otherwise ignored.

pub mod connect;
pub mod report;

use thiserror_no_std::Error;

pub use connect::ConnectParams;
pub use report::{PropertyReport, PropertyValue, report_topic};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportError {
    #[error("failed to serialise the property report")]
    Serialize,
    #[error("report topic does not fit {capacity} bytes")]
    TopicTooLong { capacity: usize },
    #[error("no broker session")]
    NotConnected,
    #[error("transport rejected the publish")]
    Transport,
}

/// Destination for serialised property reports.
pub trait ReportSink {
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
    ) -> impl Future<Output = Result<(), ReportError>>;

    /// Keep an idle session open between reports.
    fn keep_alive(&mut self) -> impl Future<Output = Result<(), ReportError>> {
        async { Ok(()) }
    }
}

impl<T: ReportSink> ReportSink for &mut T {
    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ReportError> {
        (**self).publish(topic, payload).await
    }

    async fn keep_alive(&mut self) -> Result<(), ReportError> {
        (**self).keep_alive().await
    }
}
