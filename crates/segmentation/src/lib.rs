//! Customer segmentation — RFM quartile scoring with named segments,
//! churn flagging, and signup-to-first-order conversion windows.

pub mod churn;
pub mod rfm;

pub use churn::{churn_report, conversion_report, ChurnReport, ConversionReport, ConversionWindow};
pub use rfm::{score_users, RfmReport, RfmScore, RfmSegment};
