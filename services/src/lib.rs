pub mod actor;
pub mod assessment_service;
pub mod eligibility_service;
pub mod enrollment_service;
pub mod error;
pub mod exam_service;
pub mod grading;
pub mod meeting;
pub mod notifier;
pub mod reporting_service;
pub mod status_service;

#[cfg(test)]
pub(crate) mod testing;

pub use actor::Actor;
pub use error::{ServiceError, ServiceResult};
