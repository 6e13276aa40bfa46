//! Application services and ports for project-scoped access evaluation.

#![forbid(unsafe_code)]

mod assignment_service;
mod authorization_ports;
mod authorization_service;

pub use assignment_service::AssignmentService;
pub use authorization_ports::{
    AssignmentRepository, AuditEvent, AuditRepository, AuthorizationRepository, ProjectMembership,
};
pub use authorization_service::{
    AbilityBreakdown, AbilityOptions, AbilityOutcome, AbilityReturnType, AuthorizationService,
    parse_name_list,
};
