//! Shipped flow content
//!
//! The concrete step graphs the PayPilot assistant offers out of the box.
//! These are configuration data over the generic flow engine: each builder
//! returns a plain [`FlowDefinition`] and carries no engine logic of its
//! own.

pub mod employee;
pub mod payroll;

pub use employee::employee_onboarding_flow;
pub use payroll::payroll_run_flow;

use crate::flow::FlowRegistry;
use crate::utils::errors::Result;

/// Build a registry with all shipped flows registered
pub fn default_registry() -> Result<FlowRegistry> {
    let mut registry = FlowRegistry::new();
    registry.register(employee_onboarding_flow())?;
    registry.register(payroll_run_flow())?;
    Ok(registry)
}
