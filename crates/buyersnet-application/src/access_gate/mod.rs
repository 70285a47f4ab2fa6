//! Role/permission gate for protected views.

mod gate;
mod machine;

pub use gate::AccessGate;
pub use machine::{Denial, DenialRoutes, GateEffect, GateMachine, GateState, GateView};
