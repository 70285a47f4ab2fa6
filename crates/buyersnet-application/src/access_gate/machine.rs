//! Pure state machine behind [`AccessGate`](super::AccessGate).
//!
//! The machine never performs I/O. Evaluations return a [`GateEffect`]
//! telling the driver whether a profile refresh must be started; the only
//! transition that emits [`GateEffect::StartRefresh`] is the first denial,
//! and it moves the machine into `Refreshing`, from which every later path
//! carries `refresh_attempted = true`. A second refresh per gate instance is
//! therefore unrepresentable rather than guarded by an ad hoc flag.

use buyersnet_core::access::{AccessContext, AccessDecision, GateRequirement};
use serde::Serialize;

/// Why a member is kept out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    /// No session; send to sign-in.
    Unauthenticated,
    /// Signed in but the role or permission check failed.
    Insufficient,
}

/// Gate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Waiting for the auth provider's initial load (bounded).
    Checking,
    /// A profile refresh is in flight after the first denial.
    Refreshing,
    Allowed { refresh_attempted: bool },
    Denied { refresh_attempted: bool, reason: Denial },
}

impl GateState {
    pub fn refresh_attempted(&self) -> bool {
        match self {
            GateState::Checking => false,
            GateState::Refreshing => true,
            GateState::Allowed { refresh_attempted } => *refresh_attempted,
            GateState::Denied {
                refresh_attempted, ..
            } => *refresh_attempted,
        }
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEffect {
    None,
    StartRefresh,
}

/// What the protected view should render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "route", rename_all = "snake_case")]
pub enum GateView {
    Loading,
    Content,
    Redirect(String),
    Forbidden,
}

/// Routes and presentation choice for denied members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenialRoutes {
    pub sign_in_route: String,
    pub default_route: String,
    pub show_forbidden: bool,
}

#[derive(Debug, Clone)]
pub struct GateMachine {
    requirement: GateRequirement,
    routes: DenialRoutes,
    state: GateState,
    last_decision: Option<AccessDecision>,
}

impl GateMachine {
    pub fn new(requirement: GateRequirement, routes: DenialRoutes) -> Self {
        Self {
            requirement,
            routes,
            state: GateState::Checking,
            last_decision: None,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn requirement(&self) -> &GateRequirement {
        &self.requirement
    }

    /// The decision computed by the most recent evaluation, if any.
    pub fn last_decision(&self) -> Option<AccessDecision> {
        self.last_decision
    }

    /// Leaves `Checking` once the initial auth load finished or timed out.
    ///
    /// Calling this in any other state is equivalent to [`evaluate`](Self::evaluate).
    pub fn settle(&mut self, context: &AccessContext) -> GateEffect {
        match self.state {
            GateState::Checking => self.apply(context, false),
            _ => self.evaluate(context),
        }
    }

    /// Recomputes access against the current identity.
    ///
    /// This is the render-pass entry point and may be called any number of
    /// times. It is inert while checking or refreshing.
    pub fn evaluate(&mut self, context: &AccessContext) -> GateEffect {
        match self.state {
            GateState::Checking | GateState::Refreshing => GateEffect::None,
            GateState::Allowed { refresh_attempted }
            | GateState::Denied {
                refresh_attempted, ..
            } => self.apply(context, refresh_attempted),
        }
    }

    /// Leaves `Refreshing` after the refresh resolved, whatever its outcome,
    /// and rechecks against the now-cached identity.
    pub fn refresh_finished(&mut self, context: &AccessContext) -> GateEffect {
        match self.state {
            GateState::Refreshing => self.apply(context, true),
            _ => GateEffect::None,
        }
    }

    pub fn view(&self) -> GateView {
        match self.state {
            GateState::Checking | GateState::Refreshing => GateView::Loading,
            GateState::Allowed { .. } => GateView::Content,
            GateState::Denied {
                reason: Denial::Unauthenticated,
                ..
            } => GateView::Redirect(self.routes.sign_in_route.clone()),
            GateState::Denied {
                reason: Denial::Insufficient,
                ..
            } => {
                if self.routes.show_forbidden {
                    GateView::Forbidden
                } else {
                    GateView::Redirect(self.routes.default_route.clone())
                }
            }
        }
    }

    fn apply(&mut self, context: &AccessContext, refresh_attempted: bool) -> GateEffect {
        if !context.is_authenticated {
            self.last_decision = None;
            self.state = GateState::Denied {
                refresh_attempted,
                reason: Denial::Unauthenticated,
            };
            return GateEffect::None;
        }

        let decision = AccessDecision::for_context(&self.requirement, context);
        self.last_decision = Some(decision);

        if !decision.access_denied {
            self.state = GateState::Allowed { refresh_attempted };
            GateEffect::None
        } else if !refresh_attempted {
            self.state = GateState::Refreshing;
            GateEffect::StartRefresh
        } else {
            self.state = GateState::Denied {
                refresh_attempted,
                reason: Denial::Insufficient,
            };
            GateEffect::None
        }
    }
}
