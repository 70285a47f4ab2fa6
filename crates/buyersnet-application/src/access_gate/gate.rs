use std::sync::Arc;

use buyersnet_core::access::GateRequirement;
use buyersnet_core::config::GateConfig;
use buyersnet_core::user::AuthProvider;
use tokio::time::timeout;

use super::machine::{DenialRoutes, GateEffect, GateMachine, GateState, GateView};

/// Gates a protected view on role and permission.
///
/// One `AccessGate` corresponds to one mounted protected view. It tolerates
/// a stale cached profile by refreshing it at most once, on the first
/// denial, before settling on a redirect or the forbidden view.
pub struct AccessGate {
    auth: Arc<dyn AuthProvider>,
    config: GateConfig,
    machine: GateMachine,
}

impl AccessGate {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        requirement: GateRequirement,
        show_forbidden: bool,
        config: GateConfig,
    ) -> Self {
        let routes = DenialRoutes {
            sign_in_route: config.sign_in_route.clone(),
            default_route: config.default_route.clone(),
            show_forbidden,
        };
        Self {
            auth,
            config,
            machine: GateMachine::new(requirement, routes),
        }
    }

    pub fn state(&self) -> GateState {
        self.machine.state()
    }

    pub fn view(&self) -> GateView {
        self.machine.view()
    }

    pub fn machine(&self) -> &GateMachine {
        &self.machine
    }

    /// Drives the gate from mount to a settled view.
    ///
    /// Waits for the auth provider's initial load (bounded by
    /// `initial_check_timeout`), evaluates access, performs the one-shot
    /// refresh if the first evaluation denied, and returns the final view.
    /// Provider failures are logged and never surface to the caller.
    pub async fn run(&mut self) -> GateView {
        self.wait_for_auth().await;

        let context = self.auth.snapshot().access_context();
        let effect = self.machine.settle(&context);
        self.perform(effect).await;

        let view = self.machine.view();
        tracing::debug!(
            target: "access_gate",
            requirement = ?self.machine.requirement(),
            state = ?self.machine.state(),
            "Gate settled: {:?}",
            view
        );
        view
    }

    /// Re-evaluates against the current cached profile, e.g. after the auth
    /// provider published a new identity while the view stays mounted.
    pub async fn reevaluate(&mut self) -> GateView {
        let context = self.auth.snapshot().access_context();
        let effect = self.machine.evaluate(&context);
        self.perform(effect).await;
        self.machine.view()
    }

    async fn wait_for_auth(&self) {
        let mut loading = self.auth.loading_signal();
        let wait = loading.wait_for(|is_loading| !*is_loading);

        match timeout(self.config.initial_check_timeout, wait).await {
            Ok(Ok(_)) => {}
            Ok(Err(_)) => {
                tracing::debug!(
                    target: "access_gate",
                    "Auth provider dropped its loading signal, checking with current state"
                );
            }
            Err(_) => {
                tracing::debug!(
                    target: "access_gate",
                    "Auth still loading after {:?}, checking with current state",
                    self.config.initial_check_timeout
                );
            }
        }
    }

    async fn perform(&mut self, effect: GateEffect) {
        if effect != GateEffect::StartRefresh {
            return;
        }

        tracing::info!(
            target: "access_gate",
            "Access denied with cached profile, refreshing once"
        );
        if let Err(e) = self.auth.refresh_profile().await {
            tracing::warn!(
                target: "access_gate",
                "Profile refresh failed, keeping cached profile: {}",
                e
            );
        }

        let context = self.auth.snapshot().access_context();
        // Refresh already spent, so the recheck cannot request another.
        let follow_up = self.machine.refresh_finished(&context);
        debug_assert_eq!(follow_up, GateEffect::None);
    }
}
