use std::sync::Arc;

use anyhow::Result;
use buyersnet_application::{AccessGate, SessionAuthProvider};
use buyersnet_core::access::{GateRequirement, Permission, Role};
use buyersnet_core::config::GateConfig;
use buyersnet_core::user::{Profile, User};
use buyersnet_infrastructure::InMemoryProfileStore;
use serde_json::json;

const MEMBER_ID: &str = "member";

pub struct GateArgs {
    pub role: Option<Role>,
    pub server_role: Option<Role>,
    pub required_role: Option<Role>,
    pub permission: Option<Permission>,
    pub show_forbidden: bool,
}

/// Signs a member in with `role` cached, optionally moves them to
/// `server_role` behind the cache's back, and runs the gate.
pub async fn run(config: &GateConfig, args: GateArgs) -> Result<()> {
    let store = Arc::new(InMemoryProfileStore::new());
    let auth = Arc::new(SessionAuthProvider::new(store.clone()));

    match args.role {
        Some(role) => {
            store.upsert(Profile::new(MEMBER_ID, role)).await;
            auth.restore(Some(User::new(MEMBER_ID))).await;
            if let Some(server_role) = args.server_role {
                store.set_role(MEMBER_ID, server_role).await?;
            }
        }
        None => auth.restore(None).await,
    }

    let requirement = GateRequirement {
        required_role: args.required_role,
        required_permission: args.permission,
    };
    let mut gate = AccessGate::new(auth.clone(), requirement, args.show_forbidden, config.clone());
    let view = gate.run().await;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "view": view,
            "refresh_attempted": gate.state().refresh_attempted(),
            "decision": gate.machine().last_decision(),
            "cached_role": auth.profile().map(|p| p.role),
        }))?
    );
    Ok(())
}
