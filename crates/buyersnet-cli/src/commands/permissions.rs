use anyhow::{Result, bail};
use buyersnet_core::access::{AccessDecision, GateRequirement, Permission, Role, permissions_for};
use serde_json::{Map, Value, json};
use strum::IntoEnumIterator;

pub fn table(role: Option<Role>) -> Result<()> {
    let roles: Vec<Role> = match role {
        Some(role) => vec![role],
        None => Role::iter().collect(),
    };

    let mut table = Map::new();
    for role in roles {
        table.insert(role.to_string(), json!(permissions_for(Some(role))));
    }
    println!("{}", serde_json::to_string_pretty(&Value::Object(table))?);
    Ok(())
}

pub fn check(
    role: Option<Role>,
    required_role: Option<Role>,
    permission: Option<Permission>,
) -> Result<()> {
    if required_role.is_none() && permission.is_none() {
        bail!("Pass --required-role and/or --permission");
    }

    let requirement = GateRequirement {
        required_role,
        required_permission: permission,
    };
    let decision = AccessDecision::evaluate(&requirement, role);
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "role": role,
            "requirement": requirement,
            "decision": decision,
        }))?
    );
    Ok(())
}
