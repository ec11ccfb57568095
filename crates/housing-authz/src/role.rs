use serde::{Deserialize, Serialize};

/// Account role. Exactly one per user; the set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Landlord,
    Tenant,
    Administrator,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Landlord, Role::Tenant, Role::Administrator];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Landlord => "landlord",
            Role::Tenant => "tenant",
            Role::Administrator => "administrator",
        }
    }

    /// Lenient parse used for claims and stored rows: anything outside the
    /// closed set becomes `None` so the policy fails closed.
    pub fn parse(value: &str) -> Option<Role> {
        value.parse().ok()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "landlord" => Ok(Role::Landlord),
            "tenant" => Ok(Role::Tenant),
            "administrator" => Ok(Role::Administrator),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn role_string_roundtrip() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
            assert_eq!(role.to_string(), role.as_str());
        }
    }

    #[test]
    fn unknown_role_does_not_parse() {
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse("Administrator"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::Administrator).expect("serialize");
        assert_eq!(json, "\"administrator\"");
        let parsed: Role = serde_json::from_str("\"tenant\"").expect("deserialize");
        assert_eq!(parsed, Role::Tenant);
    }
}
