//! Azure resource id parsing.
//!
//! Resource ids are opaque strings with a well-known path grammar:
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{ns}/{type}/{name}`
//! optionally followed by one child segment pair (e.g. `/subnets/{name}`).
//! Casing of the fixed segments is not stable across Azure APIs, so all
//! matching here is case-insensitive.

use regex::Regex;
use std::error::Error;
use std::fmt;
use std::sync::OnceLock;

static RESOURCE_ID_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_resource_id_regex() -> &'static Regex {
    RESOURCE_ID_REGEX.get_or_init(|| {
        Regex::new(
            r"(?i)^/subscriptions/([^/]+)/resourceGroups/([^/]+)/providers/([^/]+)/([^/]+)/([^/]+)(?:/([^/]+)/([^/]+))?$",
        )
        .expect("Invalid Regex")
    })
}

/// Normalize a resource id for identity comparison.
///
/// Azure does not guarantee stable casing for ids returned by different
/// API calls, so all id keys and comparisons use this form.
pub fn normalize_id(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

/// A parsed Azure resource id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    /// Subscription GUID.
    pub subscription_id: String,
    /// Resource group name.
    pub resource_group: String,
    /// Provider namespace, e.g. `Microsoft.Network`.
    pub provider: String,
    /// Top-level resource type, e.g. `virtualNetworks`.
    pub resource_type: String,
    /// Top-level resource name.
    pub name: String,
    /// Child segment pair, e.g. `("subnets", "snet-01")`.
    pub child: Option<(String, String)>,
}

impl ResourceId {
    /// Parse a fully-qualified resource id.
    ///
    /// # Returns
    /// * `Ok(ResourceId)` - The parsed path segments
    /// * `Err(ResourceIdError)` - If the string does not match the grammar
    pub fn parse(id: &str) -> Result<ResourceId, ResourceIdError> {
        let caps = get_resource_id_regex()
            .captures(id.trim())
            .ok_or_else(|| ResourceIdError { id: id.to_string() })?;

        let seg = |i: usize| caps.get(i).map(|m| m.as_str().to_string());

        Ok(ResourceId {
            subscription_id: seg(1).unwrap_or_default(),
            resource_group: seg(2).unwrap_or_default(),
            provider: seg(3).unwrap_or_default(),
            resource_type: seg(4).unwrap_or_default(),
            name: seg(5).unwrap_or_default(),
            child: match (seg(6), seg(7)) {
                (Some(kind), Some(name)) => Some((kind, name)),
                _ => None,
            },
        })
    }

    /// Case-insensitive resource group comparison.
    pub fn in_resource_group(&self, resource_group: &str) -> bool {
        self.resource_group.eq_ignore_ascii_case(resource_group)
    }
}

/// Error returned when a string does not match the resource id grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdError {
    pub id: String,
}

impl fmt::Display for ResourceIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a valid Azure resource id: '{}'", self.id)
    }
}

impl Error for ResourceIdError {}

#[cfg(test)]
mod tests {
    use super::*;

    const VNET_ID: &str = "/subscriptions/11111111-2222-3333-4444-555555555555/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/vnet-hub";

    #[test]
    fn test_parse_top_level() {
        let parsed = ResourceId::parse(VNET_ID).expect("Error parsing vnet id");
        assert_eq!(parsed.resource_group, "rg-net");
        assert_eq!(parsed.provider, "Microsoft.Network");
        assert_eq!(parsed.resource_type, "virtualNetworks");
        assert_eq!(parsed.name, "vnet-hub");
        assert_eq!(parsed.child, None);
    }

    #[test]
    fn test_parse_child_segment() {
        let id = format!("{VNET_ID}/subnets/snet-01");
        let parsed = ResourceId::parse(&id).expect("Error parsing subnet id");
        assert_eq!(parsed.name, "vnet-hub");
        assert_eq!(
            parsed.child,
            Some(("subnets".to_string(), "snet-01".to_string()))
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let id = VNET_ID.to_ascii_uppercase();
        let parsed = ResourceId::parse(&id).expect("Error parsing uppercased id");
        assert!(parsed.in_resource_group("rg-net"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = ResourceId::parse("vnet-hub").expect_err("Expected parse failure");
        assert!(err.to_string().contains("vnet-hub"));
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(
            normalize_id(" /Subscriptions/A/resourceGroups/B "),
            "/subscriptions/a/resourcegroups/b"
        );
    }
}
