//! Origin-based access decision.

use std::net::{IpAddr, Ipv4Addr};

use crate::config::Settings;

/// Address of the reverse-proxy ingress that fronts the editor.
pub const INGRESS_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::new(172, 30, 32, 2));

/// Decides whether a caller may use a gated route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    allow_all: bool,
    ingress: IpAddr,
}

impl AccessPolicy {
    pub fn new(allow_all: bool, ingress: IpAddr) -> Self {
        Self { allow_all, ingress }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.allow_all_ips, INGRESS_ADDRESS)
    }

    pub fn allows_all(&self) -> bool {
        self.allow_all
    }

    /// Check a caller's origin against the policy.
    ///
    /// IPv4-mapped IPv6 origins are compared as their IPv4 form.
    pub fn permitted(&self, origin: IpAddr) -> bool {
        self.allow_all || origin.to_canonical() == self.ingress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    #[test]
    fn test_ingress_is_permitted() {
        let policy = AccessPolicy::new(false, INGRESS_ADDRESS);
        assert!(policy.permitted(INGRESS_ADDRESS));
    }

    #[test]
    fn test_other_origin_is_denied() {
        let policy = AccessPolicy::new(false, INGRESS_ADDRESS);
        assert!(!policy.permitted("10.0.0.5".parse().unwrap()));
        assert!(!policy.permitted("172.30.32.3".parse().unwrap()));
        assert!(!policy.permitted(IpAddr::V4(Ipv4Addr::LOCALHOST)));
    }

    #[test]
    fn test_allow_all_permits_any_origin() {
        let policy = AccessPolicy::new(true, INGRESS_ADDRESS);
        assert!(policy.permitted("10.0.0.5".parse().unwrap()));
        assert!(policy.permitted(IpAddr::V6(Ipv6Addr::LOCALHOST)));
    }

    #[test]
    fn test_mapped_ipv6_ingress_is_permitted() {
        let policy = AccessPolicy::new(false, INGRESS_ADDRESS);
        let mapped: IpAddr = "::ffff:172.30.32.2".parse().unwrap();
        assert!(policy.permitted(mapped));
    }
}
