// scangate-tools/tests/proptest_bounds.rs
// ============================================================================
// Module: Property Tests for Descriptor Bounds
// Description: Adversarial inputs never produce an over-ceiling descriptor.
// ============================================================================
//! ## Overview
//! Property checks over caller-controlled inputs: whatever the port
//! expression or mode token, a built descriptor never carries a port count
//! above the ceiling, and unknown tokens never build at all.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use proptest::prelude::*;
use scangate_core::Clearance;
use scangate_core::ClearedTarget;
use scangate_core::CorrelationId;
use scangate_core::Identity;
use scangate_core::OperationName;
use scangate_core::Username;
use scangate_core::parse_network;
use scangate_tools::PortScanLimits;
use scangate_tools::PortScanPolicy;
use scangate_tools::PortScanRequest;
use scangate_tools::PortSpec;
use scangate_tools::ToolAction;

fn clearance() -> Clearance {
    Clearance {
        identity: Identity::verified(Username::new("alice")),
        operation: OperationName::new("portscan"),
        target: ClearedTarget::Network(parse_network("192.168.1.50").unwrap()),
        correlation_id: CorrelationId::new("prop"),
    }
}

proptest! {
    #[test]
    fn built_descriptors_never_exceed_port_ceiling(start in 1u16..=65535, span in 0u32..70_000) {
        let end = u32::from(start).saturating_add(span).min(65_535);
        let expression = format!("{start}-{end}");
        let policy = PortScanPolicy::new(PortScanLimits::default());
        let request = PortScanRequest {
            mode: "quick".to_string(),
            ports: Some(expression),
        };
        if let Ok(descriptor) = policy.build(&clearance(), &request) {
            match descriptor.action {
                ToolAction::PortScan { ports, .. } => {
                    prop_assert!(ports.unwrap().count() <= 1000);
                }
                _ => prop_assert!(false, "unexpected action"),
            }
        }
    }

    #[test]
    fn arbitrary_mode_tokens_outside_the_safe_set_never_build(token in "[a-z-]{0,16}") {
        prop_assume!(!matches!(
            token.as_str(),
            "quick" | "standard" | "full" | "service" | "os-detect"
        ));
        let policy = PortScanPolicy::new(PortScanLimits::default());
        let request = PortScanRequest {
            mode: token,
            ports: None,
        };
        prop_assert!(policy.build(&clearance(), &request).is_err());
    }

    #[test]
    fn parsed_port_specs_round_trip_through_render(ports in proptest::collection::vec(1u16..=65535, 1..20)) {
        let expression = ports.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
        let spec = PortSpec::parse(&expression).unwrap();
        let reparsed = PortSpec::parse(&spec.render()).unwrap();
        prop_assert_eq!(spec.count(), reparsed.count());
        prop_assert_eq!(spec.render(), reparsed.render());
    }
}
