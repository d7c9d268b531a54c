//! Node capabilities advertised to the CO.
//!
//! The set of optional Node RPCs and the supported access modes are fixed;
//! a [`CapabilitySet`] is built once when the node service is constructed.

use crate::csi;
use crate::csi::node_service_capability::rpc::Type as RpcType;
use crate::csi::volume_capability::access_mode::Mode;

/// Optional Node RPCs this plugin implements
pub const NODE_RPCS: &[RpcType] = &[
    RpcType::StageUnstageVolume,
    RpcType::ExpandVolume,
    RpcType::GetVolumeStats,
];

/// Access modes volumes can be published with
pub const ACCESS_MODES: &[Mode] = &[Mode::SingleNodeWriter];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySet {
    rpcs: &'static [RpcType],
    access_modes: &'static [Mode],
}

impl CapabilitySet {
    pub const fn new(rpcs: &'static [RpcType], access_modes: &'static [Mode]) -> Self {
        Self { rpcs, access_modes }
    }

    pub fn rpcs(&self) -> &[RpcType] {
        self.rpcs
    }

    pub fn access_modes(&self) -> &[Mode] {
        self.access_modes
    }

    /// Whether a raw access mode value is in the supported set.
    pub fn supports_access_mode(&self, mode: i32) -> bool {
        self.access_modes.iter().any(|m| *m as i32 == mode)
    }

    /// True only if every requested capability's access mode is supported.
    /// A capability without an access mode counts as UNKNOWN. The access
    /// type (block or mount) is not considered here.
    pub fn is_valid_volume_capabilities(&self, capabilities: &[csi::VolumeCapability]) -> bool {
        capabilities.iter().all(|cap| {
            let mode = cap
                .access_mode
                .as_ref()
                .map_or(Mode::Unknown as i32, |m| m.mode);
            self.supports_access_mode(mode)
        })
    }

    /// Capabilities in the shape NodeGetCapabilities returns them.
    pub fn node_service_capabilities(&self) -> Vec<csi::NodeServiceCapability> {
        self.rpcs
            .iter()
            .map(|rpc| csi::NodeServiceCapability {
                r#type: Some(csi::node_service_capability::Type::Rpc(
                    csi::node_service_capability::Rpc {
                        r#type: *rpc as i32,
                    },
                )),
            })
            .collect()
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self::new(NODE_RPCS, ACCESS_MODES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capability(mode: Option<Mode>) -> csi::VolumeCapability {
        csi::VolumeCapability {
            access_mode: mode.map(|m| csi::volume_capability::AccessMode { mode: m as i32 }),
            access_type: Some(csi::volume_capability::AccessType::Mount(
                csi::volume_capability::MountVolume::default(),
            )),
        }
    }

    #[test]
    fn test_default_rpcs() {
        let caps = CapabilitySet::default();
        assert_eq!(caps.rpcs().len(), 3);
        assert!(caps.rpcs().contains(&RpcType::StageUnstageVolume));
        assert!(caps.rpcs().contains(&RpcType::ExpandVolume));
        assert!(caps.rpcs().contains(&RpcType::GetVolumeStats));
        assert_eq!(caps.access_modes(), &[Mode::SingleNodeWriter]);
    }

    #[test]
    fn test_node_service_capabilities_shape() {
        let caps = CapabilitySet::default().node_service_capabilities();
        assert_eq!(caps.len(), 3);
        for cap in caps {
            match cap.r#type {
                Some(csi::node_service_capability::Type::Rpc(rpc)) => {
                    assert!(NODE_RPCS.iter().any(|t| *t as i32 == rpc.r#type));
                }
                None => panic!("capability without type"),
            }
        }
    }

    #[test]
    fn test_single_node_writer_supported() {
        let caps = CapabilitySet::default();
        assert!(caps.is_valid_volume_capabilities(&[capability(Some(Mode::SingleNodeWriter))]));
    }

    #[test]
    fn test_other_modes_rejected() {
        let caps = CapabilitySet::default();
        for mode in [
            Mode::SingleNodeReaderOnly,
            Mode::MultiNodeReaderOnly,
            Mode::MultiNodeSingleWriter,
            Mode::MultiNodeMultiWriter,
            Mode::SingleNodeSingleWriter,
            Mode::SingleNodeMultiWriter,
            Mode::Unknown,
        ] {
            assert!(
                !caps.is_valid_volume_capabilities(&[capability(Some(mode))]),
                "{:?} should not be supported",
                mode
            );
        }
    }

    #[test]
    fn test_missing_access_mode_rejected() {
        let caps = CapabilitySet::default();
        assert!(!caps.is_valid_volume_capabilities(&[capability(None)]));
    }

    #[test]
    fn test_every_capability_must_match() {
        let caps = CapabilitySet::default();
        assert!(!caps.is_valid_volume_capabilities(&[
            capability(Some(Mode::SingleNodeWriter)),
            capability(Some(Mode::MultiNodeMultiWriter)),
        ]));
    }
}
