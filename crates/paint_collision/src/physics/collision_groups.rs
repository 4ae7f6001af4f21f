//! Collision group filtering for the broadphase
//!
//! Every object in the world carries a group (what it is) and a mask (what it
//! wants to pair with). A pair is only considered when each side's group is
//! accepted by the other side's mask.

use bitflags::bitflags;

bitflags! {
    /// 8-bit broadphase filter groups
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionGroups: u8 {
        /// General purpose objects and queries
        const DEFAULT = 1 << 0;
        /// Static environment geometry (mesh proxies)
        const STATIC = 1 << 1;
        /// Reserved for the paint probe
        const PAINT_PROBE = 1 << 7;

        // Bits 2..=6 stay meaningful in masks
        const _ = !0;
    }
}

impl CollisionGroups {
    /// Group/mask pair used by mesh proxies: static, pairs with everything non-static
    pub const PROXY_FILTER: (Self, Self) = (Self::STATIC, Self::STATIC.complement());

    /// Group/mask pair used by the paint probe
    pub const PROBE_FILTER: (Self, Self) = (Self::PAINT_PROBE, Self::PAINT_PROBE.complement());

    /// Group/mask pair used by reticle traces, which must never hit the probe
    pub const TRACE_FILTER: (Self, Self) = (Self::DEFAULT, Self::PAINT_PROBE.complement());

    /// Check if two objects should pair based on their groups and masks
    ///
    /// A's group must be in B's mask AND B's group must be in A's mask.
    pub const fn should_collide(group_a: Self, mask_a: Self, group_b: Self, mask_b: Self) -> bool {
        group_a.intersects(mask_b) && group_b.intersects(mask_a)
    }
}

bitflags! {
    /// Per-object behavior flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CollisionFlags: u8 {
        /// Object never moves on its own
        const STATIC_OBJECT = 1 << 0;
        /// Overlaps are reported but never resolved
        const NO_CONTACT_RESPONSE = 1 << 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_group_is_bit_seven() {
        assert_eq!(CollisionGroups::PAINT_PROBE.bits(), 0x80);
        assert_eq!(CollisionGroups::PROBE_FILTER.1.bits(), 0x7F);
        assert_eq!(CollisionGroups::PROXY_FILTER.1.bits(), 0xFD);
    }

    #[test]
    fn test_probe_pairs_with_proxy() {
        let (pg, pm) = CollisionGroups::PROBE_FILTER;
        let (sg, sm) = CollisionGroups::PROXY_FILTER;
        assert!(CollisionGroups::should_collide(pg, pm, sg, sm));
    }

    #[test]
    fn test_proxies_never_pair_with_each_other() {
        let (sg, sm) = CollisionGroups::PROXY_FILTER;
        assert!(!CollisionGroups::should_collide(sg, sm, sg, sm));
    }

    #[test]
    fn test_trace_ignores_probe_but_hits_proxies() {
        let (tg, tm) = CollisionGroups::TRACE_FILTER;
        let (pg, pm) = CollisionGroups::PROBE_FILTER;
        let (sg, sm) = CollisionGroups::PROXY_FILTER;
        assert!(!CollisionGroups::should_collide(tg, tm, pg, pm));
        assert!(CollisionGroups::should_collide(tg, tm, sg, sm));
    }

    #[test]
    fn test_should_not_collide_one_way() {
        // Default wants static, static does not want default
        assert!(!CollisionGroups::should_collide(
            CollisionGroups::DEFAULT,
            CollisionGroups::STATIC,
            CollisionGroups::STATIC,
            CollisionGroups::STATIC,
        ));
    }
}
