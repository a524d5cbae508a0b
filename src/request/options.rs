//! Request options
//!
//! A small set of named capabilities, combined by union.

use std::ops::{BitOr, BitOrAssign};

/// Capabilities applied to a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestOptions {
    /// Require a `200` status for the response to count as success
    pub validate_status: bool,
    /// Invoke the completion on the session's delivery lane
    pub deliver_on_callback_lane: bool,
    /// Hand the network result to the working lane before decoding
    pub hand_off_to_working_lane: bool,
}

impl RequestOptions {
    /// No capabilities
    pub const NONE: Self = Self {
        validate_status: false,
        deliver_on_callback_lane: false,
        hand_off_to_working_lane: false,
    };

    /// Only status validation
    pub const VALIDATE_STATUS: Self = Self {
        validate_status: true,
        ..Self::NONE
    };

    /// Only delivery on the callback lane
    pub const DELIVER_ON_CALLBACK_LANE: Self = Self {
        deliver_on_callback_lane: true,
        ..Self::NONE
    };

    /// Only the working lane hand-off
    pub const HAND_OFF_TO_WORKING_LANE: Self = Self {
        hand_off_to_working_lane: true,
        ..Self::NONE
    };

    /// Preset used by public requests
    pub const DEFAULT: Self = Self::VALIDATE_STATUS
        .union(Self::DELIVER_ON_CALLBACK_LANE)
        .union(Self::HAND_OFF_TO_WORKING_LANE);

    /// Preset used for each page of a pagination run
    pub const PAGINATION: Self = Self::VALIDATE_STATUS.union(Self::HAND_OFF_TO_WORKING_LANE);

    /// Every capability set in either `self` or `other`
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            validate_status: self.validate_status || other.validate_status,
            deliver_on_callback_lane: self.deliver_on_callback_lane
                || other.deliver_on_callback_lane,
            hand_off_to_working_lane: self.hand_off_to_working_lane
                || other.hand_off_to_working_lane,
        }
    }

    /// Whether every capability of `other` is set in `self`
    pub const fn contains(self, other: Self) -> bool {
        (self.validate_status || !other.validate_status)
            && (self.deliver_on_callback_lane || !other.deliver_on_callback_lane)
            && (self.hand_off_to_working_lane || !other.hand_off_to_working_lane)
    }

    /// The same options without callback-lane delivery
    #[must_use]
    pub const fn inline(self) -> Self {
        Self {
            deliver_on_callback_lane: false,
            ..self
        }
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for RequestOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for RequestOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}
