// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Presentation category of a device.

use std::fmt;
use std::str::FromStr;

/// Kind of appliance, used only by the presentation layer to pick an icon.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    /// Lamps, relays and anything without a more specific icon.
    #[default]
    Light,
    /// Televisions.
    Tv,
    /// Fans and air conditioners.
    Fan,
}

impl DeviceCategory {
    /// Returns the lowercase tag for this category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Tv => "tv",
            Self::Fan => "fan",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceCategory {
    type Err = std::convert::Infallible;

    /// Unknown tags fall back to [`DeviceCategory::Light`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "tv" => Self::Tv,
            "fan" => Self::Fan,
            _ => Self::Light,
        })
    }
}
