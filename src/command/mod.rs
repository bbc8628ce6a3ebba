// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound commands.
//!
//! Appliances understand a single command: a `"1"` or `"0"` published to
//! their command-topic. [`CommandDispatcher`] publishes it through the
//! connection and applies the optimistic write to the registry.

mod dispatcher;
mod power;

pub use dispatcher::CommandDispatcher;
pub use power::PowerCommand;
