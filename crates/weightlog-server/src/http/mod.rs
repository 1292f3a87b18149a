// SPDX-License-Identifier: Apache-2.0

pub(crate) mod extract;
pub(crate) mod handlers;
