// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

pub mod collector;
pub mod completion;
pub mod driver;
pub mod formatter;
pub mod git;
pub mod pr;
pub mod prompt;
pub mod truncator;
