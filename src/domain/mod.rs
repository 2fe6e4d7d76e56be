// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Commercial

mod commit;
mod diff;
mod prompt;

pub use commit::*;
pub use diff::*;
pub use prompt::*;
