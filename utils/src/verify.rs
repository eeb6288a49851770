// Copyright © tableforge 2026-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Returns a [StopCondition::Error](crate::outcome::StopCondition::Error)
/// outcome unless `condition` holds.
///
/// Used at the boundary between "this is a bug in the caller" and "this is
/// an expected game-logic failure" for internal engine invariants that are
/// cheap to check inline, rather than bubbling a [color_eyre::Report] through
/// every intermediate call site by hand.
#[macro_export]
macro_rules! verify {
    ($condition:expr, $($fmt:tt)*) => {
        if !$condition {
            return Err($crate::outcome::StopCondition::Error(
                color_eyre::eyre::eyre!($($fmt)*),
            ));
        }
    };
}

/// Unconditionally returns a [StopCondition::Error](crate::outcome::StopCondition::Error).
#[macro_export]
macro_rules! fail {
    ($($fmt:tt)*) => {
        return Err($crate::outcome::StopCondition::Error(
            color_eyre::eyre::eyre!($($fmt)*),
        ));
    };
}
