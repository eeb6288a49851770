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

/// Parses a slash-separated branch path (e.g. `"2/0/5"`) of child indices,
/// as used by the `__elementRef` wire encoding, into a sequence of indices.
///
/// Returns `None` if any segment fails to parse as a `usize`.
pub fn parse_branch_path(path: &str) -> Option<Vec<usize>> {
    if path.is_empty() {
        return Some(vec![]);
    }
    path.split('/').map(|segment| segment.parse::<usize>().ok()).collect()
}

/// Renders a sequence of child indices back into the slash-separated wire
/// form used by `__elementRef`.
pub fn render_branch_path(indices: &[usize]) -> String {
    indices.iter().map(usize::to_string).collect::<Vec<_>>().join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_nonempty_path() {
        let path = "2/0/5";
        let parsed = parse_branch_path(path).unwrap();
        assert_eq!(parsed, vec![2, 0, 5]);
        assert_eq!(render_branch_path(&parsed), path);
    }

    #[test]
    fn empty_path_is_root() {
        assert_eq!(parse_branch_path(""), Some(vec![]));
        assert_eq!(render_branch_path(&[]), "");
    }

    #[test]
    fn rejects_non_numeric_segment() {
        assert_eq!(parse_branch_path("2/x/5"), None);
    }
}
