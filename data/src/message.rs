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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One entry in a game's append-only message log.
///
/// `template` is kept verbatim (not pre-substituted) so that a `{{key}}`
/// whose value is an element/player reference can be rendered by display
/// name lazily, once, at read time -- substitution happens against
/// whatever `args` held at the moment the message was logged, not against
/// live state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMessage {
    pub template: String,
    pub args: BTreeMap<String, JsonValue>,
}

impl LogMessage {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into(), args: BTreeMap::new() }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.args.insert(key.into(), value);
        self
    }

    /// Substitutes every `{{key}}` placeholder in `template` with the
    /// rendered form of its argument. A `JsonValue::String` is inserted
    /// verbatim; any other value is rendered via its `Display`-ish JSON
    /// form, except for the special-cased element/player reference
    /// display-name fields (`__elementRef`-shaped objects carrying a
    /// `name`), which render as just the name.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            rest = &rest[start + 2..];
            let Some(end) = rest.find("}}") else {
                out.push_str("{{");
                break;
            };
            let key = rest[..end].trim();
            out.push_str(&self.render_arg(key));
            rest = &rest[end + 2..];
        }
        out.push_str(rest);
        out
    }

    fn render_arg(&self, key: &str) -> String {
        match self.args.get(key) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Object(map)) => {
                if let Some(JsonValue::String(name)) = map.get("name") {
                    name.clone()
                } else {
                    JsonValue::Object(map.clone()).to_string()
                }
            }
            Some(other) => other.to_string(),
            None => format!("{{{{{key}}}}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_plain_string_args() {
        let message = LogMessage::new("{{player}} drew a card")
            .with_arg("player", JsonValue::String("Alice".to_string()));
        assert_eq!(message.render(), "Alice drew a card");
    }

    #[test]
    fn substitutes_element_ref_by_display_name() {
        let message = LogMessage::new("{{card}} was discarded").with_arg(
            "card",
            serde_json::json!({ "__elementId": 7, "name": "Ace of Spades" }),
        );
        assert_eq!(message.render(), "Ace of Spades was discarded");
    }

    #[test]
    fn leaves_unknown_placeholders_untouched() {
        let message = LogMessage::new("{{missing}} happened");
        assert_eq!(message.render(), "{{missing}} happened");
    }
}
